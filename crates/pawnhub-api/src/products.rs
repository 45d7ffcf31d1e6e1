use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use pawnhub_services::ServiceError;
use pawnhub_types::models::{Product, ProductCategory};
use pawnhub_types::updates::{NewProduct, ProductUpdate};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::stores::ensure_manager;
use crate::{AppState, blocking};

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<ProductCategory>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state.products.clone();
    let listed = blocking(move || match query.category {
        Some(category) => products.get_by_category(category),
        None => products.get_all(),
    })
    .await?;
    Ok(Json(listed))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    load(&state, id).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(data): Json<NewProduct>,
) -> Result<impl IntoResponse> {
    ensure_manager(&user, &data.store_id)?;

    let products = state.products.clone();
    let product = blocking(move || products.create(data)).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    let current = load(&state, id).await?;
    ensure_manager(&user, &current.store_id)?;

    let products = state.products.clone();
    let updated = blocking(move || products.update(&current.id, update)).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode> {
    let current = load(&state, id).await?;
    ensure_manager(&user, &current.store_id)?;

    let products = state.products.clone();
    blocking(move || products.delete(&current.id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn load(state: &AppState, id: String) -> Result<Product> {
    let products = state.products.clone();
    blocking(move || {
        products
            .get_by_id(&id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {}", id)))
    })
    .await
}
