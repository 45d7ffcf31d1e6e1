use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;

use pawnhub_services::ServiceError;
use pawnhub_types::api::NearbyStore;
use pawnhub_types::models::{AuthUser, Product, Store};
use pawnhub_types::updates::{NewStore, StoreUpdate};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::{AppState, blocking};

#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<Vec<Store>>> {
    let stores = state.stores.clone();
    let found = blocking(move || match query.q {
        Some(q) => stores.search(&q),
        None => stores.get_all(),
    })
    .await?;
    Ok(Json(found))
}

pub async fn nearby(
    State(state): State<AppState>,
    Query(origin): Query<NearbyQuery>,
) -> Result<Json<Vec<NearbyStore>>> {
    let stores = state.stores.clone();
    let nearby = blocking(move || stores.nearest(origin.lat, origin.lng)).await?;
    Ok(Json(nearby))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Store>> {
    let stores = state.stores.clone();
    let lookup = id.clone();
    blocking(move || stores.get_by_id(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Store {}", id)).into())
}

pub async fn products(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = state.products.clone();
    let listed = blocking(move || products.get_by_store_id(&id)).await?;
    Ok(Json(listed))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(data): Json<NewStore>,
) -> Result<impl IntoResponse> {
    let stores = state.stores.clone();
    let profiles = state.profiles.clone();
    let store = blocking(move || stores.create_for(&user, data, &profiles)).await?;

    Ok((StatusCode::CREATED, Json(store)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(update): Json<StoreUpdate>,
) -> Result<Json<Store>> {
    ensure_manager(&user, &id)?;

    let stores = state.stores.clone();
    let updated = blocking(move || stores.update(&id, update)).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<StatusCode> {
    ensure_manager(&user, &id)?;

    let stores = state.stores.clone();
    blocking(move || stores.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn ensure_manager(user: &AuthUser, store_id: &str) -> Result<()> {
    if !user.can_manage_store(store_id) {
        warn!(user_id = %user.id, store_id = %store_id, "Store access denied");
        return Err(ServiceError::Forbidden.into());
    }
    Ok(())
}
