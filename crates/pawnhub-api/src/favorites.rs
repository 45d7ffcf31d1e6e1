use axum::{
    Extension, Json,
    extract::{Path, State},
};

use pawnhub_services::FavoriteOutcome;
use pawnhub_types::api::ToggleFavoriteResponse;
use pawnhub_types::models::{Favorite, FavoriteKind};

use crate::error::{ApiError, Result};
use crate::middleware::Viewer;
use crate::{AppState, blocking};

pub async fn list(Extension(Viewer(user)): Extension<Viewer>) -> Result<Json<Vec<Favorite>>> {
    let user = user.ok_or(ApiError::SignInRequired)?;
    Ok(Json(user.favorites))
}

pub async fn toggle(
    State(state): State<AppState>,
    Path((kind, id)): Path<(FavoriteKind, String)>,
    Extension(Viewer(user)): Extension<Viewer>,
) -> Result<Json<ToggleFavoriteResponse>> {
    let favorites = state.favorites.clone();
    let outcome = blocking(move || favorites.toggle(user.as_ref(), &id, kind)).await?;

    let (added, user) = match outcome {
        FavoriteOutcome::SignInRequired => return Err(ApiError::SignInRequired),
        FavoriteOutcome::Added(user) => (true, user),
        FavoriteOutcome::Removed(user) | FavoriteOutcome::Unchanged(user) => (false, user),
    };

    Ok(Json(ToggleFavoriteResponse {
        added,
        favorites: user.favorites,
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    Path((kind, id)): Path<(FavoriteKind, String)>,
    Extension(Viewer(user)): Extension<Viewer>,
) -> Result<Json<Vec<Favorite>>> {
    let favorites = state.favorites.clone();
    let outcome = blocking(move || favorites.remove(user.as_ref(), &id, kind)).await?;

    match outcome {
        FavoriteOutcome::SignInRequired => Err(ApiError::SignInRequired),
        FavoriteOutcome::Added(user)
        | FavoriteOutcome::Removed(user)
        | FavoriteOutcome::Unchanged(user) => Ok(Json(user.favorites)),
    }
}
