use axum::{Extension, Json, extract::State};

use pawnhub_services::ServiceError;
use pawnhub_types::models::AuthUser;
use pawnhub_types::updates::ProfileUpdate;

use crate::error::Result;
use crate::middleware::Viewer;
use crate::{AppState, blocking};

pub async fn me(Extension(Viewer(user)): Extension<Viewer>) -> Result<Json<AuthUser>> {
    user.map(Json).ok_or_else(|| ServiceError::Unauthenticated.into())
}

pub async fn update(
    State(state): State<AppState>,
    Extension(Viewer(user)): Extension<Viewer>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<AuthUser>> {
    let profiles = state.profiles.clone();
    let merged = blocking(move || profiles.update_profile(user.as_ref(), update)).await?;
    Ok(Json(merged))
}
