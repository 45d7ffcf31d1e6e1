use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use pawnhub_types::api::Claims;
use pawnhub_types::models::AuthUser;

use crate::AppState;
use crate::error::{ApiError, Result};

/// The authenticated caller, inserted by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

/// The caller if a valid token was sent, inserted by [`optional_auth`].
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthUser>);

/// Reject the request unless it carries a valid token for an existing user.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;
    let user = resolve_user(&state, &token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Resolve the caller when possible; anonymous requests pass through.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let user = match bearer_token(&req) {
        Some(token) => resolve_user(&state, &token).await?,
        None => None,
    };

    req.extensions_mut().insert(Viewer(user));
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Tokens only carry the id; the user is reloaded so role and favorites are
/// current.
async fn resolve_user(state: &AppState, token: &str) -> Result<Option<AuthUser>> {
    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            debug!("Rejected token: {}", e);
            return Ok(None);
        }
    };

    let profiles = state.profiles.clone();
    crate::blocking(move || profiles.get_user(&claims.sub)).await
}
