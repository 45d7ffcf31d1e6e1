use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use pawnhub_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use pawnhub_types::models::AuthUser;

use crate::error::{ApiError, Result};
use crate::{AppState, blocking};

const TOKEN_TTL_DAYS: i64 = 30;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let identity = state.identity.clone();
    let user = blocking(move || identity.register(&req)).await?;
    let token = issue(&state, &user)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let identity = state.identity.clone();
    let user = blocking(move || identity.login(&req)).await?;
    let token = issue(&state, &user)?;

    Ok(Json(AuthResponse { user, token }))
}

fn issue(state: &AppState, user: &AuthUser) -> Result<String> {
    create_token(&state.jwt_secret, user).map_err(|e| ApiError::Internal(e.to_string()))
}

pub fn create_token(secret: &str, user: &AuthUser) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
