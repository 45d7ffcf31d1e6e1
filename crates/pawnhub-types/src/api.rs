use serde::{Deserialize, Serialize};

use crate::models::{AuthUser, Favorite, Store, UserRole};

// -- JWT Claims --

/// Bearer token claims. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Customer
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub token: String,
}

// -- Map --

/// A store with its distance (miles) and estimated travel time from a point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStore {
    pub store: Store,
    pub distance: f64,
    pub travel_time: String,
}

// -- Favorites --

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub added: bool,
    pub favorites: Vec<Favorite>,
}

#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub message: String,
}
