pub mod auth;
pub mod error;
pub mod favorites;
pub mod middleware;
pub mod products;
pub mod profile;
pub mod stores;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use tracing::error;

use pawnhub_db::{Catalog, UserDirectory};
use pawnhub_services::{
    FavoritesService, IdentityProvider, LocalIdentity, MergePolicy, ProductService,
    ProfileService, StoreService,
};

use crate::error::ApiError;
use crate::middleware::{optional_auth, require_auth};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub stores: StoreService,
    pub products: ProductService,
    pub profiles: ProfileService,
    pub favorites: FavoritesService,
    pub identity: Arc<dyn IdentityProvider>,
    pub jwt_secret: String,
}

impl AppStateInner {
    /// Wire the services over a catalog backend and the user directory.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        users: Arc<dyn UserDirectory>,
        policy: MergePolicy,
        jwt_secret: String,
    ) -> AppState {
        let stores = StoreService::new(catalog.clone(), policy);
        let products = ProductService::new(catalog, policy);
        let profiles = ProfileService::new(users.clone());
        let favorites = FavoritesService::new(stores.clone(), products.clone(), profiles.clone());

        Arc::new(Self {
            stores,
            products,
            profiles,
            favorites,
            identity: Arc::new(LocalIdentity::new(users)),
            jwt_secret,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/stores", get(stores::list))
        .route("/stores/nearby", get(stores::nearby))
        .route("/stores/{id}", get(stores::get))
        .route("/stores/{id}/products", get(stores::products))
        .route("/products", get(products::list))
        .route("/products/{id}", get(products::get));

    let protected_routes = Router::new()
        .route("/stores", post(stores::create))
        .route("/stores/{id}", patch(stores::update).delete(stores::delete))
        .route("/products", post(products::create))
        .route("/products/{id}", patch(products::update).delete(products::delete))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let viewer_routes = Router::new()
        .route("/me", get(profile::me).patch(profile::update))
        .route("/me/favorites", get(favorites::list))
        .route(
            "/me/favorites/{kind}/{id}",
            post(favorites::toggle).delete(favorites::remove),
        )
        .route_layer(from_fn_with_state(state.clone(), optional_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(viewer_routes)
        .with_state(state)
}

/// Run a synchronous service call off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> error::Result<T>
where
    F: FnOnce() -> pawnhub_services::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}
