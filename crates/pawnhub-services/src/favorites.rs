//! Favorites reconciliation.
//!
//! The list on `AuthUser` never holds two entries with the same (id, type).
//! Without a signed-in user every operation is a no-op that asks the caller
//! to show a sign-in notice.

use tracing::{debug, info};

use pawnhub_types::models::{AuthUser, Favorite, FavoriteKind};
use pawnhub_types::updates::ProfileUpdate;

use crate::error::{Result, ServiceError};
use crate::products::ProductService;
use crate::profile::ProfileService;
use crate::stores::StoreService;

pub const SIGN_IN_NOTICE: &str = "Please sign in to add favorites";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Remove the entry if present, otherwise append `entry`.
pub fn toggle(favorites: &mut Vec<Favorite>, entry: Favorite) -> Toggle {
    if remove(favorites, &entry.id, entry.kind) {
        Toggle::Removed
    } else {
        favorites.push(entry);
        Toggle::Added
    }
}

/// Drop every entry matching (id, kind). Returns whether anything was removed.
pub fn remove(favorites: &mut Vec<Favorite>, id: &str, kind: FavoriteKind) -> bool {
    let before = favorites.len();
    favorites.retain(|f| !f.matches(id, kind));
    favorites.len() != before
}

pub fn is_favorite(user: Option<&AuthUser>, id: &str, kind: FavoriteKind) -> bool {
    user.is_some_and(|u| u.favorites.iter().any(|f| f.matches(id, kind)))
}

#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteOutcome {
    SignInRequired,
    Added(AuthUser),
    Removed(AuthUser),
    Unchanged(AuthUser),
}

impl FavoriteOutcome {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::SignInRequired => None,
            Self::Added(u) | Self::Removed(u) | Self::Unchanged(u) => Some(u),
        }
    }
}

/// Resolves favorite targets and saves the reconciled list through the
/// profile service.
#[derive(Clone)]
pub struct FavoritesService {
    stores: StoreService,
    products: ProductService,
    profiles: ProfileService,
}

impl FavoritesService {
    pub fn new(stores: StoreService, products: ProductService, profiles: ProfileService) -> Self {
        Self {
            stores,
            products,
            profiles,
        }
    }

    pub fn toggle(
        &self,
        user: Option<&AuthUser>,
        id: &str,
        kind: FavoriteKind,
    ) -> Result<FavoriteOutcome> {
        let Some(user) = user else {
            info!(item_id = %id, kind = %kind, "Favorite toggle without sign-in");
            return Ok(FavoriteOutcome::SignInRequired);
        };

        let mut favorites = user.favorites.clone();
        let outcome = if remove(&mut favorites, id, kind) {
            Toggle::Removed
        } else {
            // Snapshot only on add; removing works even if the target is gone
            toggle(&mut favorites, self.snapshot(id, kind)?)
        };

        let saved = self.save(user, favorites)?;
        debug!(user_id = %saved.id, item_id = %id, kind = %kind, ?outcome, "Favorite toggled");
        Ok(match outcome {
            Toggle::Added => FavoriteOutcome::Added(saved),
            Toggle::Removed => FavoriteOutcome::Removed(saved),
        })
    }

    pub fn remove(
        &self,
        user: Option<&AuthUser>,
        id: &str,
        kind: FavoriteKind,
    ) -> Result<FavoriteOutcome> {
        let Some(user) = user else {
            return Ok(FavoriteOutcome::SignInRequired);
        };

        let mut favorites = user.favorites.clone();
        if !remove(&mut favorites, id, kind) {
            return Ok(FavoriteOutcome::Unchanged(user.clone()));
        }

        let saved = self.save(user, favorites)?;
        Ok(FavoriteOutcome::Removed(saved))
    }

    fn snapshot(&self, id: &str, kind: FavoriteKind) -> Result<Favorite> {
        match kind {
            FavoriteKind::Store => self
                .stores
                .get_by_id(id)?
                .map(|s| Favorite::for_store(&s))
                .ok_or_else(|| ServiceError::NotFound(format!("Store {}", id))),
            FavoriteKind::Product => self
                .products
                .get_by_id(id)?
                .map(|p| Favorite::for_product(&p))
                .ok_or_else(|| ServiceError::NotFound(format!("Product {}", id))),
        }
    }

    fn save(&self, user: &AuthUser, favorites: Vec<Favorite>) -> Result<AuthUser> {
        self.profiles.update_profile(
            Some(user),
            ProfileUpdate {
                favorites: Some(favorites),
                ..ProfileUpdate::default()
            },
        )
    }
}
