use std::sync::Arc;

use tracing::{debug, warn};

use pawnhub_db::UserDirectory;
use pawnhub_types::models::{AuthUser, Favorite};
use pawnhub_types::updates::ProfileUpdate;

use crate::error::{Result, ServiceError};
use crate::identity::normalize_email;

/// Applies profile edits to the signed-in user and persists them.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserDirectory>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    pub fn get_user(&self, id: &str) -> Result<Option<AuthUser>> {
        Ok(self.users.get_user(id)?)
    }

    pub fn update_profile(
        &self,
        current: Option<&AuthUser>,
        mut update: ProfileUpdate,
    ) -> Result<AuthUser> {
        let current = current.ok_or(ServiceError::Unauthenticated)?;

        // Same rules as registration
        update.email = update.email.as_deref().map(normalize_email).transpose()?;

        if let Some(email) = &update.email {
            if *email != current.email {
                if let Some(other) = self.users.get_user_by_email(email)? {
                    if other.id != current.id {
                        warn!(user_id = %current.id, "Profile email already in use");
                        return Err(ServiceError::Conflict(format!(
                            "email {} is already registered",
                            email
                        )));
                    }
                }
            }
        }

        let merged = merge_profile(current, update);
        if !self.users.save_user(&merged)? {
            return Err(ServiceError::NotFound(format!("User {}", current.id)));
        }

        debug!(user_id = %merged.id, "Profile updated");
        Ok(merged)
    }

    /// Store owners get linked to the store they create.
    pub fn link_store(&self, user: &AuthUser, store_id: &str) -> Result<AuthUser> {
        let linked = AuthUser {
            store_id: Some(store_id.to_string()),
            ..user.clone()
        };
        if !self.users.save_user(&linked)? {
            return Err(ServiceError::NotFound(format!("User {}", user.id)));
        }
        Ok(linked)
    }
}

/// Shallow merge: every supplied field replaces the current one, including
/// empty strings and an empty favorites list.
pub fn merge_profile(current: &AuthUser, update: ProfileUpdate) -> AuthUser {
    let mut merged = current.clone();

    if let Some(name) = update.name {
        merged.name = name;
    }
    if let Some(email) = update.email {
        merged.email = email;
    }
    if let Some(phone) = update.phone {
        merged.phone = Some(phone);
    }
    if let Some(avatar) = update.avatar {
        merged.avatar = Some(avatar);
    }
    if let Some(favorites) = update.favorites {
        merged.favorites = dedup_favorites(favorites);
    }

    merged
}

/// First occurrence of each (id, type) wins.
fn dedup_favorites(favorites: Vec<Favorite>) -> Vec<Favorite> {
    let mut unique: Vec<Favorite> = Vec::with_capacity(favorites.len());
    for fav in favorites {
        if !unique.iter().any(|f| f.matches(&fav.id, fav.kind)) {
            unique.push(fav);
        }
    }
    unique
}
