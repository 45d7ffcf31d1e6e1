//! Business rules over the catalog and user directory: partial-update
//! merging, store proximity, favorites and accounts.

pub mod error;
pub mod favorites;
pub mod geo;
pub mod identity;
pub mod merge;
pub mod products;
pub mod profile;
pub mod stores;

#[cfg(test)]
mod fixtures;

pub use error::{Result, ServiceError};
pub use favorites::{FavoriteOutcome, FavoritesService, SIGN_IN_NOTICE};
pub use identity::{IdentityProvider, LocalIdentity};
pub use merge::MergePolicy;
pub use products::ProductService;
pub use profile::ProfileService;
pub use stores::StoreService;
