use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use pawnhub_db::Catalog;
use pawnhub_types::api::NearbyStore;
use pawnhub_types::models::{AuthUser, Contact, Location, Store, UserRole};
use pawnhub_types::updates::{NewStore, StoreUpdate};

use crate::error::{Result, ServiceError};
use crate::geo;
use crate::merge::MergePolicy;
use crate::profile::ProfileService;

/// CRUD and partial-update merging for stores.
#[derive(Clone)]
pub struct StoreService {
    catalog: Arc<dyn Catalog>,
    policy: MergePolicy,
}

impl StoreService {
    pub fn new(catalog: Arc<dyn Catalog>, policy: MergePolicy) -> Self {
        Self { catalog, policy }
    }

    /// All stores, by name.
    pub fn get_all(&self) -> Result<Vec<Store>> {
        Ok(self.catalog.list_stores()?)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Store>> {
        Ok(self.catalog.get_store(id)?)
    }

    /// Case-insensitive match on name or address. An empty query matches all.
    pub fn search(&self, query: &str) -> Result<Vec<Store>> {
        let needle = query.trim().to_lowercase();
        let stores = self.catalog.list_stores()?;
        if needle.is_empty() {
            return Ok(stores);
        }

        Ok(stores
            .into_iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle)
                    || s.location.address.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Stores ordered by distance from the given point.
    pub fn nearest(&self, lat: f64, lng: f64) -> Result<Vec<NearbyStore>> {
        let mut nearby: Vec<NearbyStore> = self
            .catalog
            .list_stores()?
            .into_iter()
            .map(|store| {
                let distance =
                    geo::calculate_distance(lat, lng, store.location.lat, store.location.lng);
                NearbyStore {
                    travel_time: geo::estimate_travel_time(distance),
                    distance,
                    store,
                }
            })
            .collect();

        nearby.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(nearby)
    }

    pub fn create(&self, data: NewStore) -> Result<Store> {
        let store = Store {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            location: data.location,
            contact: data.contact,
            hours: data.hours,
            url: data.url,
        };
        validate(&store)?;

        self.catalog.insert_store(&store)?;
        info!(store_id = %store.id, name = %store.name, "Store created");
        Ok(store)
    }

    /// Creates a store on behalf of `owner`. A store owner manages a single
    /// store and gets linked to it; if the link cannot be saved the new store
    /// is removed again.
    pub fn create_for(
        &self,
        owner: &AuthUser,
        data: NewStore,
        profiles: &ProfileService,
    ) -> Result<Store> {
        match owner.role {
            UserRole::Customer => {
                warn!(user_id = %owner.id, "Customer tried to create a store");
                return Err(ServiceError::Forbidden);
            }
            UserRole::Admin => return self.create(data),
            UserRole::StoreOwner => {}
        }

        // A link to a store that has since been deleted does not count
        if let Some(existing) = &owner.store_id {
            if self.catalog.get_store(existing)?.is_some() {
                warn!(user_id = %owner.id, store_id = %existing, "Owner already has a store");
                return Err(ServiceError::Conflict(format!(
                    "user {} already owns store {}",
                    owner.id, existing
                )));
            }
        }

        let store = self.create(data)?;
        if let Err(e) = profiles.link_store(owner, &store.id) {
            if let Err(undo) = self.catalog.delete_store(&store.id) {
                error!(store_id = %store.id, "Failed to remove unlinked store: {}", undo);
            }
            return Err(e);
        }
        Ok(store)
    }

    pub fn update(&self, id: &str, update: StoreUpdate) -> Result<Store> {
        let current = self
            .catalog
            .get_store(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {}", id)))?;

        let merged = apply_update(self.policy, current, update);
        validate(&merged)?;

        if !self.catalog.replace_store(&merged)? {
            // Deleted between the read and the write
            return Err(ServiceError::NotFound(format!("Store {}", id)));
        }
        debug!(store_id = %id, "Store updated");
        Ok(merged)
    }

    /// Removes the store together with its products.
    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.catalog.delete_store(id)? {
            return Err(ServiceError::NotFound(format!("Store {}", id)));
        }
        info!(store_id = %id, "Store deleted");
        Ok(())
    }
}

fn apply_update(policy: MergePolicy, current: Store, update: StoreUpdate) -> Store {
    let location = update.location.unwrap_or_default();
    let contact = update.contact.unwrap_or_default();

    Store {
        id: current.id,
        name: policy.field(current.name, update.name),
        description: policy.optional(current.description, update.description),
        location: Location {
            address: policy.field(current.location.address, location.address),
            lat: policy.field(current.location.lat, location.lat),
            lng: policy.field(current.location.lng, location.lng),
        },
        contact: Contact {
            phone: policy.field(current.contact.phone, contact.phone),
            email: policy.optional(current.contact.email, contact.email),
            website: policy.optional(current.contact.website, contact.website),
        },
        hours: policy.optional(current.hours, update.hours),
        url: policy.optional(current.url, update.url),
    }
}

fn validate(store: &Store) -> Result<()> {
    let required = [
        ("name", &store.name),
        ("address", &store.location.address),
        ("phone", &store.contact.phone),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ServiceError::Validation(format!("store {} is required", field)));
        }
    }
    Ok(())
}
