//! Shared test data.

use std::sync::Arc;

use pawnhub_db::Database;
use pawnhub_types::models::{
    AuthUser, Contact, Location, ProductCategory, ProductCondition, UserRole,
};
use pawnhub_types::updates::{NewProduct, NewStore};

use crate::merge::MergePolicy;
use crate::products::ProductService;
use crate::profile::ProfileService;
use crate::stores::StoreService;

pub fn test_pawn() -> NewStore {
    NewStore {
        name: "Test Pawn".into(),
        description: None,
        location: Location {
            address: "1 Main St".into(),
            lat: 25.0,
            lng: -80.0,
        },
        contact: Contact {
            phone: "555-1111".into(),
            email: None,
            website: None,
        },
        hours: None,
        url: None,
    }
}

pub fn guitar(store_id: &str) -> NewProduct {
    NewProduct {
        store_id: store_id.to_string(),
        name: "Fender Stratocaster".into(),
        description: "Sunburst, light wear".into(),
        category: ProductCategory::MusicalInstruments,
        condition: ProductCondition::Good,
        price: 650.0,
        images: vec!["https://img.example/strat-front.jpg".into()],
    }
}

pub fn customer(id: &str) -> AuthUser {
    AuthUser {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        name: "John Doe".into(),
        role: UserRole::Customer,
        store_id: None,
        avatar: None,
        phone: None,
        favorites: vec![],
    }
}

/// Services over one in-memory database.
pub struct Harness {
    pub db: Arc<Database>,
    pub stores: StoreService,
    pub products: ProductService,
    pub profiles: ProfileService,
}

pub fn harness() -> Harness {
    let db = Arc::new(Database::open_in_memory().unwrap());
    Harness {
        stores: StoreService::new(db.clone(), MergePolicy::SkipBlank),
        products: ProductService::new(db.clone(), MergePolicy::SkipBlank),
        profiles: ProfileService::new(db.clone()),
        db,
    }
}
