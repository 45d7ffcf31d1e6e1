//! Storage interfaces shared by every backend.
//!
//! The services layer only talks to these traits; which implementation sits
//! behind them is chosen when the application is assembled.

use anyhow::Result;
use pawnhub_types::models::{AuthUser, Product, ProductCategory, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFilter<'a> {
    All,
    Store(&'a str),
    Category(ProductCategory),
}

impl ProductFilter<'_> {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Store(store_id) => product.store_id == *store_id,
            Self::Category(category) => product.category == *category,
        }
    }
}

/// Store and product records.
///
/// Listing order is part of the contract: stores by name ascending, products
/// newest first (later inserts first when timestamps tie).
pub trait Catalog: Send + Sync {
    fn list_stores(&self) -> Result<Vec<Store>>;
    fn get_store(&self, id: &str) -> Result<Option<Store>>;
    fn insert_store(&self, store: &Store) -> Result<()>;
    /// Overwrites an existing store. Returns false if there was none.
    fn replace_store(&self, store: &Store) -> Result<bool>;
    /// Removes the store and all of its products.
    fn delete_store(&self, id: &str) -> Result<bool>;

    fn list_products(&self, filter: ProductFilter<'_>) -> Result<Vec<Product>>;
    fn get_product(&self, id: &str) -> Result<Option<Product>>;
    fn insert_product(&self, product: &Product) -> Result<()>;
    fn replace_product(&self, product: &Product) -> Result<bool>;
    fn delete_product(&self, id: &str) -> Result<bool>;
}

/// User accounts, their favorites and password hashes.
pub trait UserDirectory: Send + Sync {
    fn insert_user(&self, user: &AuthUser, password_hash: &str) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<AuthUser>>;
    /// Email lookup is case-insensitive.
    fn get_user_by_email(&self, email: &str) -> Result<Option<AuthUser>>;
    /// Writes profile fields and replaces the favorites list, atomically.
    fn save_user(&self, user: &AuthUser) -> Result<bool>;
    fn get_password_hash(&self, user_id: &str) -> Result<Option<String>>;
}

/// Behaviour every `Catalog` backend must share.
#[cfg(test)]
pub(crate) mod conformance {
    use super::*;
    use chrono::{Duration, Utc};
    use pawnhub_types::models::{Contact, Location, ProductCondition};

    pub fn store(id: &str, name: &str) -> Store {
        Store {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            location: Location {
                address: format!("{} Main St", id),
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

    pub fn product(id: &str, store_id: &str, category: ProductCategory, age_secs: i64) -> Product {
        let created = Utc::now() - Duration::seconds(age_secs);
        Product {
            id: id.to_string(),
            store_id: store_id.to_string(),
            name: format!("Product {}", id),
            description: "Used".into(),
            category,
            condition: ProductCondition::Good,
            price: 10.0,
            images: vec![format!("https://img.example/{}.jpg", id)],
            created_at: created,
            updated_at: created,
        }
    }

    pub fn run(catalog: &dyn Catalog) {
        stores_sorted_by_name(catalog);
        products_newest_first_and_filtered(catalog);
        replace_and_delete_report_existence(catalog);
        store_delete_cascades(catalog);
    }

    fn stores_sorted_by_name(catalog: &dyn Catalog) {
        catalog.insert_store(&store("b", "Zeta Pawn")).unwrap();
        catalog.insert_store(&store("a", "Alpha Pawn")).unwrap();
        catalog.insert_store(&store("c", "Midtown Pawn")).unwrap();

        let names: Vec<String> = catalog
            .list_stores()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Alpha Pawn", "Midtown Pawn", "Zeta Pawn"]);
        assert_eq!(catalog.get_store("a").unwrap(), Some(store("a", "Alpha Pawn")));
        assert!(catalog.get_store("missing").unwrap().is_none());
        assert!(catalog.insert_store(&store("a", "Duplicate")).is_err());
    }

    fn products_newest_first_and_filtered(catalog: &dyn Catalog) {
        catalog
            .insert_product(&product("p-old", "a", ProductCategory::Jewelry, 300))
            .unwrap();
        catalog
            .insert_product(&product("p-new", "b", ProductCategory::Jewelry, 10))
            .unwrap();
        catalog
            .insert_product(&product("p-mid", "a", ProductCategory::Tools, 100))
            .unwrap();

        let ids = |products: Vec<Product>| products.into_iter().map(|p| p.id).collect::<Vec<_>>();

        assert_eq!(
            ids(catalog.list_products(ProductFilter::All).unwrap()),
            vec!["p-new", "p-mid", "p-old"]
        );
        assert_eq!(
            ids(catalog.list_products(ProductFilter::Store("a")).unwrap()),
            vec!["p-mid", "p-old"]
        );
        assert_eq!(
            ids(catalog
                .list_products(ProductFilter::Category(ProductCategory::Jewelry))
                .unwrap()),
            vec!["p-new", "p-old"]
        );

        let fetched = catalog.get_product("p-mid").unwrap().unwrap();
        assert_eq!(fetched.images, vec!["https://img.example/p-mid.jpg"]);
        assert_eq!(fetched.category, ProductCategory::Tools);
    }

    fn replace_and_delete_report_existence(catalog: &dyn Catalog) {
        let mut renamed = store("c", "Midtown Pawn & Gold");
        renamed.description = Some("Open late".into());
        assert!(catalog.replace_store(&renamed).unwrap());
        assert_eq!(catalog.get_store("c").unwrap(), Some(renamed));
        assert!(!catalog.replace_store(&store("nope", "Nope")).unwrap());

        let mut repriced = catalog.get_product("p-old").unwrap().unwrap();
        repriced.price = 99.5;
        assert!(catalog.replace_product(&repriced).unwrap());
        assert_eq!(catalog.get_product("p-old").unwrap().unwrap().price, 99.5);

        assert!(catalog.delete_product("p-mid").unwrap());
        assert!(!catalog.delete_product("p-mid").unwrap());
        assert!(catalog.get_product("p-mid").unwrap().is_none());
    }

    fn store_delete_cascades(catalog: &dyn Catalog) {
        assert!(catalog.delete_store("a").unwrap());
        assert!(!catalog.delete_store("a").unwrap());
        assert!(catalog.get_product("p-old").unwrap().is_none());
        assert!(catalog.list_products(ProductFilter::Store("a")).unwrap().is_empty());
        // Other stores' products are untouched
        assert!(catalog.get_product("p-new").unwrap().is_some());
    }
}
