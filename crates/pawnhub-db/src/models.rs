//! Database row types: these map directly to SQLite rows.
//! Distinct from pawnhub-types models to keep the DB layer independent;
//! conversion into the domain types happens here.
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use pawnhub_types::models::{
    AuthUser, Contact, Favorite, Location, Product, Store, StoreHours,
};

pub struct StoreRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub phone: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub url: Option<String>,
    pub hours: Option<String>,
}

impl StoreRow {
    pub fn into_store(self) -> Result<Store> {
        let hours = match self.hours {
            Some(json) => Some(
                serde_json::from_str::<StoreHours>(&json)
                    .with_context(|| format!("corrupt hours for store {}", self.id))?,
            ),
            None => None,
        };

        Ok(Store {
            id: self.id,
            name: self.name,
            description: self.description,
            location: Location {
                address: self.address,
                lat: self.lat,
                lng: self.lng,
            },
            contact: Contact {
                phone: self.phone,
                email: self.email,
                website: self.website,
            },
            hours,
            url: self.url,
        })
    }
}

pub struct ProductRow {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub price: f64,
    /// JSON-encoded array of image URIs.
    pub images: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ProductRow {
    pub fn into_product(self) -> Result<Product> {
        let images: Vec<String> = serde_json::from_str(&self.images)
            .with_context(|| format!("corrupt images for product {}", self.id))?;

        Ok(Product {
            category: self.category.parse()?,
            condition: self.condition.parse()?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            store_id: self.store_id,
            name: self.name,
            description: self.description,
            price: self.price,
            images,
        })
    }
}

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub store_id: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
}

impl UserRow {
    pub fn into_user(self, favorites: Vec<Favorite>) -> Result<AuthUser> {
        Ok(AuthUser {
            role: self.role.parse()?,
            id: self.id,
            email: self.email,
            name: self.name,
            store_id: self.store_id,
            avatar: self.avatar,
            phone: self.phone,
            favorites,
        })
    }
}

pub struct FavoriteRow {
    pub item_id: String,
    pub kind: String,
    pub name: String,
    pub address: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
}

impl FavoriteRow {
    pub fn into_favorite(self) -> Result<Favorite> {
        Ok(Favorite {
            kind: self.kind.parse()?,
            id: self.item_id,
            name: self.name,
            image: self.image,
            price: self.price,
            address: self.address,
        })
    }
}

/// Fixed-width UTC text so that lexical order is chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid timestamp: {}", raw))?;
    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_sort_lexically() {
        let earlier = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = earlier + chrono::Duration::microseconds(1);
        let a = format_timestamp(&earlier);
        let b = format_timestamp(&later);
        assert!(a < b);
        assert_eq!(parse_timestamp(&a).unwrap(), earlier);
    }

    #[test]
    fn bad_category_is_an_error() {
        let row = ProductRow {
            id: "p1".into(),
            store_id: "s1".into(),
            name: "Thing".into(),
            description: String::new(),
            category: "furniture".into(),
            condition: "good".into(),
            price: 1.0,
            images: "[]".into(),
            created_at: "2026-01-02T03:04:05.000000Z".into(),
            updated_at: "2026-01-02T03:04:05.000000Z".into(),
        };
        assert!(row.into_product().is_err());
    }
}
