//! Create and partial-update payloads.
//!
//! Every field of a partial update is an `Option`: `None` means the caller did
//! not supply the field. How a supplied value is merged is decided by the
//! services layer.

use serde::{Deserialize, Serialize};

use crate::models::{Contact, Favorite, Location, ProductCategory, ProductCondition, StoreHours};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: Location,
    pub contact: Contact,
    #[serde(default)]
    pub hours: Option<StoreHours>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub store_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ProductCategory,
    pub condition: ProductCondition,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<LocationUpdate>,
    pub contact: Option<ContactUpdate>,
    pub hours: Option<StoreHours>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationUpdate {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactUpdate {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// The owning store is fixed at creation, so it has no field here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub condition: Option<ProductCondition>,
    pub price: Option<f64>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub favorites: Option<Vec<Favorite>>,
}
