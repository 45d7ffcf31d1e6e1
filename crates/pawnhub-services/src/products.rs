use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use pawnhub_db::{Catalog, ProductFilter};
use pawnhub_types::models::{Product, ProductCategory};
use pawnhub_types::updates::{NewProduct, ProductUpdate};

use crate::error::{Result, ServiceError};
use crate::merge::MergePolicy;

/// CRUD and partial-update merging for products.
#[derive(Clone)]
pub struct ProductService {
    catalog: Arc<dyn Catalog>,
    policy: MergePolicy,
}

impl ProductService {
    pub fn new(catalog: Arc<dyn Catalog>, policy: MergePolicy) -> Self {
        Self { catalog, policy }
    }

    /// All products, newest first.
    pub fn get_all(&self) -> Result<Vec<Product>> {
        Ok(self.catalog.list_products(ProductFilter::All)?)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.catalog.get_product(id)?)
    }

    pub fn get_by_store_id(&self, store_id: &str) -> Result<Vec<Product>> {
        Ok(self.catalog.list_products(ProductFilter::Store(store_id))?)
    }

    pub fn get_by_category(&self, category: ProductCategory) -> Result<Vec<Product>> {
        Ok(self.catalog.list_products(ProductFilter::Category(category))?)
    }

    pub fn create(&self, data: NewProduct) -> Result<Product> {
        if self.catalog.get_store(&data.store_id)?.is_none() {
            return Err(ServiceError::Validation(format!(
                "unknown store {}",
                data.store_id
            )));
        }

        let now = now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            store_id: data.store_id,
            name: data.name,
            description: data.description,
            category: data.category,
            condition: data.condition,
            price: data.price,
            images: data.images,
            created_at: now,
            updated_at: now,
        };
        validate(&product)?;

        self.catalog.insert_product(&product)?;
        info!(product_id = %product.id, store_id = %product.store_id, "Product created");
        Ok(product)
    }

    pub fn update(&self, id: &str, update: ProductUpdate) -> Result<Product> {
        let current = self
            .catalog
            .get_product(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {}", id)))?;

        let merged = apply_update(self.policy, current, update);
        validate(&merged)?;

        if !self.catalog.replace_product(&merged)? {
            return Err(ServiceError::NotFound(format!("Product {}", id)));
        }
        debug!(product_id = %id, "Product updated");
        Ok(merged)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        if !self.catalog.delete_product(id)? {
            return Err(ServiceError::NotFound(format!("Product {}", id)));
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

/// Stored timestamps keep microseconds; truncate so records compare equal
/// after a round trip.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn apply_update(policy: MergePolicy, current: Product, update: ProductUpdate) -> Product {
    Product {
        id: current.id,
        store_id: current.store_id,
        name: policy.field(current.name, update.name),
        description: policy.field(current.description, update.description),
        category: policy.field(current.category, update.category),
        condition: policy.field(current.condition, update.condition),
        price: policy.field(current.price, update.price),
        images: policy.field(current.images, update.images),
        created_at: current.created_at,
        updated_at: now().max(current.created_at),
    }
}

fn validate(product: &Product) -> Result<()> {
    if product.name.trim().is_empty() {
        return Err(ServiceError::Validation("product name is required".into()));
    }
    if !product.price.is_finite() || product.price < 0.0 {
        return Err(ServiceError::Validation(format!(
            "price must be a non-negative number, got {}",
            product.price
        )));
    }
    Ok(())
}
