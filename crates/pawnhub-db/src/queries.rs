use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Row, params};
use tracing::debug;

use pawnhub_types::models::{Product, Store};

use crate::Database;
use crate::catalog::{Catalog, ProductFilter};
use crate::models::{ProductRow, StoreRow, format_timestamp};

const STORE_COLUMNS: &str =
    "id, name, description, address, lat, lng, phone, email, website, url, hours";

const PRODUCT_COLUMNS: &str =
    "id, store_id, name, description, category, condition, price, images, created_at, updated_at";

impl Catalog for Database {
    // -- Stores --

    fn list_stores(&self) -> Result<Vec<Store>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM stores ORDER BY name", STORE_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], store_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(StoreRow::into_store).collect()
        })
    }

    fn get_store(&self, id: &str) -> Result<Option<Store>> {
        self.with_conn(|conn| query_store(conn, id))
    }

    fn insert_store(&self, store: &Store) -> Result<()> {
        let hours = encode_hours(store)?;
        let now = format_timestamp(&Utc::now());

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO stores (id, name, description, address, lat, lng, phone, email, website, url, hours, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
                params![
                    store.id,
                    store.name,
                    store.description,
                    store.location.address,
                    store.location.lat,
                    store.location.lng,
                    store.contact.phone,
                    store.contact.email,
                    store.contact.website,
                    store.url,
                    hours,
                    now,
                ],
            )?;
            debug!(store_id = %store.id, "Inserted store");
            Ok(())
        })
    }

    fn replace_store(&self, store: &Store) -> Result<bool> {
        let hours = encode_hours(store)?;
        let now = format_timestamp(&Utc::now());

        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE stores
                 SET name = ?2, description = ?3, address = ?4, lat = ?5, lng = ?6,
                     phone = ?7, email = ?8, website = ?9, url = ?10, hours = ?11, updated_at = ?12
                 WHERE id = ?1",
                params![
                    store.id,
                    store.name,
                    store.description,
                    store.location.address,
                    store.location.lat,
                    store.location.lng,
                    store.contact.phone,
                    store.contact.email,
                    store.contact.website,
                    store.url,
                    hours,
                    now,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete_store(&self, id: &str) -> Result<bool> {
        // Products go with the store through ON DELETE CASCADE
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM stores WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Products --

    fn list_products(&self, filter: ProductFilter<'_>) -> Result<Vec<Product>> {
        self.with_conn(|conn| query_products(conn, filter))
    }

    fn get_product(&self, id: &str) -> Result<Option<Product>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([id], product_row).optional()?;

            row.map(ProductRow::into_product).transpose()
        })
    }

    fn insert_product(&self, product: &Product) -> Result<()> {
        let images = serde_json::to_string(&product.images)?;

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO products (id, store_id, name, description, category, condition, price, images, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    product.id,
                    product.store_id,
                    product.name,
                    product.description,
                    product.category.as_str(),
                    product.condition.as_str(),
                    product.price,
                    images,
                    format_timestamp(&product.created_at),
                    format_timestamp(&product.updated_at),
                ],
            )?;
            debug!(product_id = %product.id, store_id = %product.store_id, "Inserted product");
            Ok(())
        })
    }

    fn replace_product(&self, product: &Product) -> Result<bool> {
        let images = serde_json::to_string(&product.images)?;

        // store_id and created_at are fixed at creation
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE products
                 SET name = ?2, description = ?3, category = ?4, condition = ?5,
                     price = ?6, images = ?7, updated_at = ?8
                 WHERE id = ?1",
                params![
                    product.id,
                    product.name,
                    product.description,
                    product.category.as_str(),
                    product.condition.as_str(),
                    product.price,
                    images,
                    format_timestamp(&product.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete_product(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn encode_hours(store: &Store) -> Result<Option<String>> {
    Ok(match &store.hours {
        Some(hours) => Some(serde_json::to_string(hours)?),
        None => None,
    })
}

fn store_row(row: &Row<'_>) -> rusqlite::Result<StoreRow> {
    Ok(StoreRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        address: row.get(3)?,
        lat: row.get(4)?,
        lng: row.get(5)?,
        phone: row.get(6)?,
        email: row.get(7)?,
        website: row.get(8)?,
        url: row.get(9)?,
        hours: row.get(10)?,
    })
}

fn product_row(row: &Row<'_>) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(0)?,
        store_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        condition: row.get(5)?,
        price: row.get(6)?,
        images: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn query_store(conn: &Connection, id: &str) -> Result<Option<Store>> {
    let sql = format!("SELECT {} FROM stores WHERE id = ?1", STORE_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], store_row).optional()?;

    row.map(StoreRow::into_store).transpose()
}

fn query_products(conn: &Connection, filter: ProductFilter<'_>) -> Result<Vec<Product>> {
    // rowid breaks created_at ties so later inserts come first
    let order = "ORDER BY created_at DESC, rowid DESC";

    let rows = match filter {
        ProductFilter::All => {
            let sql = format!("SELECT {} FROM products {}", PRODUCT_COLUMNS, order);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_map([], product_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        ProductFilter::Store(store_id) => {
            let sql = format!(
                "SELECT {} FROM products WHERE store_id = ?1 {}",
                PRODUCT_COLUMNS, order
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_map([store_id], product_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        ProductFilter::Category(category) => {
            let sql = format!(
                "SELECT {} FROM products WHERE category = ?1 {}",
                PRODUCT_COLUMNS, order
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_map([category.as_str()], product_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    rows.into_iter().map(ProductRow::into_product).collect()
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
