//! Local mirror backend.
//!
//! Keeps the whole store list and the whole product list as two JSON arrays,
//! one file per namespace. Every mutation reads the full list, changes it and
//! writes it back in one piece.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use pawnhub_types::models::{Product, Store};

use crate::catalog::{Catalog, ProductFilter};

const STORES_KEY: &str = "pawnhub_stores";
const PRODUCTS_KEY: &str = "pawnhub_products";

pub struct LocalCatalog {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl LocalCatalog {
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create local storage dir {}", dir.display()))?;

        let catalog = Self {
            dir: dir.to_path_buf(),
            lock: Mutex::new(()),
        };
        for key in [STORES_KEY, PRODUCTS_KEY] {
            let path = catalog.path(key);
            if !path.exists() {
                fs::write(&path, "[]")?;
            }
        }

        info!("Local catalog opened at {}", dir.display());
        Ok(catalog)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|e| anyhow::anyhow!("Local catalog lock poisoned: {}", e))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let path = self.path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).with_context(|| format!("corrupt namespace {}", key))
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(items)?)?;
        fs::rename(&tmp, &path)?;
        debug!(namespace = key, count = items.len(), "Wrote namespace");
        Ok(())
    }
}

impl Catalog for LocalCatalog {
    // -- Stores --

    fn list_stores(&self) -> Result<Vec<Store>> {
        let _guard = self.guard()?;
        let mut stores: Vec<Store> = self.load(STORES_KEY)?;
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stores)
    }

    fn get_store(&self, id: &str) -> Result<Option<Store>> {
        let _guard = self.guard()?;
        let stores: Vec<Store> = self.load(STORES_KEY)?;
        Ok(stores.into_iter().find(|s| s.id == id))
    }

    fn insert_store(&self, store: &Store) -> Result<()> {
        let _guard = self.guard()?;
        let mut stores: Vec<Store> = self.load(STORES_KEY)?;
        if stores.iter().any(|s| s.id == store.id) {
            bail!("Store already exists: {}", store.id);
        }
        stores.push(store.clone());
        self.save(STORES_KEY, &stores)
    }

    fn replace_store(&self, store: &Store) -> Result<bool> {
        let _guard = self.guard()?;
        let mut stores: Vec<Store> = self.load(STORES_KEY)?;
        let Some(slot) = stores.iter_mut().find(|s| s.id == store.id) else {
            return Ok(false);
        };
        *slot = store.clone();
        self.save(STORES_KEY, &stores)?;
        Ok(true)
    }

    fn delete_store(&self, id: &str) -> Result<bool> {
        let _guard = self.guard()?;
        let mut stores: Vec<Store> = self.load(STORES_KEY)?;
        let before = stores.len();
        stores.retain(|s| s.id != id);
        if stores.len() == before {
            return Ok(false);
        }

        // No foreign keys here, so the cascade is explicit. Stores go first:
        // if the products write fails, what is left is orphan products.
        self.save(STORES_KEY, &stores)?;
        let mut products: Vec<Product> = self.load(PRODUCTS_KEY)?;
        products.retain(|p| p.store_id != id);
        self.save(PRODUCTS_KEY, &products)?;
        Ok(true)
    }

    // -- Products --

    fn list_products(&self, filter: ProductFilter<'_>) -> Result<Vec<Product>> {
        let _guard = self.guard()?;
        let products: Vec<Product> = self.load(PRODUCTS_KEY)?;

        // Reverse insertion order first so the stable sort puts later inserts
        // ahead of earlier ones with the same timestamp.
        let mut matched: Vec<Product> = products
            .into_iter()
            .rev()
            .filter(|p| filter.matches(p))
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    fn get_product(&self, id: &str) -> Result<Option<Product>> {
        let _guard = self.guard()?;
        let products: Vec<Product> = self.load(PRODUCTS_KEY)?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    fn insert_product(&self, product: &Product) -> Result<()> {
        let _guard = self.guard()?;
        let stores: Vec<Store> = self.load(STORES_KEY)?;
        if !stores.iter().any(|s| s.id == product.store_id) {
            bail!("Unknown store for product {}: {}", product.id, product.store_id);
        }

        let mut products: Vec<Product> = self.load(PRODUCTS_KEY)?;
        if products.iter().any(|p| p.id == product.id) {
            bail!("Product already exists: {}", product.id);
        }
        products.push(product.clone());
        self.save(PRODUCTS_KEY, &products)
    }

    fn replace_product(&self, product: &Product) -> Result<bool> {
        let _guard = self.guard()?;
        let mut products: Vec<Product> = self.load(PRODUCTS_KEY)?;
        let Some(slot) = products.iter_mut().find(|p| p.id == product.id) else {
            return Ok(false);
        };

        // Same fixed columns as the SQLite backend
        let store_id = std::mem::take(&mut slot.store_id);
        let created_at = slot.created_at;
        *slot = Product {
            store_id,
            created_at,
            ..product.clone()
        };
        self.save(PRODUCTS_KEY, &products)?;
        Ok(true)
    }

    fn delete_product(&self, id: &str) -> Result<bool> {
        let _guard = self.guard()?;
        let mut products: Vec<Product> = self.load(PRODUCTS_KEY)?;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Ok(false);
        }
        self.save(PRODUCTS_KEY, &products)?;
        Ok(true)
    }
}
