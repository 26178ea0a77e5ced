// src/db/catalog_repo.rs

use std::sync::Arc;

use serde_json::json;

use super::document_store::{DocumentStore, Filter, StoreError};
use crate::models::catalog::{Product, ProductDoc};

pub const PRODUCTS_COLLECTION: &str = "products";

/// CRUD tipado sobre a coleção `products`.
#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn DocumentStore>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Result<Vec<Product>, StoreError> {
        let docs = self.store.read_all(PRODUCTS_COLLECTION).await?;
        docs.into_iter().map(Product::from_document).collect()
    }

    /// Sem categoria, cai na leitura completa; com categoria, vira um
    /// predicado de igualdade no banco.
    pub async fn by_category(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        match category {
            None => self.all().await,
            Some(category) => {
                let filters = [Filter::eq("category", json!(category))];
                let docs = self
                    .store
                    .read_where(PRODUCTS_COLLECTION, &filters)
                    .await?;
                docs.into_iter().map(Product::from_document).collect()
            }
        }
    }

    pub async fn create(&self, fields: &ProductDoc) -> Result<Product, StoreError> {
        let data = serde_json::to_value(fields)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let doc = self.store.insert(PRODUCTS_COLLECTION, data).await?;
        Product::from_document(doc)
    }

    pub async fn update(&self, id: &str, fields: &ProductDoc) -> Result<Product, StoreError> {
        let data = serde_json::to_value(fields)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let doc = self.store.update(PRODUCTS_COLLECTION, id, data).await?;
        Product::from_document(doc)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(PRODUCTS_COLLECTION, id).await
    }
}
