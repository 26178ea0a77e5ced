// src/models/catalog.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::document_store::{Document, StoreError};

/// A forma como o produto vive no banco de documentos. Os nomes de campo são
/// os do banco (`regularprice`, `saleprice`), não os da API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDoc {
    pub sno: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "regularprice")]
    pub regular_price: Decimal,
    #[serde(rename = "saleprice")]
    pub sale_price: Decimal,
    pub category: String,
}

/// Produto com o id opaco atribuído pelo banco.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub sno: String,
    pub name: String,
    pub description: String,
    pub regular_price: Decimal,
    pub sale_price: Decimal,
    pub category: String,
}

impl Product {
    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        let fields: ProductDoc = serde_json::from_value(doc.data)
            .map_err(|e| StoreError::Malformed(format!("produto {}: {}", doc.id, e)))?;
        Ok(Self::from_parts(doc.id, fields))
    }

    pub fn from_parts(id: String, fields: ProductDoc) -> Self {
        Self {
            id,
            sno: fields.sno,
            name: fields.name,
            description: fields.description,
            regular_price: fields.regular_price,
            sale_price: fields.sale_price,
            category: fields.category,
        }
    }
}

/// Linha mantida pelo catálogo: o produto + o estado transitório de tela.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub product: Product,
    pub expanded: bool,
}

impl ProductRow {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            expanded: false,
        }
    }
}

/// Projeção de uma linha visível no snapshot devolvido pela API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRowView {
    #[serde(flatten)]
    pub product: Product,
    pub expanded: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
}

/// Snapshot imutável do estado do catálogo. `products` é o conjunto VISÍVEL
/// (busca + categoria aplicadas), recalculado a cada snapshot.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub phase: LoadPhase,
    pub products: Vec<ProductRowView>,
    pub loaded_count: usize,
    pub search_term: String,
    pub category: Option<String>,
    pub category_counts: BTreeMap<String, usize>,
    pub selected_ids: Vec<String>,
    pub select_all: bool,
    pub last_error: Option<String>,
}

/// Resultado consolidado da exclusão em massa: o que saiu e o que falhou.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<BulkDeleteFailure>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteFailure {
    pub id: String,
    pub reason: String,
}
