// src/db/document_store.rs

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Um registro do banco de documentos: id opaco atribuído pelo banco + payload.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

/// Predicado campo/operador/valor. Vários predicados são combinados com AND.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self { field: field.into(), op: FilterOp::Eq, value }
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self { field: field.into(), op: FilterOp::Gte, value }
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self { field: field.into(), op: FilterOp::Lte, value }
    }
}

// Erro categorizado de TODA operação contra o banco de documentos. Quem chama
// sempre decide o que fazer com cada braço; nada é engolido em silêncio.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("banco de documentos indisponível: {0}")]
    Unavailable(String),

    #[error("documento não encontrado")]
    NotFound,

    #[error("permissão negada pelo banco de documentos")]
    PermissionDenied,

    #[error("documento malformado: {0}")]
    Malformed(String),
}

/// A interface do colaborador externo (banco de documentos hospedado).
/// Injetada como dependência explícita para permitir um fake nos testes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn read_where(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert(&self, collection: &str, data: Value) -> Result<Document, StoreError>;

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
