// src/db/pg_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::document_store::{Document, DocumentStore, Filter, FilterOp, StoreError};

/// Implementação Postgres do banco de documentos: uma tabela `documents` com
/// a coleção e o payload JSONB. Predicados viram expressões sobre `data`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_sqlx_error(e: sqlx::Error) -> StoreError {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                // 42501 = insufficient_privilege
                if db_err.code().as_deref() == Some("42501") {
                    StoreError::PermissionDenied
                } else {
                    StoreError::Unavailable(db_err.to_string())
                }
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }

    fn parse_id(id: &str) -> Result<Uuid, StoreError> {
        // Um id que nem é UUID não pode existir na tabela.
        Uuid::parse_str(id).map_err(|_| StoreError::NotFound)
    }
}

fn row_to_document(row: &PgRow) -> Result<Document, StoreError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| StoreError::Malformed(e.to_string()))?;
    let data: Value = row
        .try_get("data")
        .map_err(|e| StoreError::Malformed(e.to_string()))?;
    Ok(Document { id: id.to_string(), data })
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_sqlx_error)?;

        rows.iter().map(row_to_document).collect()
    }

    async fn read_where(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(collection);

        for filter in filters {
            let op = match filter.op {
                FilterOp::Eq => " = ",
                FilterOp::Gte => " >= ",
                FilterOp::Lte => " <= ",
            };
            match &filter.value {
                // Valores numéricos comparam como número, não como texto.
                Value::Number(n) => {
                    builder.push(" AND (data->>");
                    builder.push_bind(filter.field.clone());
                    builder.push(")::numeric");
                    builder.push(op);
                    builder.push_bind(n.as_f64().unwrap_or_default());
                    builder.push("::numeric");
                }
                other => {
                    let text = match other {
                        Value::String(s) => s.clone(),
                        v => v.to_string(),
                    };
                    builder.push(" AND data->>");
                    builder.push_bind(filter.field.clone());
                    builder.push(op);
                    builder.push_bind(text);
                }
            }
        }

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_sqlx_error)?;

        rows.iter().map(row_to_document).collect()
    }

    async fn insert(&self, collection: &str, data: Value) -> Result<Document, StoreError> {
        let row = sqlx::query(
            "INSERT INTO documents (collection, data) VALUES ($1, $2) RETURNING id, data",
        )
        .bind(collection)
        .bind(&data)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_sqlx_error)?;

        row_to_document(&row)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let uuid = Self::parse_id(id)?;
        let row = sqlx::query(
            "UPDATE documents SET data = $3, updated_at = now() \
             WHERE collection = $1 AND id = $2 RETURNING id, data",
        )
        .bind(collection)
        .bind(uuid)
        .bind(&data)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_sqlx_error)?;

        row_to_document(&row)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let uuid = Self::parse_id(id)?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(uuid)
            .execute(&self.pool)
            .await
            .map_err(Self::map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
