// src/db/billing_repo.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::document_store::{DocumentStore, Filter, StoreError};
use crate::models::billing::{BillRecord, CustomerBillRecord};

pub const BILLING_COLLECTION: &str = "billing";
pub const CUSTOMER_BILLING_COLLECTION: &str = "customerBilling";

/// Leituras tipadas sobre as coleções de faturamento. Só leitura: as notas
/// são escritas por outra frente do sistema.
#[derive(Clone)]
pub struct BillingRepository {
    store: Arc<dyn DocumentStore>,
}

impl BillingRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn all_bills(&self) -> Result<Vec<BillRecord>, StoreError> {
        let docs = self.store.read_all(BILLING_COLLECTION).await?;
        docs.into_iter().map(BillRecord::from_document).collect()
    }

    /// Notas com `date` dentro da faixa FECHADA [start, end].
    pub async fn bills_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BillRecord>, StoreError> {
        let filters = [
            Filter::gte("date", json!(start.timestamp_millis())),
            Filter::lte("date", json!(end.timestamp_millis())),
        ];
        let docs = self.store.read_where(BILLING_COLLECTION, &filters).await?;
        docs.into_iter().map(BillRecord::from_document).collect()
    }

    pub async fn customer_bills_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CustomerBillRecord>, StoreError> {
        let filters = [
            Filter::gte("date", json!(start.timestamp_millis())),
            Filter::lte("date", json!(end.timestamp_millis())),
        ];
        let docs = self
            .store
            .read_where(CUSTOMER_BILLING_COLLECTION, &filters)
            .await?;
        docs.into_iter()
            .map(CustomerBillRecord::from_document)
            .collect()
    }
}
