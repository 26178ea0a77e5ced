pub mod document_store;
pub use document_store::{Document, DocumentStore, Filter, FilterOp, StoreError};
pub mod pg_store;
pub use pg_store::PgDocumentStore;
pub mod billing_repo;
pub use billing_repo::BillingRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;

#[cfg(test)]
pub mod memory_store;
