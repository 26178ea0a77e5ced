pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod document_service;
pub use document_service::DocumentService;
