// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Catálogo ---
        handlers::catalog::get_catalog,
        handlers::catalog::refresh_catalog,
        handlers::catalog::set_category,
        handlers::catalog::set_search,
        handlers::catalog::toggle_select_all,
        handlers::catalog::set_selection,
        handlers::catalog::toggle_description,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::bulk_delete,

        // --- Documentos ---
        handlers::documents::export_product_list,
    ),
    components(
        schemas(
            // --- Dashboard ---
            models::dashboard::DashboardMetrics,
            models::dashboard::DashboardSnapshot,

            // --- Catálogo ---
            models::catalog::Product,
            models::catalog::ProductRowView,
            models::catalog::LoadPhase,
            models::catalog::CatalogSnapshot,
            models::catalog::BulkDeleteOutcome,
            models::catalog::BulkDeleteFailure,

            // --- Payloads ---
            handlers::catalog::ProductPayload,
            handlers::catalog::CategoryPayload,
            handlers::catalog::SearchPayload,
            handlers::catalog::SelectionPayload,
        )
    ),
    tags(
        (name = "Dashboard", description = "Métricas agregadas do painel"),
        (name = "Catálogo", description = "Gestão do catálogo de produtos"),
        (name = "Documentos", description = "Exportação de documentos")
    )
)]
pub struct ApiDoc;
