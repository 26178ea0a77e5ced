// src/handlers/documents.rs

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    common::error::AppError,
    config::AppState,
    services::document_service::PRODUCT_LIST_FILE_NAME,
};

// GET /api/catalog/export
#[utoipa::path(
    get,
    path = "/api/catalog/export",
    tag = "Documentos",
    responses(
        (status = 200, description = "PDF da lista de produtos, ordenado por S.No", content_type = "application/pdf"),
        (status = 500, description = "Fonte do PDF ausente ou falha de renderização")
    )
)]
pub async fn export_product_list(
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    // Cópia defensiva da lista carregada; a ordem de tela não muda.
    let products = app_state.catalog_service.loaded_products().await;
    let pdf_bytes = app_state.export_service.render_product_list(&products)?;

    // Configura os headers para o navegador baixar o PDF com o nome fixo.
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", PRODUCT_LIST_FILE_NAME),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
