// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::catalog::{BulkDeleteOutcome, CatalogSnapshot, Product, ProductDoc},
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload: Product (criação e edição usam a mesma forma)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O S.No é obrigatório."))]
    pub sno: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub regular_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Decimal,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,
}

impl ProductPayload {
    fn into_doc(self) -> ProductDoc {
        ProductDoc {
            sno: self.sno,
            name: self.name,
            description: self.description,
            regular_price: self.regular_price,
            sale_price: self.sale_price,
            category: self.category,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    // Ausente ou vazio = "All Products".
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchPayload {
    pub term: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    pub selected: bool,
}

// GET /api/catalog
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "Catálogo",
    responses(
        (status = 200, description = "Snapshot atual do catálogo (conjunto visível já projetado)", body = CatalogSnapshot)
    )
)]
pub async fn get_catalog(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.catalog_service.snapshot().await)
}

// POST /api/catalog/refresh
#[utoipa::path(
    post,
    path = "/api/catalog/refresh",
    tag = "Catálogo",
    responses(
        (status = 200, description = "Recarrega a lista e as contagens por categoria", body = CatalogSnapshot)
    )
)]
pub async fn refresh_catalog(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.catalog_service.load().await;
    Json(app_state.catalog_service.snapshot().await)
}

// PUT /api/catalog/category
#[utoipa::path(
    put,
    path = "/api/catalog/category",
    tag = "Catálogo",
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Troca o filtro de categoria e recarrega", body = CatalogSnapshot)
    )
)]
pub async fn set_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> impl IntoResponse {
    app_state.catalog_service.set_category(payload.category).await;
    Json(app_state.catalog_service.snapshot().await)
}

// PUT /api/catalog/search
#[utoipa::path(
    put,
    path = "/api/catalog/search",
    tag = "Catálogo",
    request_body = SearchPayload,
    responses(
        (status = 200, description = "Define o termo de busca; nenhuma consulta sai ao banco", body = CatalogSnapshot)
    )
)]
pub async fn set_search(
    State(app_state): State<AppState>,
    Json(payload): Json<SearchPayload>,
) -> impl IntoResponse {
    app_state.catalog_service.set_search(payload.term).await;
    Json(app_state.catalog_service.snapshot().await)
}

// POST /api/catalog/select-all
#[utoipa::path(
    post,
    path = "/api/catalog/select-all",
    tag = "Catálogo",
    responses(
        (status = 200, description = "Alterna entre selecionar o conjunto visível e limpar a seleção", body = CatalogSnapshot)
    )
)]
pub async fn toggle_select_all(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.catalog_service.toggle_select_all().await;
    Json(app_state.catalog_service.snapshot().await)
}

// PUT /api/catalog/products/{id}/selection
#[utoipa::path(
    put,
    path = "/api/catalog/products/{id}/selection",
    tag = "Catálogo",
    request_body = SelectionPayload,
    params(("id" = String, Path, description = "Id do produto")),
    responses(
        (status = 200, description = "Seleciona ou desseleciona uma linha", body = CatalogSnapshot),
        (status = 404, description = "Produto não está na lista carregada")
    )
)]
pub async fn set_selection(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SelectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .catalog_service
        .set_selected(&id, payload.selected)
        .await?;
    Ok(Json(app_state.catalog_service.snapshot().await))
}

// POST /api/catalog/products/{id}/toggle
#[utoipa::path(
    post,
    path = "/api/catalog/products/{id}/toggle",
    tag = "Catálogo",
    params(("id" = String, Path, description = "Id do produto")),
    responses(
        (status = 200, description = "Expande ou recolhe a descrição da linha", body = CatalogSnapshot),
        (status = 404, description = "Produto não está na lista carregada")
    )
)]
pub async fn toggle_description(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.toggle_expanded(&id).await?;
    Ok(Json(app_state.catalog_service.snapshot().await))
}

// POST /api/catalog/products
#[utoipa::path(
    post,
    path = "/api/catalog/products",
    tag = "Catálogo",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado; a lista é recarregada", body = Product),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.catalog_service.create(payload.into_doc()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/catalog/products/{id}
#[utoipa::path(
    put,
    path = "/api/catalog/products/{id}",
    tag = "Catálogo",
    request_body = ProductPayload,
    params(("id" = String, Path, description = "Id do produto")),
    responses(
        (status = 200, description = "Produto atualizado; a lista é recarregada", body = Product),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .catalog_service
        .update(&id, payload.into_doc())
        .await?;
    Ok(Json(product))
}

// DELETE /api/catalog/products/{id}
#[utoipa::path(
    delete,
    path = "/api/catalog/products/{id}",
    tag = "Catálogo",
    params(("id" = String, Path, description = "Id do produto")),
    responses(
        (status = 204, description = "Produto excluído e removido da lista local"),
        (status = 404, description = "Produto não encontrado"),
        (status = 502, description = "Banco de documentos indisponível; a lista local fica intocada")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/catalog/bulk-delete
#[utoipa::path(
    post,
    path = "/api/catalog/bulk-delete",
    tag = "Catálogo",
    responses(
        (status = 200, description = "Exclui a seleção atual; devolve o resultado consolidado", body = BulkDeleteOutcome)
    )
)]
pub async fn bulk_delete(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.catalog_service.bulk_delete().await)
}
