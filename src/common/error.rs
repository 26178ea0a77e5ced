use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::document_store::StoreError;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Produto não encontrado")]
    ProductNotFound,

    // Toda operação contra o banco de documentos retorna um StoreError
    // categorizado (indisponível / não encontrado / permissão / malformado).
    #[error("Falha no banco de documentos: {0}")]
    Store(#[from] StoreError),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::ProductNotFound => (StatusCode::NOT_FOUND, "Produto não encontrado."),
            AppError::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Documento não encontrado.")
            }
            AppError::Store(StoreError::PermissionDenied) => {
                (StatusCode::FORBIDDEN, "O banco de documentos negou a operação.")
            }
            AppError::Store(StoreError::Unavailable(detail)) => {
                tracing::error!("Banco de documentos indisponível: {}", detail);
                (StatusCode::BAD_GATEWAY, "O banco de documentos está indisponível.")
            }
            AppError::Store(StoreError::Malformed(detail)) => {
                tracing::error!("Documento malformado vindo do banco: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Registro malformado no banco de documentos.",
                )
            }
            AppError::FontNotFound(detail) => {
                tracing::error!("Fonte do PDF ausente: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Fonte necessária para gerar o documento não foi encontrada.",
                )
            }
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
