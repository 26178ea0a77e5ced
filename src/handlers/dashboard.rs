// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{config::AppState, models::dashboard::DashboardSnapshot};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Métricas agregadas do painel; fatias que falharem seguram o último valor bom", body = DashboardSnapshot)
    )
)]
pub async fn get_summary(State(app_state): State<AppState>) -> impl IntoResponse {
    // As três buscas saem concorrentes; falhas degradam sem derrubar a resposta.
    app_state.dashboard_service.refresh().await;
    Json(app_state.dashboard_service.snapshot().await)
}
