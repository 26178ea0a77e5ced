// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

/// As cinco fatias do painel. Cada uma é atualizada pela sua própria busca e,
/// em caso de falha, mantém o último valor bom (inicialmente zero).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub number_of_bills: usize,
    pub number_of_products: usize,
    // Mantido como texto já formatado com 2 casas, como a tela exibe.
    pub today_total_amount: String,
    pub today_number_of_bills: usize,
    pub today_number_of_customer_bills: usize,
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self {
            number_of_bills: 0,
            number_of_products: 0,
            today_total_amount: "0.00".to_string(),
            today_number_of_bills: 0,
            today_number_of_customer_bills: 0,
        }
    }
}

/// Snapshot devolvido pela API: as métricas + quais fatias ficaram degradadas
/// (falharam na última atualização e seguram o último valor bom).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(flatten)]
    pub metrics: DashboardMetrics,
    pub degraded: Vec<String>,
}
