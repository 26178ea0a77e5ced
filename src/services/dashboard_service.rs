// src/services/dashboard_service.rs

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Utc};
use tokio::sync::RwLock;

use crate::{
    db::{document_store::StoreError, BillingRepository, CatalogRepository},
    models::billing::BillRecord,
    models::dashboard::{DashboardMetrics, DashboardSnapshot},
};

/// O agregador de métricas do painel. Guarda o último snapshot bom e o
/// atualiza com três buscas independentes e concorrentes; a falha de uma
/// fatia não derruba as outras nem apaga o valor anterior.
#[derive(Clone)]
pub struct DashboardService {
    billing_repo: BillingRepository,
    catalog_repo: CatalogRepository,
    state: Arc<RwLock<DashboardState>>,
}

#[derive(Default)]
struct DashboardState {
    metrics: DashboardMetrics,
    degraded: Vec<String>,
    generation: u64,
}

struct TodayMetrics {
    total_amount: f64,
    bill_count: usize,
    customer_bill_count: usize,
}

impl DashboardService {
    pub fn new(billing_repo: BillingRepository, catalog_repo: CatalogRepository) -> Self {
        Self {
            billing_repo,
            catalog_repo,
            state: Arc::new(RwLock::new(DashboardState::default())),
        }
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read().await;
        DashboardSnapshot {
            metrics: state.metrics.clone(),
            degraded: state.degraded.clone(),
        }
    }

    /// Dispara as três buscas sem ordem garantida entre elas. Cada fatia
    /// atualiza o estado de forma independente; em falha, loga e mantém o
    /// último valor bom.
    pub async fn refresh(&self) {
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.generation
        };

        let (bills, products, today) = tokio::join!(
            self.billing_repo.all_bills(),
            self.catalog_repo.all(),
            self.fetch_today_metrics(),
        );

        let mut state = self.state.write().await;
        if state.generation != generation {
            // Um refresh mais novo já passou por aqui; este resultado é velho.
            tracing::warn!("Refresh do painel obsoleto descartado");
            return;
        }
        state.degraded.clear();

        match bills {
            Ok(bills) => state.metrics.number_of_bills = distinct_invoice_count(&bills),
            Err(e) => {
                tracing::error!("Falha ao buscar a contagem de notas: {}", e);
                state.degraded.push("numberOfBills".to_string());
            }
        }

        match products {
            Ok(products) => state.metrics.number_of_products = products.len(),
            Err(e) => {
                tracing::error!("Falha ao buscar a contagem de produtos: {}", e);
                state.degraded.push("numberOfProducts".to_string());
            }
        }

        match today {
            Ok(today) => {
                state.metrics.today_total_amount = format!("{:.2}", today.total_amount);
                state.metrics.today_number_of_bills = today.bill_count;
                state.metrics.today_number_of_customer_bills = today.customer_bill_count;
            }
            Err(e) => {
                tracing::error!("Falha ao buscar as métricas de hoje: {}", e);
                state.degraded.push("todayMetrics".to_string());
            }
        }
    }

    async fn fetch_today_metrics(&self) -> Result<TodayMetrics, StoreError> {
        let (start, end) = day_window(&Local::now());
        self.today_metrics_between(start.with_timezone(&Utc), end.with_timezone(&Utc))
            .await
    }

    async fn today_metrics_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TodayMetrics, StoreError> {
        let (bills, customer_bills) = tokio::join!(
            self.billing_repo.bills_between(start, end),
            self.billing_repo.customer_bills_between(start, end),
        );
        let bills = bills?;
        let customer_bills = customer_bills?;

        // Deduplica pelo número da nota: só a PRIMEIRA ocorrência soma.
        let mut seen = HashSet::new();
        let mut total_amount = 0.0_f64;
        for bill in &bills {
            if seen.insert(bill.invoice_number.clone()) {
                total_amount += bill.total_amount;
            }
        }

        Ok(TodayMetrics {
            total_amount,
            bill_count: seen.len(),
            customer_bill_count: customer_bills.len(),
        })
    }
}

fn distinct_invoice_count(bills: &[BillRecord]) -> usize {
    bills
        .iter()
        .map(|bill| bill.invoice_number.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// A janela FECHADA do dia de `now` no fuso dele:
/// [00:00:00.000, 23:59:59.999], inclusiva nas duas pontas.
pub fn day_window<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
    let date = now.date_naive();
    let start = date.and_time(NaiveTime::MIN);
    let end = date.and_time(
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    );
    (
        resolve_in_zone(start, &now.timezone(), false),
        resolve_in_zone(end, &now.timezone(), true),
    )
}

fn resolve_in_zone<Tz: TimeZone>(
    naive: NaiveDateTime,
    tz: &Tz,
    prefer_latest: bool,
) -> DateTime<Tz> {
    match naive.and_local_timezone(tz.clone()) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, latest) => {
            if prefer_latest {
                latest
            } else {
                earliest
            }
        }
        // Horário pulado pela troca de horário de verão.
        LocalResult::None => tz.from_utc_datetime(&naive),
    }
}
