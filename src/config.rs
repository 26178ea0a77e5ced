// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::db::{BillingRepository, CatalogRepository, DocumentStore, PgDocumentStore};
use crate::services::{CatalogService, DashboardService, DocumentService};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub dashboard_service: DashboardService,
    pub catalog_service: CatalogService,
    pub export_service: DocumentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let font_dir = env::var("PDF_FONT_DIR").unwrap_or_else(|_| "./fonts".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        // O banco de documentos entra como dependência explícita dos
        // repositórios, o que permite trocá-lo por um fake nos testes.
        let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(db_pool.clone()));
        let billing_repo = BillingRepository::new(store.clone());
        let catalog_repo = CatalogRepository::new(store);

        let dashboard_service = DashboardService::new(billing_repo, catalog_repo.clone());
        let catalog_service = CatalogService::new(catalog_repo);
        let export_service = DocumentService::new(font_dir);

        Ok(Self {
            db_pool,
            dashboard_service,
            catalog_service,
            export_service,
        })
    }
}
