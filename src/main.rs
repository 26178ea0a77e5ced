//src/main.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização (a tabela de documentos).
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas do painel de métricas
    let dashboard_routes = Router::new().route("/summary", get(handlers::dashboard::get_summary));

    // Rotas do catálogo de produtos
    let catalog_routes = Router::new()
        .route("/", get(handlers::catalog::get_catalog))
        .route("/refresh", post(handlers::catalog::refresh_catalog))
        .route("/category", put(handlers::catalog::set_category))
        .route("/search", put(handlers::catalog::set_search))
        .route("/select-all", post(handlers::catalog::toggle_select_all))
        .route("/bulk-delete", post(handlers::catalog::bulk_delete))
        .route("/export", get(handlers::documents::export_product_list))
        .route("/products", post(handlers::catalog::create_product))
        .route(
            "/products/{id}",
            put(handlers::catalog::update_product).delete(handlers::catalog::delete_product),
        )
        .route(
            "/products/{id}/toggle",
            post(handlers::catalog::toggle_description),
        )
        .route(
            "/products/{id}/selection",
            put(handlers::catalog::set_selection),
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/catalog", catalog_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
