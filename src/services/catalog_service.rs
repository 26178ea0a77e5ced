// src/services/catalog_service.rs

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    common::collation::natural_cmp,
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{
        BulkDeleteFailure, BulkDeleteOutcome, CatalogSnapshot, LoadPhase, Product, ProductDoc,
        ProductRow, ProductRowView,
    },
};

/// O gestor do catálogo de produtos: guarda a lista carregada e o estado
/// transitório de tela (busca, seleção, linhas expandidas, filtro de
/// categoria) e expõe snapshots imutáveis. Mutações locais nunca disparam
/// recarga; só a troca de categoria e o refresh vão ao banco.
#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    state: Arc<RwLock<CatalogState>>,
}

struct CatalogState {
    phase: LoadPhase,
    rows: Vec<ProductRow>,
    search_term: String,
    selected: Vec<String>,
    select_all: bool,
    category: Option<String>,
    category_counts: BTreeMap<String, usize>,
    last_error: Option<String>,
    generation: u64,
}

impl CatalogState {
    fn new() -> Self {
        Self {
            phase: LoadPhase::Idle,
            rows: Vec::new(),
            search_term: String::new(),
            selected: Vec::new(),
            select_all: false,
            category: None,
            category_counts: BTreeMap::new(),
            last_error: None,
            generation: 0,
        }
    }

    /// O conjunto visível: busca (nome sem caixa OU S.No como subtexto) E
    /// categoria. Projeção pura, recalculada a cada snapshot.
    fn visible(&self) -> impl Iterator<Item = &ProductRow> + '_ {
        self.rows.iter().filter(move |row| {
            let product = &row.product;
            let matches_search = self.search_term.is_empty()
                || product.name.to_lowercase().contains(&self.search_term)
                || product.sno.contains(&self.search_term);
            let matches_category = self
                .category
                .as_deref()
                .map_or(true, |category| product.category == category);
            matches_search && matches_category
        })
    }
}

impl CatalogService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self {
            repo,
            state: Arc::new(RwLock::new(CatalogState::new())),
        }
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read().await;
        let products = state
            .visible()
            .map(|row| ProductRowView {
                product: row.product.clone(),
                expanded: row.expanded,
                selected: state.selected.contains(&row.product.id),
            })
            .collect();
        CatalogSnapshot {
            phase: state.phase,
            products,
            loaded_count: state.rows.len(),
            search_term: state.search_term.clone(),
            category: state.category.clone(),
            category_counts: state.category_counts.clone(),
            selected_ids: state.selected.clone(),
            select_all: state.select_all,
            last_error: state.last_error.clone(),
        }
    }

    /// Carrega a lista (filtrada ou não) e, SEMPRE, relê a coleção completa
    /// para recalcular as contagens por categoria: o dropdown mostra números
    /// globais, independentes do filtro ativo.
    pub async fn load(&self) {
        let (generation, category) = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.phase = LoadPhase::Loading;
            (state.generation, state.category.clone())
        };

        let (listed, full) = tokio::join!(
            self.repo.by_category(category.as_deref()),
            self.repo.all(),
        );

        let mut state = self.state.write().await;
        if state.generation != generation {
            // Uma carga mais nova foi disparada enquanto esta rodava.
            tracing::warn!("Carga do catálogo obsoleta descartada");
            return;
        }
        state.phase = LoadPhase::Loaded;

        match listed {
            Ok(mut products) => {
                products.sort_by(|a, b| natural_cmp(&a.name, &b.name));
                state.rows = products.into_iter().map(ProductRow::new).collect();
                state.last_error = None;

                // Ids selecionados que sumiram da lista não fazem mais sentido.
                let alive: HashSet<String> =
                    state.rows.iter().map(|row| row.product.id.clone()).collect();
                state.selected.retain(|id| alive.contains(id));
            }
            Err(e) => {
                tracing::error!("Falha ao carregar produtos: {}", e);
                state.last_error = Some(e.to_string());
            }
        }

        match full {
            Ok(all_products) => {
                let mut counts = BTreeMap::new();
                for product in &all_products {
                    *counts.entry(product.category.clone()).or_insert(0) += 1;
                }
                state.category_counts = counts;
            }
            Err(e) => {
                tracing::error!("Falha ao recalcular as contagens por categoria: {}", e);
            }
        }
    }

    /// Troca o filtro de categoria e recarrega. Texto vazio = sem filtro.
    pub async fn set_category(&self, category: Option<String>) {
        {
            let mut state = self.state.write().await;
            state.category = category.filter(|c| !c.is_empty());
        }
        self.load().await;
    }

    /// Só muda o termo em memória; o conjunto visível é derivado na hora do
    /// snapshot. Nenhuma consulta sai daqui.
    pub async fn set_search(&self, term: String) {
        let mut state = self.state.write().await;
        state.search_term = term.to_lowercase();
    }

    pub async fn toggle_expanded(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        match state.rows.iter_mut().find(|row| row.product.id == id) {
            Some(row) => {
                row.expanded = !row.expanded;
                Ok(())
            }
            None => Err(AppError::ProductNotFound),
        }
    }

    pub async fn set_selected(&self, id: &str, selected: bool) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if !state.rows.iter().any(|row| row.product.id == id) {
            return Err(AppError::ProductNotFound);
        }
        if selected {
            if !state.selected.iter().any(|s| s == id) {
                state.selected.push(id.to_string());
            }
        } else {
            state.selected.retain(|s| s != id);
            state.select_all = false;
        }
        Ok(())
    }

    /// Alterna entre "nada selecionado" e "tudo VISÍVEL selecionado". A
    /// seleção opera sobre o conjunto filtrado, nunca sobre linhas que a
    /// busca escondeu (decisão registrada no DESIGN.md).
    pub async fn toggle_select_all(&self) {
        let mut state = self.state.write().await;
        if state.select_all {
            state.selected.clear();
            state.select_all = false;
        } else {
            let visible_ids: Vec<String> =
                state.visible().map(|row| row.product.id.clone()).collect();
            state.selected = visible_ids;
            state.select_all = true;
        }
    }

    /// Exclui no banco e, só em caso de sucesso, remove da lista local sem
    /// recarregar. Em falha, a lista fica intocada e o erro sobe para o
    /// chamador.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete(id).await.map_err(|e| {
            tracing::error!("Falha ao excluir o produto {}: {}", id, e);
            AppError::from(e)
        })?;

        let mut state = self.state.write().await;
        state.rows.retain(|row| row.product.id != id);
        state.selected.retain(|s| s != id);
        Ok(())
    }

    /// Uma exclusão concorrente por id selecionado, com join "all-settled":
    /// a falha de uma não aborta as outras. Só os ids confirmados saem da
    /// lista local; as falhas voltam consolidadas e continuam selecionadas
    /// para nova tentativa.
    pub async fn bulk_delete(&self) -> BulkDeleteOutcome {
        let ids: Vec<String> = {
            let state = self.state.read().await;
            state.selected.clone()
        };

        let results = futures::future::join_all(ids.into_iter().map(|id| {
            let repo = self.repo.clone();
            async move {
                let result = repo.delete(&id).await;
                (id, result)
            }
        }))
        .await;

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => deleted.push(id),
                Err(e) => {
                    tracing::error!("Falha ao excluir o produto {}: {}", id, e);
                    failed.push(BulkDeleteFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut state = self.state.write().await;
        let gone: HashSet<&str> = deleted.iter().map(String::as_str).collect();
        state.rows.retain(|row| !gone.contains(row.product.id.as_str()));
        state.selected.retain(|id| !gone.contains(id.as_str()));
        state.select_all = false;

        BulkDeleteOutcome { deleted, failed }
    }

    pub async fn create(&self, fields: ProductDoc) -> Result<Product, AppError> {
        let product = self.repo.create(&fields).await?;
        self.load().await;
        Ok(product)
    }

    pub async fn update(&self, id: &str, fields: ProductDoc) -> Result<Product, AppError> {
        let product = self.repo.update(id, &fields).await?;
        self.load().await;
        Ok(product)
    }

    /// Cópia defensiva da lista carregada, na ordem de tela. O export ordena
    /// a cópia por S.No sem mexer aqui.
    pub async fn loaded_products(&self) -> Vec<Product> {
        let state = self.state.read().await;
        state.rows.iter().map(|row| row.product.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog_repo::PRODUCTS_COLLECTION;
    use crate::db::document_store::{Document, DocumentStore, Filter, StoreError};
    use crate::db::memory_store::InMemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    fn product(sno: &str, name: &str, category: &str) -> Value {
        json!({
            "sno": sno,
            "name": name,
            "description": "desc",
            "regularprice": 10.0,
            "saleprice": 8.0,
            "category": category,
        })
    }

    fn service(store: Arc<InMemoryStore>) -> CatalogService {
        CatalogService::new(CatalogRepository::new(store))
    }

    #[tokio::test]
    async fn carrega_ordenado_por_nome_natural() {
        let store = Arc::new(InMemoryStore::new());
        store.seed(
            PRODUCTS_COLLECTION,
            vec![
                product("1", "Item 10", "Doces"),
                product("2", "item 2", "Doces"),
                product("3", "Açúcar", "Doces"),
            ],
        );

        let service = service(store);
        assert_eq!(service.snapshot().await.phase, LoadPhase::Idle);
        service.load().await;

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.phase, LoadPhase::Loaded);
        let names: Vec<&str> = snapshot
            .products
            .iter()
            .map(|row| row.product.name.as_str())
            .collect();
        assert_eq!(names, vec!["Açúcar", "item 2", "Item 10"]);
    }

    #[tokio::test]
    async fn busca_filtra_por_nome_ou_sno_sem_consultar_o_banco() {
        let store = Arc::new(InMemoryStore::new());
        store.seed(
            PRODUCTS_COLLECTION,
            vec![
                product("7", "Café Torrado", "Bebidas"),
                product("72", "Chá Verde", "Bebidas"),
                product("31", "Biscoito", "Doces"),
            ],
        );

        let service = service(store.clone());
        service.load().await;
        let reads_before =
            store.read_all_count(PRODUCTS_COLLECTION) + store.read_where_count(PRODUCTS_COLLECTION);

        service.set_search("CAFÉ".to_string()).await;
        let by_name = service.snapshot().await;
        assert_eq!(by_name.products.len(), 1);
        assert_eq!(by_name.products[0].product.name, "Café Torrado");

        service.set_search("72".to_string()).await;
        let by_sno = service.snapshot().await;
        assert_eq!(by_sno.products.len(), 1);
        assert_eq!(by_sno.products[0].product.sno, "72");

        // Busca é projeção local: nenhuma consulta nova saiu.
        let reads_after =
            store.read_all_count(PRODUCTS_COLLECTION) + store.read_where_count(PRODUCTS_COLLECTION);
        assert_eq!(reads_before, reads_after);
    }

    #[tokio::test]
    async fn troca_de_categoria_faz_uma_leitura_filtrada_e_uma_completa() {
        let store = Arc::new(InMemoryStore::new());
        store.seed(
            PRODUCTS_COLLECTION,
            vec![
                product("1", "Bolo", "Doces"),
                product("2", "Pão", "Salgados"),
                product("3", "Brigadeiro", "Doces"),
            ],
        );

        let service = service(store.clone());
        service.load().await;
        let read_all_before = store.read_all_count(PRODUCTS_COLLECTION);
        let read_where_before = store.read_where_count(PRODUCTS_COLLECTION);

        service.set_category(Some("Doces".to_string())).await;

        assert_eq!(store.read_where_count(PRODUCTS_COLLECTION), read_where_before + 1);
        assert_eq!(store.read_all_count(PRODUCTS_COLLECTION), read_all_before + 1);

        // A lista respeita o filtro; as contagens seguem globais.
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.loaded_count, 2);
        assert_eq!(snapshot.category_counts.get("Doces"), Some(&2));
        assert_eq!(snapshot.category_counts.get("Salgados"), Some(&1));
    }

    #[tokio::test]
    async fn expandir_so_mexe_na_linha_e_nao_refaz_consulta() {
        let store = Arc::new(InMemoryStore::new());
        store.seed(
            PRODUCTS_COLLECTION,
            vec![product("1", "Bolo", "Doces"), product("2", "Pão", "Salgados")],
        );

        let service = service(store.clone());
        service.load().await;
        let reads_before = store.read_all_count(PRODUCTS_COLLECTION);

        let id = service.snapshot().await.products[0].product.id.clone();
        service.toggle_expanded(&id).await.unwrap();

        let snapshot = service.snapshot().await;
        assert!(snapshot.products[0].expanded);
        assert!(!snapshot.products[1].expanded);
        assert_eq!(store.read_all_count(PRODUCTS_COLLECTION), reads_before);

        service.toggle_expanded(&id).await.unwrap();
        assert!(!service.snapshot().await.products[0].expanded);

        assert!(matches!(
            service.toggle_expanded("nao-existe").await,
            Err(AppError::ProductNotFound)
        ));
    }

    #[tokio::test]
    async fn selecionar_tudo_opera_sobre_o_conjunto_visivel() {
        let store = Arc::new(InMemoryStore::new());
        store.seed(
            PRODUCTS_COLLECTION,
            vec![
                product("1", "Café Torrado", "Bebidas"),
                product("2", "Café Moído", "Bebidas"),
                product("3", "Biscoito", "Doces"),
            ],
        );

        let service = service(store.clone());
        service.load().await;
        service.set_search("café".to_string()).await;

        service.toggle_select_all().await;
        let snapshot = service.snapshot().await;
        assert!(snapshot.select_all);
        // Só as duas linhas visíveis entram na seleção; "Biscoito" fica fora.
        assert_eq!(snapshot.selected_ids.len(), 2);

        // E a exclusão em massa só leva embora o que estava visível.
        let outcome = service.bulk_delete().await;
        assert_eq!(outcome.deleted.len(), 2);
        assert!(outcome.failed.is_empty());
        assert_eq!(store.len(PRODUCTS_COLLECTION), 1);

        service.set_search(String::new()).await;
        let after = service.snapshot().await;
        assert_eq!(after.loaded_count, 1);
        assert_eq!(after.products[0].product.name, "Biscoito");
        assert!(!after.select_all);
    }

    #[tokio::test]
    async fn exclusao_em_massa_so_remove_o_que_o_banco_confirmou() {
        let store = Arc::new(InMemoryStore::new());
        let ids = store.seed(
            PRODUCTS_COLLECTION,
            vec![
                product("1", "A", "X"),
                product("2", "B", "X"),
                product("3", "C", "X"),
            ],
        );
        store.fail_delete_of(&ids[1]);

        let service = service(store.clone());
        service.load().await;
        service.toggle_select_all().await;

        let outcome = service.bulk_delete().await;
        assert_eq!(outcome.deleted.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].id, ids[1]);

        // O id que falhou continua na lista E na seleção, pronto para retry.
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.loaded_count, 1);
        assert_eq!(snapshot.products[0].product.id, ids[1]);
        assert_eq!(snapshot.selected_ids, vec![ids[1].clone()]);
        assert!(!snapshot.select_all);
    }

    #[tokio::test]
    async fn exclusao_simples_que_falha_nao_mexe_na_lista() {
        let store = Arc::new(InMemoryStore::new());
        let ids = store.seed(PRODUCTS_COLLECTION, vec![product("1", "A", "X")]);
        store.fail_delete_of(&ids[0]);

        let service = service(store.clone());
        service.load().await;

        assert!(service.delete(&ids[0]).await.is_err());
        assert_eq!(service.snapshot().await.loaded_count, 1);
    }

    #[tokio::test]
    async fn criar_e_atualizar_recarregam_a_lista() {
        let store = Arc::new(InMemoryStore::new());
        let service = service(store.clone());
        service.load().await;

        let fields = ProductDoc {
            sno: "1".to_string(),
            name: "Bolo".to_string(),
            description: String::new(),
            regular_price: rust_decimal::Decimal::new(1000, 2),
            sale_price: rust_decimal::Decimal::new(800, 2),
            category: "Doces".to_string(),
        };
        let created = service.create(fields.clone()).await.unwrap();
        assert_eq!(service.snapshot().await.loaded_count, 1);

        let mut renamed = fields;
        renamed.name = "Bolo de Fubá".to_string();
        service.update(&created.id, renamed).await.unwrap();

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.loaded_count, 1);
        assert_eq!(snapshot.products[0].product.name, "Bolo de Fubá");
        assert_eq!(snapshot.category_counts.get("Doces"), Some(&1));
    }

    // Segura as primeiras N leituras até o teste liberar, para simular uma
    // carga antiga que só termina depois de uma mais nova.
    struct GatedStore {
        inner: Arc<InMemoryStore>,
        remaining_blocked: std::sync::Mutex<usize>,
        release: tokio::sync::watch::Receiver<bool>,
    }

    impl GatedStore {
        async fn wait_if_blocked(&self) {
            let should_wait = {
                let mut remaining = self.remaining_blocked.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    true
                } else {
                    false
                }
            };
            if should_wait {
                let mut release = self.release.clone();
                while !*release.borrow() {
                    release.changed().await.expect("canal fechado");
                }
            }
        }

        fn blocked_left(&self) -> usize {
            *self.remaining_blocked.lock().unwrap()
        }
    }

    #[async_trait]
    impl DocumentStore for GatedStore {
        async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
            self.wait_if_blocked().await;
            self.inner.read_all(collection).await
        }

        async fn read_where(
            &self,
            collection: &str,
            filters: &[Filter],
        ) -> Result<Vec<Document>, StoreError> {
            self.wait_if_blocked().await;
            self.inner.read_where(collection, filters).await
        }

        async fn insert(&self, collection: &str, data: Value) -> Result<Document, StoreError> {
            self.inner.insert(collection, data).await
        }

        async fn update(
            &self,
            collection: &str,
            id: &str,
            data: Value,
        ) -> Result<Document, StoreError> {
            self.inner.update(collection, id, data).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
            self.inner.delete(collection, id).await
        }
    }

    #[tokio::test]
    async fn carga_obsoleta_nao_sobrescreve_a_mais_nova() {
        let inner = Arc::new(InMemoryStore::new());
        inner.seed(
            PRODUCTS_COLLECTION,
            vec![
                product("1", "Bolo", "Doces"),
                product("2", "Pão", "Salgados"),
            ],
        );

        let (release_tx, release_rx) = tokio::sync::watch::channel(false);
        let gated = Arc::new(GatedStore {
            inner: inner.clone(),
            // As duas leituras da primeira carga ficam presas no portão.
            remaining_blocked: std::sync::Mutex::new(2),
            release: release_rx,
        });

        let service = CatalogService::new(CatalogRepository::new(gated.clone()));

        let stale = {
            let service = service.clone();
            tokio::spawn(async move { service.load().await })
        };
        // Garante que a carga antiga já pegou a geração dela e está presa.
        while gated.blocked_left() > 0 {
            tokio::task::yield_now().await;
        }

        // A carga nova (filtrada) passa direto e termina primeiro.
        service.set_category(Some("Doces".to_string())).await;
        assert_eq!(service.snapshot().await.loaded_count, 1);

        release_tx.send(true).expect("canal fechado");
        stale.await.expect("tarefa abortada");

        // O resultado da carga antiga (lista completa) foi descartado.
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.loaded_count, 1);
        assert_eq!(snapshot.products[0].product.name, "Bolo");
        assert_eq!(snapshot.category, Some("Doces".to_string()));
    }
}
