// src/db/memory_store.rs
//
// Fake em memória do banco de documentos, usado pelos testes dos serviços.
// Além do comportamento básico, permite injetar falhas e conta as leituras
// por coleção para dar suporte às asserções de "quantas consultas saíram".

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::document_store::{Document, DocumentStore, Filter, FilterOp, StoreError};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    fail_reads: HashSet<String>,
    fail_deletes: HashSet<String>,
    read_all_calls: HashMap<String, usize>,
    read_where_calls: HashMap<String, usize>,
    next_id: u64,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere documentos direto na coleção e devolve os ids atribuídos.
    pub fn seed(&self, collection: &str, payloads: Vec<Value>) -> Vec<String> {
        let mut inner = self.inner.lock().expect("lock envenenado");
        let mut ids = Vec::with_capacity(payloads.len());
        for data in payloads {
            inner.next_id += 1;
            let id = format!("doc-{}", inner.next_id);
            ids.push(id.clone());
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(Document { id, data });
        }
        ids
    }

    /// A partir daqui, toda leitura desta coleção falha como "indisponível".
    pub fn fail_reads_on(&self, collection: &str) {
        let mut inner = self.inner.lock().expect("lock envenenado");
        inner.fail_reads.insert(collection.to_string());
    }

    pub fn restore_reads_on(&self, collection: &str) {
        let mut inner = self.inner.lock().expect("lock envenenado");
        inner.fail_reads.remove(collection);
    }

    /// A exclusão deste id específico falha como "indisponível".
    pub fn fail_delete_of(&self, id: &str) {
        let mut inner = self.inner.lock().expect("lock envenenado");
        inner.fail_deletes.insert(id.to_string());
    }

    pub fn read_all_count(&self, collection: &str) -> usize {
        let inner = self.inner.lock().expect("lock envenenado");
        inner.read_all_calls.get(collection).copied().unwrap_or(0)
    }

    pub fn read_where_count(&self, collection: &str) -> usize {
        let inner = self.inner.lock().expect("lock envenenado");
        inner.read_where_calls.get(collection).copied().unwrap_or(0)
    }

    pub fn len(&self, collection: &str) -> usize {
        let inner = self.inner.lock().expect("lock envenenado");
        inner.collections.get(collection).map(Vec::len).unwrap_or(0)
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Some(x.cmp(y));
    }
    None
}

fn matches(data: &Value, filter: &Filter) -> bool {
    let Some(field) = data.get(&filter.field) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => field == &filter.value,
        FilterOp::Gte => {
            matches!(compare_values(field, &filter.value), Some(Ordering::Greater | Ordering::Equal))
        }
        FilterOp::Lte => {
            matches!(compare_values(field, &filter.value), Some(Ordering::Less | Ordering::Equal))
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn read_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut inner = self.inner.lock().expect("lock envenenado");
        *inner
            .read_all_calls
            .entry(collection.to_string())
            .or_default() += 1;
        if inner.fail_reads.contains(collection) {
            return Err(StoreError::Unavailable("falha injetada".to_string()));
        }
        Ok(inner.collections.get(collection).cloned().unwrap_or_default())
    }

    async fn read_where(
        &self,
        collection: &str,
        filters: &[Filter],
    ) -> Result<Vec<Document>, StoreError> {
        let mut inner = self.inner.lock().expect("lock envenenado");
        *inner
            .read_where_calls
            .entry(collection.to_string())
            .or_default() += 1;
        if inner.fail_reads.contains(collection) {
            return Err(StoreError::Unavailable("falha injetada".to_string()));
        }
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filters.iter().all(|f| matches(&doc.data, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, data: Value) -> Result<Document, StoreError> {
        let mut inner = self.inner.lock().expect("lock envenenado");
        inner.next_id += 1;
        let doc = Document {
            id: format!("doc-{}", inner.next_id),
            data,
        };
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let mut inner = self.inner.lock().expect("lock envenenado");
        let docs = inner
            .collections
            .get_mut(collection)
            .ok_or(StoreError::NotFound)?;
        let doc = docs
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or(StoreError::NotFound)?;
        doc.data = data;
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("lock envenenado");
        if inner.fail_deletes.contains(id) {
            return Err(StoreError::Unavailable("falha injetada".to_string()));
        }
        let docs = inner
            .collections
            .get_mut(collection)
            .ok_or(StoreError::NotFound)?;
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        if docs.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn filtra_por_igualdade_e_faixa() {
        let store = InMemoryStore::new();
        store.seed(
            "products",
            vec![
                json!({"category": "Doces", "date": 10}),
                json!({"category": "Salgados", "date": 20}),
                json!({"category": "Doces", "date": 30}),
            ],
        );

        let eq = store
            .read_where("products", &[Filter::eq("category", json!("Doces"))])
            .await
            .unwrap();
        assert_eq!(eq.len(), 2);

        let range = store
            .read_where(
                "products",
                &[Filter::gte("date", json!(10)), Filter::lte("date", json!(20))],
            )
            .await
            .unwrap();
        assert_eq!(range.len(), 2);
    }

    #[tokio::test]
    async fn conta_leituras_e_injeta_falhas() {
        let store = InMemoryStore::new();
        store.seed("billing", vec![json!({"x": 1})]);

        store.read_all("billing").await.unwrap();
        store.read_where("billing", &[]).await.unwrap();
        assert_eq!(store.read_all_count("billing"), 1);
        assert_eq!(store.read_where_count("billing"), 1);

        store.fail_reads_on("billing");
        assert!(store.read_all("billing").await.is_err());
        store.restore_reads_on("billing");
        assert!(store.read_all("billing").await.is_ok());
    }

    #[tokio::test]
    async fn exclui_e_reporta_nao_encontrado() {
        let store = InMemoryStore::new();
        let ids = store.seed("products", vec![json!({"name": "a"})]);

        store.delete("products", &ids[0]).await.unwrap();
        assert_eq!(store.len("products"), 0);
        assert!(matches!(
            store.delete("products", &ids[0]).await,
            Err(StoreError::NotFound)
        ));
    }
}
