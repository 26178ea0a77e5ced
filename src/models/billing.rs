// src/models/billing.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::db::document_store::{Document, StoreError};

/// Uma linha da coleção `billing`. Uma mesma nota pode ocupar várias linhas
/// (notas com múltiplos itens), então `invoice_number` NÃO é único aqui; a
/// deduplicação acontece na agregação.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    // O banco guarda o número da nota ora como texto, ora como número.
    // Normalizamos para texto, que é a chave de deduplicação.
    #[serde(deserialize_with = "invoice_number_as_string")]
    pub invoice_number: String,

    // O valor pode vir como número ou como texto numérico.
    #[serde(default, deserialize_with = "amount_as_f64")]
    pub total_amount: f64,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

impl BillRecord {
    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        serde_json::from_value(doc.data)
            .map_err(|e| StoreError::Malformed(format!("nota {}: {}", doc.id, e)))
    }
}

/// Uma linha da coleção `customerBilling`. Contada linha a linha, sem dedup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBillRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

impl CustomerBillRecord {
    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        serde_json::from_value(doc.data)
            .map_err(|e| StoreError::Malformed(format!("nota de cliente {}: {}", doc.id, e)))
    }
}

fn invoice_number_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invoiceNumber inválido: {}",
            other
        ))),
    }
}

fn amount_as_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("totalAmount fora da faixa")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("totalAmount inválido: {}", e))),
        Value::Null => Ok(0.0),
        other => Err(serde::de::Error::custom(format!(
            "totalAmount inválido: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(data: Value) -> Document {
        Document {
            id: "doc-1".to_string(),
            data,
        }
    }

    #[test]
    fn aceita_numero_da_nota_como_texto_ou_numero() {
        let as_text = BillRecord::from_document(doc(
            json!({"invoiceNumber": "INV-7", "totalAmount": 10.5, "date": 1_000}),
        ))
        .unwrap();
        assert_eq!(as_text.invoice_number, "INV-7");

        let as_number = BillRecord::from_document(doc(
            json!({"invoiceNumber": 42, "totalAmount": 10.5, "date": 1_000}),
        ))
        .unwrap();
        assert_eq!(as_number.invoice_number, "42");
    }

    #[test]
    fn aceita_valor_como_texto_numerico_e_ausente_como_zero() {
        let as_text = BillRecord::from_document(doc(
            json!({"invoiceNumber": "A", "totalAmount": "12.75", "date": 1_000}),
        ))
        .unwrap();
        assert_eq!(as_text.total_amount, 12.75);

        let missing =
            BillRecord::from_document(doc(json!({"invoiceNumber": "A", "date": 1_000}))).unwrap();
        assert_eq!(missing.total_amount, 0.0);
    }

    #[test]
    fn rejeita_registro_sem_data() {
        let result = BillRecord::from_document(doc(json!({"invoiceNumber": "A"})));
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }
}
