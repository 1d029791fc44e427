use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use gapscope_common::{format_timestamp, parse_timestamp, BlogDocument, DedupFailurePolicy};
use milvus_client::{escape_filter_literal, MilvusClient, MilvusError, QueryRequest};

use crate::traits::DocumentStore;

/// Milvus REST v2 caps scalar query results at this many rows per request.
const QUERY_LIMIT: u32 = 16384;

/// `DocumentStore` backed by a Milvus/Zilliz collection.
///
/// Collection schema (field names are the wire contract with the live
/// collection): `title`, `title_embeddings`, `body`, `URL`,
/// `body_embeddings`, `timestamp` (string), `company_name`.
pub struct MilvusDocumentStore {
    client: MilvusClient,
    collection: String,
    dedup_failure_policy: DedupFailurePolicy,
}

impl MilvusDocumentStore {
    pub fn new(
        client: MilvusClient,
        collection: impl Into<String>,
        dedup_failure_policy: DedupFailurePolicy,
    ) -> Self {
        Self {
            client,
            collection: collection.into(),
            dedup_failure_policy,
        }
    }
}

#[async_trait]
impl DocumentStore for MilvusDocumentStore {
    async fn url_exists(&self, url: &str) -> Result<bool> {
        let request = QueryRequest {
            collection_name: self.collection.clone(),
            filter: format!("URL == {}", escape_filter_literal(url)),
            output_fields: vec!["URL".to_string()],
            limit: Some(1),
        };

        let outcome = self.client.query(&request).await.map(|rows| !rows.is_empty());
        resolve_exists(outcome, self.dedup_failure_policy, url)
    }

    async fn insert_document(&self, doc: &BlogDocument) -> Result<()> {
        let row = document_row(doc);
        let inserted = self
            .client
            .insert(&self.collection, std::slice::from_ref(&row))
            .await
            .with_context(|| format!("Failed to insert document for {}", doc.url))?;
        debug!(url = %doc.url, inserted, "Document persisted");
        Ok(())
    }

    async fn fetch_company_texts(&self, since: DateTime<Utc>) -> Result<BTreeMap<String, String>> {
        let request = QueryRequest {
            collection_name: self.collection.clone(),
            filter: "id >= 0".to_string(),
            output_fields: vec![
                "timestamp".to_string(),
                "title".to_string(),
                "body".to_string(),
                "company_name".to_string(),
            ],
            limit: Some(QUERY_LIMIT),
        };

        let rows = self
            .client
            .query(&request)
            .await
            .context("Failed to fetch documents for analysis")?;

        Ok(company_texts_from_rows(&rows, since))
    }
}

/// Apply the configured policy to a dedup-query outcome.
fn resolve_exists(
    outcome: std::result::Result<bool, MilvusError>,
    policy: DedupFailurePolicy,
    url: &str,
) -> Result<bool> {
    match outcome {
        Ok(exists) => Ok(exists),
        Err(e) => match policy {
            DedupFailurePolicy::AssumeNew => {
                warn!(url, error = %e, "Dedup query failed, treating URL as new");
                Ok(false)
            }
            DedupFailurePolicy::Propagate => {
                Err(anyhow::Error::new(e).context(format!("Dedup query failed for {url}")))
            }
        },
    }
}

/// Map a document onto the collection's row shape.
fn document_row(doc: &BlogDocument) -> serde_json::Value {
    serde_json::json!({
        "title": doc.title,
        "title_embeddings": doc.title_embedding,
        "body": doc.body,
        "URL": doc.url,
        "body_embeddings": doc.body_embedding,
        "timestamp": format_timestamp(doc.timestamp),
        "company_name": doc.company_name,
    })
}

/// Fold raw rows into per-company text, keeping only rows newer than `since`.
/// Rows with malformed timestamps are skipped with a warning rather than
/// aborting the whole analysis pass.
fn company_texts_from_rows(
    rows: &[serde_json::Value],
    since: DateTime<Utc>,
) -> BTreeMap<String, String> {
    let mut texts: BTreeMap<String, String> = BTreeMap::new();

    for row in rows {
        let raw_ts = row.get("timestamp").and_then(|v| v.as_str()).unwrap_or("");
        let ts = match parse_timestamp(raw_ts) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(timestamp = raw_ts, error = %e, "Skipping row with malformed timestamp");
                continue;
            }
        };
        if ts < since {
            continue;
        }

        let company = row
            .get("company_name")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if company.is_empty() {
            continue;
        }
        let title = row.get("title").and_then(|v| v.as_str()).unwrap_or_default();
        let body = row.get("body").and_then(|v| v.as_str()).unwrap_or_default();

        let entry = texts.entry(company.to_string()).or_default();
        if !entry.is_empty() {
            entry.push_str("\n\n");
        }
        entry.push_str(title);
        entry.push(' ');
        entry.push_str(body);
    }

    texts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc() -> BlogDocument {
        BlogDocument {
            title: "Voice Interfaces".to_string(),
            body: "# Voice\n\nDesigning for speech.".to_string(),
            url: "https://acme.io/blog/voice".to_string(),
            company_name: "acme.io".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 7, 14, 6, 0, 0).unwrap(),
            title_embedding: vec![0.1, 0.2],
            body_embedding: vec![0.3, 0.4],
        }
    }

    #[test]
    fn row_uses_collection_field_names() {
        let row = document_row(&doc());
        let obj = row.as_object().unwrap();
        for field in [
            "title",
            "title_embeddings",
            "body",
            "URL",
            "body_embeddings",
            "timestamp",
            "company_name",
        ] {
            assert!(obj.contains_key(field), "missing field {field}");
        }
        assert_eq!(row["URL"], "https://acme.io/blog/voice");
        assert_eq!(row["timestamp"], "2025-07-14 06:00:00.000000");
    }

    #[test]
    fn assume_new_swallows_query_errors() {
        let outcome = Err(MilvusError::Network("connection refused".into()));
        let exists = resolve_exists(outcome, DedupFailurePolicy::AssumeNew, "https://x").unwrap();
        assert!(!exists);
    }

    #[test]
    fn propagate_surfaces_query_errors() {
        let outcome = Err(MilvusError::Network("connection refused".into()));
        assert!(resolve_exists(outcome, DedupFailurePolicy::Propagate, "https://x").is_err());
    }

    #[test]
    fn successful_lookup_ignores_policy() {
        assert!(resolve_exists(Ok(true), DedupFailurePolicy::Propagate, "u").unwrap());
        assert!(!resolve_exists(Ok(false), DedupFailurePolicy::AssumeNew, "u").unwrap());
    }

    #[test]
    fn company_texts_respect_the_window() {
        let since = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let rows = vec![
            serde_json::json!({
                "timestamp": "2025-07-14 06:00:00.000000",
                "title": "Fresh Post",
                "body": "recent content",
                "company_name": "acme.io",
            }),
            serde_json::json!({
                "timestamp": "2024-01-01 00:00:00.000000",
                "title": "Stale Post",
                "body": "old content",
                "company_name": "acme.io",
            }),
            serde_json::json!({
                "timestamp": "2025-07-15 06:00:00.000000",
                "title": "Other Post",
                "body": "other content",
                "company_name": "zeta.dev",
            }),
        ];

        let texts = company_texts_from_rows(&rows, since);
        assert_eq!(texts.len(), 2);
        assert_eq!(texts["acme.io"], "Fresh Post recent content");
        assert_eq!(texts["zeta.dev"], "Other Post other content");
    }

    #[test]
    fn company_texts_concatenate_multiple_documents() {
        let since = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let rows = vec![
            serde_json::json!({
                "timestamp": "2025-02-01 00:00:00.000000",
                "title": "First",
                "body": "one",
                "company_name": "acme.io",
            }),
            serde_json::json!({
                "timestamp": "2025-03-01 00:00:00.000000",
                "title": "Second",
                "body": "two",
                "company_name": "acme.io",
            }),
        ];

        let texts = company_texts_from_rows(&rows, since);
        assert_eq!(texts["acme.io"], "First one\n\nSecond two");
    }

    #[test]
    fn malformed_timestamps_are_skipped_not_fatal() {
        let since = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let rows = vec![
            serde_json::json!({
                "timestamp": "not a date",
                "title": "Broken",
                "body": "row",
                "company_name": "acme.io",
            }),
            serde_json::json!({
                "timestamp": "2025-02-01 00:00:00.000000",
                "title": "Good",
                "body": "row",
                "company_name": "acme.io",
            }),
        ];

        let texts = company_texts_from_rows(&rows, since);
        assert_eq!(texts["acme.io"], "Good row");
    }
}
