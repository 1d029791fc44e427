pub mod error;
pub mod types;

pub use error::{MilvusError, Result};
pub use types::QueryRequest;

use tracing::debug;
use types::{ApiEnvelope, InsertRequest, InsertResult};

pub struct MilvusClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl MilvusClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Run a filtered scalar query, returning raw row objects.
    pub async fn query(&self, request: &QueryRequest) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/v2/vectordb/entities/query", self.base_url);

        debug!(collection = %request.collection_name, filter = %request.filter, "Milvus query");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(MilvusError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<Vec<serde_json::Value>> = resp.json().await?;
        if envelope.code != 0 {
            return Err(MilvusError::Server {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }

        Ok(envelope.data.unwrap_or_default())
    }

    /// Insert rows into a collection. Returns the server-reported insert count.
    pub async fn insert(&self, collection: &str, rows: &[serde_json::Value]) -> Result<u64> {
        let url = format!("{}/v2/vectordb/entities/insert", self.base_url);

        debug!(collection, rows = rows.len(), "Milvus insert");

        let request = InsertRequest {
            collection_name: collection,
            data: rows,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(MilvusError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<InsertResult> = resp.json().await?;
        if envelope.code != 0 {
            return Err(MilvusError::Server {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }

        Ok(envelope.data.map(|d| d.insert_count).unwrap_or(0))
    }
}

/// Quote a string literal for use inside a filter expression.
pub fn escape_filter_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_literal_is_quoted() {
        assert_eq!(
            escape_filter_literal("https://example.com/post"),
            "\"https://example.com/post\""
        );
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        assert_eq!(escape_filter_literal(r#"a"b"#), r#""a\"b""#);
    }

    #[test]
    fn backslashes_are_escaped_first() {
        assert_eq!(escape_filter_literal(r"a\b"), r#""a\\b""#);
    }

    #[test]
    fn query_request_uses_camel_case_wire_names() {
        let request = QueryRequest {
            collection_name: "blogs".into(),
            filter: "URL == \"x\"".into(),
            output_fields: vec!["URL".into()],
            limit: Some(1),
        };
        let rendered = serde_json::to_value(&request).unwrap();
        assert!(rendered.get("collectionName").is_some());
        assert!(rendered.get("outputFields").is_some());
        assert_eq!(rendered["limit"], 1);
    }
}
