use serde::{Deserialize, Serialize};

/// Filtered scalar query against a collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub collection_name: String,
    /// Boolean filter expression, e.g. `URL == "https://example.com/post"`.
    pub filter: String,
    pub output_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InsertRequest<'a> {
    pub collection_name: &'a str,
    pub data: &'a [serde_json::Value],
}

/// Envelope every REST v2 response arrives in. `code` 0 means success;
/// anything else carries a server-side message.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InsertResult {
    #[serde(default)]
    pub insert_count: u64,
}
