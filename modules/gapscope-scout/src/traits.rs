// Trait abstractions for the ingestion pipeline's external dependencies.
//
// BlogAgent — everything the browser-driving LLM agent does for us.
// DocumentStore — the vector store, reduced to the three operations the
//   pipeline needs. All writes are append-only.
//
// These enable deterministic testing with MockAgent and MockDocumentStore:
// no network, no live collection. `cargo test` in seconds.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gapscope_common::{BlogCandidate, BlogDocument};

#[async_trait]
pub trait BlogAgent: Send + Sync {
    /// Navigate a company site and list every blog post's title and absolute
    /// URL. Best-effort LLM extraction: the list may be incomplete, and an
    /// error here is fatal for the company's run.
    async fn discover_titles(&self, site_url: &str) -> Result<Vec<BlogCandidate>>;

    /// Navigate a single blog post and return its full body as markdown.
    async fn extract_blog(&self, blog_url: &str) -> Result<String>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Exact-match existence check on the URL field, the dedup key.
    ///
    /// The dedup-then-insert sequence is not transactional; concurrent runs
    /// over the same company can race in duplicate URLs. Production usage is
    /// one scheduled batch at a time.
    async fn url_exists(&self, url: &str) -> Result<bool>;

    /// Append one document. No update or delete path exists.
    async fn insert_document(&self, doc: &BlogDocument) -> Result<()>;

    /// Concatenated `"{title} {body}"` text per company for documents newer
    /// than `since`, keyed by company name.
    async fn fetch_company_texts(&self, since: DateTime<Utc>) -> Result<BTreeMap<String, String>>;
}
