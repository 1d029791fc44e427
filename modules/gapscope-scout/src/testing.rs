// Test mocks for the ingestion pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockAgent (BlogAgent) — HashMap-based site→candidates / url→body
// - MockDocumentStore (DocumentStore) — stateful in-memory collection
// - FixedEmbedder (TextEmbedder) — deterministic hash-based vectors
//
// Builder-style setup, interior Mutex for call recording, assertion helpers.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gapscope_common::{BlogCandidate, BlogDocument, TextEmbedder};

use crate::traits::{BlogAgent, DocumentStore};

/// Embedding dimension for test vectors.
pub const TEST_EMBEDDING_DIM: usize = 16;

// ---------------------------------------------------------------------------
// MockAgent
// ---------------------------------------------------------------------------

/// HashMap-based browser agent. Returns `Err` for unregistered URLs and
/// records every extraction call for assertions.
pub struct MockAgent {
    titles: HashMap<String, Vec<BlogCandidate>>,
    blogs: HashMap<String, String>,
    failing_discoveries: HashSet<String>,
    extraction_calls: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self {
            titles: HashMap::new(),
            blogs: HashMap::new(),
            failing_discoveries: HashSet::new(),
            extraction_calls: Mutex::new(Vec::new()),
        }
    }

    /// Register discovery results for a company site.
    pub fn on_titles(mut self, site_url: &str, candidates: Vec<BlogCandidate>) -> Self {
        self.titles.insert(site_url.to_string(), candidates);
        self
    }

    /// Register a blog body for an extraction URL.
    pub fn on_blog(mut self, blog_url: &str, body: &str) -> Self {
        self.blogs.insert(blog_url.to_string(), body.to_string());
        self
    }

    /// Make discovery for a site fail.
    pub fn failing_discovery(mut self, site_url: &str) -> Self {
        self.failing_discoveries.insert(site_url.to_string());
        self
    }

    /// Extraction URLs called so far, in order.
    pub fn extraction_calls(&self) -> Vec<String> {
        self.extraction_calls.lock().unwrap().clone()
    }
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlogAgent for MockAgent {
    async fn discover_titles(&self, site_url: &str) -> Result<Vec<BlogCandidate>> {
        if self.failing_discoveries.contains(site_url) {
            bail!("MockAgent: discovery forced failure for {site_url}");
        }
        self.titles
            .get(site_url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("MockAgent: no titles registered for {site_url}"))
    }

    async fn extract_blog(&self, blog_url: &str) -> Result<String> {
        self.extraction_calls
            .lock()
            .unwrap()
            .push(blog_url.to_string());
        self.blogs
            .get(blog_url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("MockAgent: no blog registered for {blog_url}"))
    }
}

// ---------------------------------------------------------------------------
// MockDocumentStore
// ---------------------------------------------------------------------------

struct MockStoreInner {
    documents: Vec<BlogDocument>,
    fail_exists: bool,
    fail_inserts: bool,
}

/// Stateful in-memory collection. Thread-safe via interior Mutex.
/// `insert_document` appends, `url_exists` scans.
pub struct MockDocumentStore {
    inner: Mutex<MockStoreInner>,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockStoreInner {
                documents: Vec::new(),
                fail_exists: false,
                fail_inserts: false,
            }),
        }
    }

    /// Pre-populate an already-ingested URL.
    pub fn with_existing_url(self, url: &str) -> Self {
        self.inner.lock().unwrap().documents.push(BlogDocument {
            title: String::new(),
            body: String::new(),
            url: url.to_string(),
            company_name: String::new(),
            timestamp: Utc::now(),
            title_embedding: Vec::new(),
            body_embedding: Vec::new(),
        });
        self
    }

    /// Make `url_exists` return an error for every call.
    pub fn failing_exists(self) -> Self {
        self.inner.lock().unwrap().fail_exists = true;
        self
    }

    /// Make `insert_document` return an error for every call.
    pub fn failing_inserts(self) -> Self {
        self.inner.lock().unwrap().fail_inserts = true;
        self
    }

    // --- Assertion helpers ---

    pub fn documents_stored(&self) -> usize {
        self.inner.lock().unwrap().documents.len()
    }

    pub fn has_url(&self, url: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .documents
            .iter()
            .any(|d| d.url == url)
    }

    pub fn insert_count_for(&self, url: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .documents
            .iter()
            .filter(|d| d.url == url)
            .count()
    }

    pub fn document_for(&self, url: &str) -> Option<BlogDocument> {
        self.inner
            .lock()
            .unwrap()
            .documents
            .iter()
            .find(|d| d.url == url)
            .cloned()
    }
}

impl Default for MockDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn url_exists(&self, url: &str) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_exists {
            bail!("MockDocumentStore: url_exists forced failure");
        }
        Ok(inner.documents.iter().any(|d| d.url == url))
    }

    async fn insert_document(&self, doc: &BlogDocument) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_inserts {
            bail!("MockDocumentStore: insert_document forced failure");
        }
        inner.documents.push(doc.clone());
        Ok(())
    }

    async fn fetch_company_texts(&self, since: DateTime<Utc>) -> Result<BTreeMap<String, String>> {
        let inner = self.inner.lock().unwrap();
        let mut texts: BTreeMap<String, String> = BTreeMap::new();
        for doc in inner.documents.iter().filter(|d| d.timestamp >= since) {
            let entry = texts.entry(doc.company_name.clone()).or_default();
            if !entry.is_empty() {
                entry.push_str("\n\n");
            }
            entry.push_str(&doc.title);
            entry.push(' ');
            entry.push_str(&doc.body);
        }
        Ok(texts)
    }
}

// ---------------------------------------------------------------------------
// FixedEmbedder
// ---------------------------------------------------------------------------

/// Deterministic embedder for testing: unit vectors seeded by a hash of the
/// input text. Construct with `failing()` to simulate service outages.
pub struct FixedEmbedder {
    dimension: usize,
    fail: bool,
}

impl FixedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            dimension: TEST_EMBEDDING_DIM,
            fail: true,
        }
    }

    fn hash_vector(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        let mut vec = vec![0.0f32; self.dimension];
        for v in vec.iter_mut() {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            *v = ((state >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0;
        }
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vec.iter_mut() {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl TextEmbedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            bail!("FixedEmbedder: forced failure");
        }
        Ok(self.hash_vector(text))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if self.fail {
            bail!("FixedEmbedder: forced failure");
        }
        Ok(texts.iter().map(|t| self.hash_vector(t)).collect())
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Build a candidate with a derived URL.
pub fn candidate(title: &str, url: &str) -> BlogCandidate {
    BlogCandidate {
        title: title.to_string(),
        url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_store_insert_then_exists() {
        let store = MockDocumentStore::new();
        assert!(!store.url_exists("https://acme.io/blog/a").await.unwrap());

        let doc = BlogDocument {
            title: "A".to_string(),
            body: "body".to_string(),
            url: "https://acme.io/blog/a".to_string(),
            company_name: "acme.io".to_string(),
            timestamp: Utc::now(),
            title_embedding: vec![0.0; TEST_EMBEDDING_DIM],
            body_embedding: vec![0.0; TEST_EMBEDDING_DIM],
        };
        store.insert_document(&doc).await.unwrap();

        assert!(store.url_exists("https://acme.io/blog/a").await.unwrap());
        assert_eq!(store.documents_stored(), 1);
    }

    #[tokio::test]
    async fn fixed_embedder_is_deterministic() {
        let embedder = FixedEmbedder::new(TEST_EMBEDDING_DIM);
        let a1 = embedder.embed("same text").await.unwrap();
        let a2 = embedder.embed("same text").await.unwrap();
        let b = embedder.embed("other text").await.unwrap();
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(a1.len(), TEST_EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn mock_agent_records_extraction_calls() {
        let agent = MockAgent::new().on_blog("https://acme.io/blog/a", "body");
        agent.extract_blog("https://acme.io/blog/a").await.unwrap();
        assert!(agent.extract_blog("https://acme.io/blog/b").await.is_err());
        assert_eq!(
            agent.extraction_calls(),
            vec![
                "https://acme.io/blog/a".to_string(),
                "https://acme.io/blog/b".to_string()
            ]
        );
    }
}
