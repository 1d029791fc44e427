use anyhow::Result;
use async_trait::async_trait;

/// Text-to-vector seam. Concrete impls wrap an embedding service; tests use
/// a deterministic stand-in.
///
/// Implementations must fail loudly: never return a zero or truncated
/// vector on a service error, since a corrupt embedding poisons similarity
/// search downstream.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}
