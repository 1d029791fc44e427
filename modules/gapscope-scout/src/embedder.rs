use ai_client::openai::OpenAi;
use ai_client::EmbedAgent;
use anyhow::Result;

pub use gapscope_common::TextEmbedder;

/// OpenAI-compatible embeddings route of the Hugging Face router.
const HF_ROUTER_URL: &str = "https://router.huggingface.co/v1";

/// Wrapper around Qwen embeddings served through the Hugging Face router.
pub struct Embedder {
    client: OpenAi,
}

impl Embedder {
    pub fn new(hf_token: &str, model: &str) -> Self {
        let client = OpenAi::new(hf_token, model)
            .with_base_url(HF_ROUTER_URL)
            .with_embedding_model(model);
        Self { client }
    }
}

#[async_trait::async_trait]
impl TextEmbedder for Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text.to_string()).await
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(texts).await
    }
}
