mod client;
pub(crate) mod types;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::schema::StructuredOutput;
use crate::traits::EmbedAgent;
use client::OpenAiClient;

/// Client for any OpenAI-compatible endpoint.
///
/// The base URL is overridable, so the same wire types serve the providers
/// this system talks to: Gemini's OpenAI-compatible surface for chat and the
/// Hugging Face router for embeddings.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: None,
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        }
    }

    /// Single-turn chat completion at temperature 0.
    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let request = types::ChatRequest::new(&self.model)
            .message(types::WireMessage::system(system))
            .message(types::WireMessage::user(user))
            .temperature(0.0)
            .max_tokens(4096);

        let response = self.client().chat(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("Empty chat completion response"))
    }

    /// Type-safe structured output extraction.
    pub async fn extract<T: StructuredOutput>(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        let request = types::StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                types::WireMessage::system(system_prompt),
                types::WireMessage::user(user_prompt),
            ],
            temperature: Some(0.0),
            response_format: types::ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: types::JsonSchemaFormat {
                    name: T::type_name(),
                    strict: true,
                    schema: T::strict_schema(),
                },
            },
        };

        let json_str = self.client().structured_output(&request).await?;

        serde_json::from_str(crate::util::strip_code_blocks(&json_str))
            .map_err(|e| anyhow!("Failed to deserialize structured response: {e}"))
    }
}

#[async_trait]
impl EmbedAgent for OpenAi {
    async fn embed(&self, text: impl Into<String> + Send) -> Result<Vec<f32>> {
        self.client()
            .embed(&self.embedding_model, &text.into())
            .await
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.client()
            .embed_batch(&self.embedding_model, &texts)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_embedding_model() {
        let ai = OpenAi::new("key", "gemini-2.0-flash");
        assert_eq!(ai.model, "gemini-2.0-flash");
        assert_eq!(ai.embedding_model, "text-embedding-3-small");
        assert_eq!(ai.base_url, None);
    }

    #[test]
    fn builders_override_defaults() {
        let ai = OpenAi::new("key", "gemini-2.0-flash")
            .with_embedding_model("Qwen/Qwen3-Embedding-8B")
            .with_base_url("https://router.huggingface.co/v1");
        assert_eq!(ai.embedding_model, "Qwen/Qwen3-Embedding-8B");
        assert_eq!(
            ai.base_url.as_deref(),
            Some("https://router.huggingface.co/v1")
        );
    }
}
