use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Application configuration, resolved once at startup and passed into each
/// client constructor. Every required variable that is absent produces a
/// named error rather than a panic or a hidden default.
#[derive(Debug, Clone)]
pub struct Config {
    // LLM (Gemini via its OpenAI-compatible endpoint)
    pub google_api_key: String,
    pub chat_model: String,

    // Embeddings (Qwen via the Hugging Face router)
    pub hf_token: String,
    pub embedding_model: String,

    // Browser agent
    pub browser_use_api_key: String,
    pub agent_max_steps: u32,

    // Vector store
    pub zilliz_uri: String,
    pub zilliz_token: String,
    pub collection_name: String,
    pub dedup_failure_policy: DedupFailurePolicy,

    // Analysis
    pub reference_company: String,
    pub dashboards_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    #[error("{var} is invalid: {message}")]
    InvalidVar { var: &'static str, message: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            google_api_key: required("GOOGLE_API_KEY")?,
            chat_model: optional("GAPSCOPE_CHAT_MODEL", "gemini-2.0-flash"),
            hf_token: required("HF_TOKEN")?,
            embedding_model: optional("GAPSCOPE_EMBEDDING_MODEL", "Qwen/Qwen3-Embedding-8B"),
            browser_use_api_key: required("BROWSER_USE_API_KEY")?,
            agent_max_steps: parsed("AGENT_MAX_STEPS", 100)?,
            zilliz_uri: required("ZILLIZ_URI")?,
            zilliz_token: required("ZILLIZ_TOKEN")?,
            collection_name: required("COLLECTION_NAME")?,
            dedup_failure_policy: parsed("DEDUP_FAILURE_POLICY", DedupFailurePolicy::AssumeNew)?,
            reference_company: optional("REFERENCE_COMPANY", "ergosign.de"),
            dashboards_dir: PathBuf::from(optional("DASHBOARDS_DIR", "dashboards")),
        })
    }

    /// Log the non-secret parts of the configuration.
    pub fn log_summary(&self) {
        tracing::info!(
            chat_model = %self.chat_model,
            embedding_model = %self.embedding_model,
            collection = %self.collection_name,
            agent_max_steps = self.agent_max_steps,
            dedup_failure_policy = ?self.dedup_failure_policy,
            reference_company = %self.reference_company,
            "Configuration loaded"
        );
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingVar(key))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            var: key,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// What to do when the dedup existence query itself fails.
///
/// `AssumeNew` favors availability: a store outage lets ingestion continue at
/// the risk of duplicate records. `Propagate` favors correctness: the query
/// error counts as a per-blog failure and the blog is skipped this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupFailurePolicy {
    #[default]
    AssumeNew,
    Propagate,
}

impl FromStr for DedupFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assume-new" | "assume_new" => Ok(Self::AssumeNew),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!(
                "unknown dedup failure policy '{other}' (expected 'assume-new' or 'propagate')"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_both_arms() {
        assert_eq!(
            "assume-new".parse::<DedupFailurePolicy>().unwrap(),
            DedupFailurePolicy::AssumeNew
        );
        assert_eq!(
            "propagate".parse::<DedupFailurePolicy>().unwrap(),
            DedupFailurePolicy::Propagate
        );
        assert_eq!(
            "ASSUME_NEW".parse::<DedupFailurePolicy>().unwrap(),
            DedupFailurePolicy::AssumeNew
        );
    }

    #[test]
    fn policy_rejects_unknown_values() {
        assert!("retry".parse::<DedupFailurePolicy>().is_err());
    }

    #[test]
    fn missing_var_error_names_the_variable() {
        let err = ConfigError::MissingVar("ZILLIZ_URI");
        assert_eq!(err.to_string(), "ZILLIZ_URI environment variable is required");
    }
}
