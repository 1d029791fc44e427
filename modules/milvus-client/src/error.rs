use thiserror::Error;

pub type Result<T> = std::result::Result<T, MilvusError>;

#[derive(Debug, Error)]
pub enum MilvusError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Server error (code {code}): {message}")]
    Server { code: i64, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for MilvusError {
    fn from(err: reqwest::Error) -> Self {
        MilvusError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for MilvusError {
    fn from(err: serde_json::Error) -> Self {
        MilvusError::Parse(err.to_string())
    }
}
