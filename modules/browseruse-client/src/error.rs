use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserUseError>;

#[derive(Debug, Error)]
pub enum BrowserUseError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Task ended with status: {0}")]
    TaskFailed(String),
}

impl From<reqwest::Error> for BrowserUseError {
    fn from(err: reqwest::Error) -> Self {
        BrowserUseError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for BrowserUseError {
    fn from(err: serde_json::Error) -> Self {
        BrowserUseError::Parse(err.to_string())
    }
}
