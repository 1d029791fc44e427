pub mod config;
pub mod embed;
pub mod roster;
pub mod types;

pub use config::{Config, ConfigError, DedupFailurePolicy};
pub use embed::TextEmbedder;
pub use roster::{Company, CompanyRoster};
pub use types::{
    format_timestamp, parse_timestamp, BlogCandidate, BlogDocument, CompanyTopics, TOPICS_PER_COMPANY,
};
