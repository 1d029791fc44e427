pub mod gaps;
pub mod report;
pub mod topics;

pub use gaps::{analyze_gaps, GapAnalysis};
pub use report::DashboardWriter;
pub use topics::{
    fallback_topics, parse_topic_lines, topics_from_response, TopicExtractor, TopicParseError,
};
