use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topics extracted per company: always exactly this many.
pub const TOPICS_PER_COMPANY: usize = 5;

/// A discovered (title, URL) pair pending dedup and extraction. Ephemeral;
/// one per link the discovery agent found on a company's blog index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogCandidate {
    pub title: String,
    pub url: String,
}

/// A fully ingested blog post as persisted to the vector store. Created once
/// per newly discovered, non-duplicate URL; immutable after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogDocument {
    pub title: String,
    pub body: String,
    pub url: String,
    pub company_name: String,
    pub timestamp: DateTime<Utc>,
    pub title_embedding: Vec<f32>,
    pub body_embedding: Vec<f32>,
}

/// The five topic phrases summarizing one company's recent content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyTopics {
    pub company: String,
    pub topics: Vec<String>,
}

/// Timestamp format used by the collection's string `timestamp` field.
const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
/// Accepts any fractional-second width, including none.
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_WRITE_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_READ_FORMAT).map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_round_trips() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 14, 6, 30, 12).unwrap()
            + chrono::Duration::microseconds(123456);
        let rendered = format_timestamp(ts);
        assert_eq!(rendered, "2025-07-14 06:30:12.123456");
        assert_eq!(parse_timestamp(&rendered).unwrap(), ts);
    }

    #[test]
    fn write_format_always_emits_six_fraction_digits() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(ts), "2025-01-02 03:04:05.000000");
    }

    #[test]
    fn parse_accepts_missing_fraction() {
        let ts = parse_timestamp("2025-01-02 03:04:05").unwrap();
        assert_eq!(format_timestamp(ts), "2025-01-02 03:04:05.000000");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_timestamp("last tuesday").is_err());
    }
}
