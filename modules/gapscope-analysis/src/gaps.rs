use gapscope_common::CompanyTopics;

/// Gap analysis between the reference company's topics and the union of all
/// competitor topics. A plain, deterministic set difference, with no ranking
/// signal beyond insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct GapAnalysis {
    pub reference_company: String,
    pub reference_topics: Vec<String>,
    /// Union of competitor topics, in company-then-position order.
    pub competitor_topics: Vec<String>,
    /// Union of reference and competitor topics.
    pub all_topics: Vec<String>,
    /// Competitor topics the reference company does not cover.
    pub gaps: Vec<String>,
    /// Reference topics competitors also cover.
    pub coverage: Vec<String>,
    /// |coverage| / |all_topics| × 100, rounded to one decimal.
    pub coverage_percentage: f64,
    pub high_priority: Vec<String>,
    pub medium_priority: Vec<String>,
}

/// How many gaps land in each priority bucket. An unweighted heuristic:
/// position in the insertion-ordered gap list is the only signal.
const HIGH_PRIORITY_GAPS: usize = 3;
const MEDIUM_PRIORITY_GAPS: usize = 4;

/// Comparison key: topics match case- and whitespace-insensitively.
fn normalize(topic: &str) -> String {
    topic.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Deduplicate while preserving first-seen order and original casing.
fn dedup_ordered<'a, I: IntoIterator<Item = &'a str>>(topics: I) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for topic in topics {
        let key = normalize(topic);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        out.push(topic.to_string());
    }
    out
}

pub fn analyze_gaps(reference: &CompanyTopics, competitors: &[&CompanyTopics]) -> GapAnalysis {
    let reference_topics = dedup_ordered(reference.topics.iter().map(String::as_str));
    let competitor_topics = dedup_ordered(
        competitors
            .iter()
            .flat_map(|c| c.topics.iter().map(String::as_str)),
    );

    let reference_keys: std::collections::HashSet<String> =
        reference_topics.iter().map(|t| normalize(t)).collect();
    let competitor_keys: std::collections::HashSet<String> =
        competitor_topics.iter().map(|t| normalize(t)).collect();

    let gaps: Vec<String> = competitor_topics
        .iter()
        .filter(|t| !reference_keys.contains(&normalize(t)))
        .cloned()
        .collect();
    let coverage: Vec<String> = reference_topics
        .iter()
        .filter(|t| competitor_keys.contains(&normalize(t)))
        .cloned()
        .collect();

    let all_topics = dedup_ordered(
        reference_topics
            .iter()
            .chain(competitor_topics.iter())
            .map(String::as_str),
    );

    let coverage_percentage = if all_topics.is_empty() {
        0.0
    } else {
        let raw = coverage.len() as f64 / all_topics.len() as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    };

    let high_priority: Vec<String> = gaps.iter().take(HIGH_PRIORITY_GAPS).cloned().collect();
    let medium_priority: Vec<String> = gaps
        .iter()
        .skip(HIGH_PRIORITY_GAPS)
        .take(MEDIUM_PRIORITY_GAPS)
        .cloned()
        .collect();

    GapAnalysis {
        reference_company: reference.company.clone(),
        reference_topics,
        competitor_topics,
        all_topics,
        gaps,
        coverage,
        coverage_percentage,
        high_priority,
        medium_priority,
    }
}
