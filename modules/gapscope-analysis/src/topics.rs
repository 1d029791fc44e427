use std::collections::BTreeMap;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use ai_client::openai::OpenAi;
use ai_client::util::truncate_to_char_boundary;
use gapscope_common::{CompanyTopics, TOPICS_PER_COMPANY};

/// Fewer usable lines than this means the response is unusable as a whole.
const MIN_USABLE_TOPICS: usize = 3;

/// Content sample size sent to the model per company.
const MAX_ANALYSIS_CHARS: usize = 12_000;

const TOPIC_SYSTEM_PROMPT: &str = r#"You are an expert business content analyst. Analyze the provided text content from a company's website, blog, articles, and case studies.

Extract exactly 5 unique, specific topics that this company specializes in or writes about.

CRITICAL REQUIREMENTS:
1. Topics must be SPECIFIC and CONCRETE (examples: "AI-Powered UX Design", "Voice User Interfaces", "E-commerce Optimization")
2. NOT generic terms (avoid: "technology", "business", "innovation", "solutions")
3. Each topic should be 2-4 words
4. Topics must be DIFFERENT from each other
5. Focus on the company's actual services, expertise, or specializations
6. Base topics on what you actually read in the content

RESPONSE FORMAT - EXACTLY like this:
1. [Specific Topic]
2. [Specific Topic]
3. [Specific Topic]
4. [Specific Topic]
5. [Specific Topic]

NO additional text, explanations, or formatting."#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopicParseError {
    #[error("no usable topic lines in response")]
    NoTopics,

    #[error("only {found} usable topic lines (need at least {MIN_USABLE_TOPICS})")]
    TooFewTopics { found: usize },
}

/// Strict parse of the model's numbered/bulleted topic list. Pure and
/// separately testable; the fallback decision belongs to the caller.
pub fn parse_topic_lines(response: &str) -> Result<Vec<String>, TopicParseError> {
    let leading = Regex::new(r"^[\d\-\.\)\s]+").expect("valid regex");
    let brackets = Regex::new(r"^\[|\]$").expect("valid regex");

    let mut topics = Vec::new();
    for line in response.lines() {
        let line = line.trim();
        let starts_listed = line
            .chars()
            .next()
            .map(|c| c.is_ascii_digit() || c == '-')
            .unwrap_or(false);
        if !starts_listed {
            continue;
        }

        let topic = leading.replace(line, "");
        let topic = brackets.replace_all(topic.trim(), "").trim().to_string();

        if topic.is_empty()
            || topic.starts_with("Additional Topic")
            || topic.starts_with("Topic")
            || topic.contains("Error:")
        {
            continue;
        }
        topics.push(topic);
    }

    match topics.len() {
        0 => Err(TopicParseError::NoTopics),
        n if n < MIN_USABLE_TOPICS => Err(TopicParseError::TooFewTopics { found: n }),
        _ => {
            topics.truncate(TOPICS_PER_COMPANY);
            Ok(topics)
        }
    }
}

/// Deterministic stand-in topics used when the model response cannot be
/// parsed. Always exactly five.
pub fn fallback_topics(company: &str) -> Vec<String> {
    let name = title_case(company);
    vec![
        format!("{name} Digital Services"),
        format!("{name} UX Design"),
        format!("{name} Technology Solutions"),
        format!("{name} Innovation Strategy"),
        format!("{name} Business Consulting"),
    ]
}

/// Resolve a model response into exactly five topics: strict parse, fallback
/// wholesale when unusable, padding from the fallback list when short.
pub fn topics_from_response(company: &str, response: &str) -> Vec<String> {
    match parse_topic_lines(response) {
        Ok(mut topics) => {
            let mut spares = fallback_topics(company).into_iter();
            while topics.len() < TOPICS_PER_COMPANY {
                match spares.next() {
                    Some(spare) if !topics.contains(&spare) => topics.push(spare),
                    Some(_) => continue,
                    None => break,
                }
            }
            topics
        }
        Err(e) => {
            warn!(company, error = %e, "Unusable topic response, using fallback topics");
            fallback_topics(company)
        }
    }
}

/// Capitalize each letter that follows a non-letter boundary.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_boundary = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_boundary {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_boundary = false;
        } else {
            out.push(c);
            at_boundary = true;
        }
    }
    out
}

/// Per-company topic summarization over an LLM chat client.
pub struct TopicExtractor {
    client: OpenAi,
}

impl TopicExtractor {
    pub fn new(client: OpenAi) -> Self {
        Self { client }
    }

    /// Summarize one company's aggregated content into exactly five topics.
    /// Transport and parse failures both resolve to the deterministic
    /// fallback so downstream gap analysis always has input.
    pub async fn topics_for(&self, company: &str, text: &str) -> CompanyTopics {
        let sample = truncate_to_char_boundary(text, MAX_ANALYSIS_CHARS);
        let user_prompt = format!("Company: {company}\n\nContent to analyze:\n{sample}");

        let response = match self
            .client
            .chat_completion(TOPIC_SYSTEM_PROMPT, &user_prompt)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(company, error = format!("{e:#}"), "Topic extraction call failed, using fallback topics");
                return CompanyTopics {
                    company: company.to_string(),
                    topics: fallback_topics(company),
                };
            }
        };

        let topics = topics_from_response(company, &response);
        info!(company, ?topics, "Topics extracted");
        CompanyTopics {
            company: company.to_string(),
            topics,
        }
    }

    /// Summarize every company in the aggregate map, in map order.
    pub async fn topics_for_all(&self, texts: &BTreeMap<String, String>) -> Vec<CompanyTopics> {
        let mut all = Vec::with_capacity(texts.len());
        for (company, text) in texts {
            all.push(self.topics_for(company, text).await);
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbered_list() {
        let response = "1. AI-Powered UX Design\n2. Voice User Interfaces\n3. E-commerce Optimization\n4. Design Systems\n5. Usability Testing";
        let topics = parse_topic_lines(response).unwrap();
        assert_eq!(
            topics,
            [
                "AI-Powered UX Design",
                "Voice User Interfaces",
                "E-commerce Optimization",
                "Design Systems",
                "Usability Testing"
            ]
        );
    }

    #[test]
    fn parses_bulleted_list_and_strips_brackets() {
        let response = "- [Healthcare UX]\n- [Automotive HMI]\n- [Banking Apps]";
        let topics = parse_topic_lines(response).unwrap();
        assert_eq!(topics, ["Healthcare UX", "Automotive HMI", "Banking Apps"]);
    }

    #[test]
    fn ignores_prose_lines() {
        let response =
            "Here are the topics:\n1. Service Design\n2. Design Ops\n3. Brand Strategy\nHope this helps!";
        let topics = parse_topic_lines(response).unwrap();
        assert_eq!(topics, ["Service Design", "Design Ops", "Brand Strategy"]);
    }

    #[test]
    fn rejects_placeholder_lines() {
        let response = "1. Topic 1\n2. Additional Topic A\n3. Error: quota exceeded";
        assert_eq!(parse_topic_lines(response), Err(TopicParseError::NoTopics));
    }

    #[test]
    fn too_few_lines_is_an_error() {
        let response = "1. Service Design\n2. Design Ops";
        assert_eq!(
            parse_topic_lines(response),
            Err(TopicParseError::TooFewTopics { found: 2 })
        );
    }

    #[test]
    fn caps_at_five_topics() {
        let response = "1. A B\n2. C D\n3. E F\n4. G H\n5. I J\n6. K L\n7. M N";
        let topics = parse_topic_lines(response).unwrap();
        assert_eq!(topics.len(), TOPICS_PER_COMPANY);
        assert_eq!(topics[4], "I J");
    }

    #[test]
    fn malformed_response_still_yields_exactly_five_topics() {
        let topics = topics_from_response("acme.io", "I could not find any topics, sorry!");
        assert_eq!(topics.len(), TOPICS_PER_COMPANY);
        assert_eq!(topics, fallback_topics("acme.io"));
    }

    #[test]
    fn short_but_valid_parse_is_padded_to_five() {
        let response = "1. Service Design\n2. Design Ops\n3. Brand Strategy";
        let topics = topics_from_response("acme.io", response);
        assert_eq!(topics.len(), TOPICS_PER_COMPANY);
        assert_eq!(&topics[..3], ["Service Design", "Design Ops", "Brand Strategy"]);
        assert_eq!(topics[3], "Acme.Io Digital Services");
    }

    #[test]
    fn full_parse_is_left_untouched() {
        let response = "1. A B\n2. C D\n3. E F\n4. G H\n5. I J";
        let topics = topics_from_response("acme.io", response);
        assert_eq!(topics, ["A B", "C D", "E F", "G H", "I J"]);
    }

    #[test]
    fn fallback_is_exactly_five_templated_phrases() {
        let topics = fallback_topics("ergosign.de");
        assert_eq!(topics.len(), TOPICS_PER_COMPANY);
        assert_eq!(topics[0], "Ergosign.De Digital Services");
        assert_eq!(topics[4], "Ergosign.De Business Consulting");
    }

    #[test]
    fn title_case_handles_separators() {
        assert_eq!(title_case("ergosign.de"), "Ergosign.De");
        assert_eq!(title_case("acme studio"), "Acme Studio");
        assert_eq!(title_case("ALREADY"), "ALREADY");
    }
}
