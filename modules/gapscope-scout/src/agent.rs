use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ai_client::util::strip_code_blocks;
use ai_client::StructuredOutput;
use browseruse_client::{BrowserUseClient, TaskRequest};
use gapscope_common::BlogCandidate;

use crate::traits::BlogAgent;

/// What the agent returns for each blog link on the index page.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BlogLink {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
}

/// The discovery task's expected output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TitleSheet {
    #[serde(rename = "Result", default)]
    pub result: Vec<BlogLink>,
}

/// The extraction task's expected output: the full post as markdown.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BlogSheet {
    #[serde(rename = "Result")]
    pub result: String,
}

fn discovery_task(site_url: &str) -> String {
    format!(
        r#"1.) Go to {site_url}. Dismiss any cookie consent pop-up.
2.) If the site is not in English, switch to English if an option exists.
3.) Open the navigation bar, dropdown menu, or side drawer, whichever is available, and open the page most likely to contain blog posts (look for "blog", "insights", "articles", "case studies" or similar).
4.) Scroll through the entire page and collect the title and full absolute URL (not a relative path) of every blog post listed: all of them, not just the first few.
Return them as the Result list, one entry per post with its Title and URL."#
    )
}

fn extraction_task(blog_url: &str) -> String {
    format!(
        "Go to {blog_url}. This is a blog post. Extract the complete post text \
         as it is, without summarising, and return it as well-formatted markdown \
         in the Result field."
    )
}

/// Check that a discovered URL is a fetchable absolute http(s) URL.
pub(crate) fn valid_blog_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.scheme() == "http" || parsed.scheme() == "https",
        Err(_) => false,
    }
}

/// `BlogAgent` backed by the Browser Use cloud API.
pub struct BrowserAgent {
    client: BrowserUseClient,
    max_steps: u32,
}

impl BrowserAgent {
    pub fn new(client: BrowserUseClient, max_steps: u32) -> Self {
        Self { client, max_steps }
    }
}

#[async_trait]
impl BlogAgent for BrowserAgent {
    async fn discover_titles(&self, site_url: &str) -> Result<Vec<BlogCandidate>> {
        info!(site_url, "Running title discovery task");

        let request = TaskRequest::new(discovery_task(site_url))
            .with_output_schema(&TitleSheet::strict_schema())
            .with_max_steps(self.max_steps);

        let output = self
            .client
            .run_to_completion(&request)
            .await
            .context("Title discovery task failed")?;

        let sheet: TitleSheet = serde_json::from_str(strip_code_blocks(&output))
            .map_err(|e| anyhow!("Discovery output did not match the title schema: {e}"))?;

        let mut candidates = Vec::with_capacity(sheet.result.len());
        for link in sheet.result {
            if !valid_blog_url(&link.url) {
                warn!(title = %link.title, url = %link.url, "Dropping candidate with malformed URL");
                continue;
            }
            candidates.push(BlogCandidate {
                title: link.title,
                url: link.url,
            });
        }

        info!(site_url, count = candidates.len(), "Title discovery complete");
        Ok(candidates)
    }

    async fn extract_blog(&self, blog_url: &str) -> Result<String> {
        info!(blog_url, "Running blog extraction task");

        let request = TaskRequest::new(extraction_task(blog_url))
            .with_output_schema(&BlogSheet::strict_schema())
            .with_max_steps(self.max_steps);

        let output = self
            .client
            .run_to_completion(&request)
            .await
            .context("Blog extraction task failed")?;

        let sheet: BlogSheet = serde_json::from_str(strip_code_blocks(&output))
            .map_err(|e| anyhow!("Extraction output did not match the blog schema: {e}"))?;

        if sheet.result.trim().is_empty() {
            bail!("Extraction returned an empty body for {blog_url}");
        }

        Ok(sheet.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_sheet_parses_agent_output() {
        let raw = r#"{"Result": [
            {"Title": "Designing Voice Interfaces", "URL": "https://acme.io/blog/voice"},
            {"Title": "UX Research at Scale", "URL": "https://acme.io/blog/research"}
        ]}"#;
        let sheet: TitleSheet = serde_json::from_str(raw).unwrap();
        assert_eq!(sheet.result.len(), 2);
        assert_eq!(sheet.result[0].title, "Designing Voice Interfaces");
        assert_eq!(sheet.result[1].url, "https://acme.io/blog/research");
    }

    #[test]
    fn title_sheet_tolerates_missing_result() {
        let sheet: TitleSheet = serde_json::from_str("{}").unwrap();
        assert!(sheet.result.is_empty());
    }

    #[test]
    fn blog_sheet_requires_result_field() {
        assert!(serde_json::from_str::<BlogSheet>("{}").is_err());
        let sheet: BlogSheet =
            serde_json::from_str(r##"{"Result": "# Heading\n\nBody text."}"##).unwrap();
        assert!(sheet.result.starts_with("# Heading"));
    }

    #[test]
    fn sheet_schemas_use_wire_field_names() {
        let schema = TitleSheet::strict_schema();
        let props = schema["properties"].as_object().unwrap();
        assert!(props.contains_key("Result"));

        let link_props = schema["properties"]["Result"]["items"]["properties"]
            .as_object()
            .unwrap();
        assert!(link_props.contains_key("Title"));
        assert!(link_props.contains_key("URL"));
    }

    #[test]
    fn url_validation_rejects_relative_and_non_http() {
        assert!(valid_blog_url("https://acme.io/blog/post"));
        assert!(valid_blog_url("http://acme.io/blog/post"));
        assert!(!valid_blog_url("/blog/post"));
        assert!(!valid_blog_url("blog/post"));
        assert!(!valid_blog_url("ftp://acme.io/blog"));
        assert!(!valid_blog_url("javascript:void(0)"));
    }

    #[test]
    fn task_prompts_embed_the_target_url() {
        assert!(discovery_task("https://acme.io").contains("https://acme.io"));
        assert!(extraction_task("https://acme.io/blog/post").contains("https://acme.io/blog/post"));
    }
}
