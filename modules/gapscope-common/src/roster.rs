use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// One company to scrape: display name and blog site URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub name: String,
    pub url: String,
}

/// TOML-backed company roster:
///
/// ```toml
/// [companies]
/// "ergosign.de" = "https://www.ergosign.de"
/// "competitor.com" = "https://competitor.com"
/// ```
///
/// File order is preserved; companies are ingested sequentially in the
/// order they appear.
#[derive(Debug, Clone)]
pub struct CompanyRoster {
    companies: Vec<Company>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RosterFile {
    companies: toml::Table,
}

impl CompanyRoster {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read company roster: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse company roster: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        let file: RosterFile = toml::from_str(content)?;

        let mut companies = Vec::with_capacity(file.companies.len());
        for (name, value) in file.companies {
            let Some(url) = value.as_str() else {
                bail!("Company '{name}' must map to a URL string");
            };
            companies.push(Company {
                name,
                url: url.to_string(),
            });
        }

        Ok(Self { companies })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            companies: pairs
                .into_iter()
                .map(|(name, url)| Company {
                    name: name.into(),
                    url: url.into(),
                })
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Company> {
        self.companies.iter()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_companies_in_file_order() {
        let raw = r#"
            [companies]
            "ergosign.de" = "https://www.ergosign.de"
            "acme.io" = "https://acme.io"
            "zeta.dev" = "https://zeta.dev"
        "#;
        let roster = CompanyRoster::parse(raw).unwrap();
        let names: Vec<&str> = roster.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ergosign.de", "acme.io", "zeta.dev"]);
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn rejects_non_string_urls() {
        let raw = r#"
            [companies]
            "acme.io" = 42
        "#;
        assert!(CompanyRoster::parse(raw).is_err());
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let raw = r#"
            [companies]
            "acme.io" = "https://acme.io"

            [schedule]
            cron = "0 6 */2 * *"
        "#;
        assert!(CompanyRoster::parse(raw).is_err());
    }
}
