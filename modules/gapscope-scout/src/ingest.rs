use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use gapscope_common::{BlogCandidate, BlogDocument, CompanyRoster, TextEmbedder};

use crate::traits::{BlogAgent, DocumentStore};

/// Drives the per-company pipeline: discover titles → for each candidate,
/// dedup-check → extract if new → embed → persist. Strictly sequential per
/// company so that a duplicate URL later in the same batch sees the earlier
/// insert.
pub struct Ingestor {
    agent: Arc<dyn BlogAgent>,
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn TextEmbedder>,
}

enum BlogOutcome {
    Inserted,
    AlreadyExists,
}

impl Ingestor {
    pub fn new(
        agent: Arc<dyn BlogAgent>,
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn TextEmbedder>,
    ) -> Self {
        Self {
            agent,
            store,
            embedder,
        }
    }

    /// Ingest one company. Discovery failure aborts this company's run;
    /// no single blog's failure does.
    pub async fn ingest(&self, company_name: &str, site_url: &str) -> Result<IngestStats> {
        let run_id = Uuid::new_v4();
        info!(company = company_name, site_url, %run_id, "Starting ingestion");

        let candidates = self
            .agent
            .discover_titles(site_url)
            .await
            .with_context(|| format!("Title discovery failed for {company_name}"))?;

        info!(
            company = company_name,
            count = candidates.len(),
            "Blogs discovered"
        );

        let mut stats = IngestStats {
            blogs_discovered: candidates.len() as u32,
            ..IngestStats::default()
        };

        for candidate in &candidates {
            match self.ingest_blog(company_name, candidate).await {
                Ok(BlogOutcome::Inserted) => {
                    info!(title = %candidate.title, url = %candidate.url, "Blog ingested");
                    stats.blogs_ingested += 1;
                }
                Ok(BlogOutcome::AlreadyExists) => {
                    info!(title = %candidate.title, url = %candidate.url, "Blog already exists, skipping");
                    stats.blogs_skipped += 1;
                }
                Err(e) => {
                    warn!(
                        title = %candidate.title,
                        url = %candidate.url,
                        error = format!("{e:#}"),
                        "Blog ingestion failed, continuing with next candidate"
                    );
                    stats.blogs_failed += 1;
                }
            }
        }

        info!(company = company_name, %run_id, "Ingestion complete. {stats}");
        Ok(stats)
    }

    async fn ingest_blog(&self, company_name: &str, candidate: &BlogCandidate) -> Result<BlogOutcome> {
        if self.store.url_exists(&candidate.url).await? {
            return Ok(BlogOutcome::AlreadyExists);
        }

        let body = self
            .agent
            .extract_blog(&candidate.url)
            .await
            .context("Extraction failed")?;

        let title_embedding = self
            .embedder
            .embed(&candidate.title)
            .await
            .context("Title embedding failed")?;
        let body_embedding = self
            .embedder
            .embed(&body)
            .await
            .context("Body embedding failed")?;

        let doc = BlogDocument {
            title: candidate.title.clone(),
            body,
            url: candidate.url.clone(),
            company_name: company_name.to_string(),
            timestamp: Utc::now(),
            title_embedding,
            body_embedding,
        };

        self.store
            .insert_document(&doc)
            .await
            .context("Persistence failed")?;

        Ok(BlogOutcome::Inserted)
    }

    /// Ingest every company in the roster, in roster order. A company's
    /// failure (discovery error) is recorded and the batch continues.
    pub async fn ingest_all(&self, roster: &CompanyRoster) -> IngestReport {
        let mut report = IngestReport::default();

        for company in roster.iter() {
            match self.ingest(&company.name, &company.url).await {
                Ok(stats) => report.companies.push((company.name.clone(), stats)),
                Err(e) => {
                    warn!(
                        company = %company.name,
                        error = format!("{e:#}"),
                        "Company ingestion failed, continuing with next company"
                    );
                    report.failed_companies.push(company.name.clone());
                }
            }
        }

        report
    }
}

/// Stats from one company's ingestion run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub blogs_discovered: u32,
    pub blogs_skipped: u32,
    pub blogs_ingested: u32,
    pub blogs_failed: u32,
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "discovered: {}, ingested: {}, skipped: {}, failed: {}",
            self.blogs_discovered, self.blogs_ingested, self.blogs_skipped, self.blogs_failed
        )
    }
}

/// Outcome of a batch run across the roster.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub companies: Vec<(String, IngestStats)>,
    pub failed_companies: Vec<String>,
}

impl IngestReport {
    pub fn totals(&self) -> IngestStats {
        self.companies
            .iter()
            .fold(IngestStats::default(), |mut acc, (_, s)| {
                acc.blogs_discovered += s.blogs_discovered;
                acc.blogs_skipped += s.blogs_skipped;
                acc.blogs_ingested += s.blogs_ingested;
                acc.blogs_failed += s.blogs_failed;
                acc
            })
    }
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Ingestion Run Complete ===")?;
        for (company, stats) in &self.companies {
            writeln!(f, "{company}: {stats}")?;
        }
        for company in &self.failed_companies {
            writeln!(f, "{company}: discovery failed")?;
        }
        let totals = self.totals();
        writeln!(f, "Total: {totals}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_totals_sum_company_stats() {
        let report = IngestReport {
            companies: vec![
                (
                    "acme.io".to_string(),
                    IngestStats {
                        blogs_discovered: 3,
                        blogs_skipped: 1,
                        blogs_ingested: 2,
                        blogs_failed: 0,
                    },
                ),
                (
                    "zeta.dev".to_string(),
                    IngestStats {
                        blogs_discovered: 2,
                        blogs_skipped: 0,
                        blogs_ingested: 1,
                        blogs_failed: 1,
                    },
                ),
            ],
            failed_companies: vec!["broken.example".to_string()],
        };

        let totals = report.totals();
        assert_eq!(totals.blogs_discovered, 5);
        assert_eq!(totals.blogs_ingested, 3);
        assert_eq!(totals.blogs_skipped, 1);
        assert_eq!(totals.blogs_failed, 1);

        let rendered = report.to_string();
        assert!(rendered.contains("broken.example: discovery failed"));
    }
}
