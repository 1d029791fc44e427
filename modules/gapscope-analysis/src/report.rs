use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use gapscope_common::CompanyTopics;

use crate::gaps::GapAnalysis;

/// Shape of `dashboard_data.json`, consumed by the visualization front end.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub metadata: Metadata,
    pub summary_metrics: SummaryMetrics,
    pub topic_distribution: TopicDistribution,
    pub topics_by_company: BTreeMap<String, usize>,
    pub gap_analysis: GapSection,
    pub detailed_data: DetailedData,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub timestamp: String,
    pub companies_analyzed: usize,
    pub total_topics: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryMetrics {
    pub companies_analyzed: usize,
    pub topics_identified: usize,
    pub gap_opportunities: usize,
    pub coverage_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct TopicDistribution {
    pub reference_percentage: u32,
    pub competitor_percentage: u32,
}

#[derive(Debug, Serialize)]
pub struct GapSection {
    pub high_priority: Vec<String>,
    pub medium_priority: Vec<String>,
    pub total_gaps: usize,
}

#[derive(Debug, Serialize)]
pub struct DetailedData {
    pub reference_topics: Vec<String>,
    pub competitor_topics: Vec<String>,
    pub coverage_topics: Vec<String>,
    pub gap_topics: Vec<String>,
    pub company_topics: BTreeMap<String, Vec<String>>,
}

pub fn build_dashboard_data(
    analysis: &GapAnalysis,
    company_topics: &[CompanyTopics],
    generated_at: DateTime<Utc>,
) -> DashboardData {
    let total_topics = analysis.all_topics.len();
    let reference_percentage = if total_topics == 0 {
        0
    } else {
        (analysis.reference_topics.len() as f64 / total_topics as f64 * 100.0).round() as u32
    };

    DashboardData {
        metadata: Metadata {
            timestamp: generated_at.to_rfc3339(),
            companies_analyzed: company_topics.len(),
            total_topics,
        },
        summary_metrics: SummaryMetrics {
            companies_analyzed: company_topics.len(),
            topics_identified: total_topics,
            gap_opportunities: analysis.gaps.len(),
            coverage_percentage: analysis.coverage_percentage,
        },
        topic_distribution: TopicDistribution {
            reference_percentage,
            competitor_percentage: 100u32.saturating_sub(reference_percentage),
        },
        topics_by_company: company_topics
            .iter()
            .map(|c| (c.company.clone(), c.topics.len()))
            .collect(),
        gap_analysis: GapSection {
            high_priority: analysis.high_priority.clone(),
            medium_priority: analysis.medium_priority.clone(),
            total_gaps: analysis.gaps.len(),
        },
        detailed_data: DetailedData {
            reference_topics: analysis.reference_topics.clone(),
            competitor_topics: analysis.competitor_topics.clone(),
            coverage_topics: analysis.coverage.clone(),
            gap_topics: analysis.gaps.clone(),
            company_topics: company_topics
                .iter()
                .map(|c| (c.company.clone(), c.topics.clone()))
                .collect(),
        },
    }
}

/// Writes one timestamped artifact folder per analysis run.
pub struct DashboardWriter {
    base_dir: PathBuf,
}

impl DashboardWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Write all artifacts for this run. Returns the created folder.
    pub fn write(
        &self,
        analysis: &GapAnalysis,
        company_topics: &[CompanyTopics],
    ) -> Result<PathBuf> {
        self.write_at(analysis, company_topics, Utc::now())
    }

    fn write_at(
        &self,
        analysis: &GapAnalysis,
        company_topics: &[CompanyTopics],
        generated_at: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let folder = self.base_dir.join(folder_name(generated_at));
        std::fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create dashboard folder {}", folder.display()))?;

        let data = build_dashboard_data(analysis, company_topics, generated_at);

        write_file(
            &folder.join("dashboard_data.json"),
            &serde_json::to_string_pretty(&data)?,
        )?;
        write_file(
            &folder.join("summary_metrics.csv"),
            &summary_metrics_csv(&data.summary_metrics),
        )?;
        write_file(
            &folder.join("topics_by_company.csv"),
            &topics_by_company_csv(company_topics),
        )?;
        if !analysis.gaps.is_empty() {
            write_file(
                &folder.join("gap_opportunities.csv"),
                &gap_opportunities_csv(analysis),
            )?;
        }
        write_file(&folder.join("analysis_info.txt"), &analysis_info(&data, analysis))?;

        info!(folder = %folder.display(), "Dashboard artifacts written");
        Ok(folder)
    }

    /// Available dashboard folders, newest first.
    pub fn list_dashboards(&self) -> Result<Vec<String>> {
        let mut folders = Vec::new();
        if self.base_dir.exists() {
            for entry in std::fs::read_dir(&self.base_dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().to_string();
                if entry.file_type()?.is_dir() && name.starts_with("analysis_") {
                    folders.push(name);
                }
            }
        }
        folders.sort();
        folders.reverse();
        Ok(folders)
    }
}

fn folder_name(ts: DateTime<Utc>) -> String {
    format!("analysis_{}", ts.format("%Y%m%d_%H%M%S"))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn summary_metrics_csv(metrics: &SummaryMetrics) -> String {
    format!(
        "companies_analyzed,topics_identified,gap_opportunities,coverage_percentage\n{},{},{},{}\n",
        metrics.companies_analyzed,
        metrics.topics_identified,
        metrics.gap_opportunities,
        metrics.coverage_percentage
    )
}

fn topics_by_company_csv(company_topics: &[CompanyTopics]) -> String {
    let mut out = String::from("Company,Topic_Count,Topics\n");
    for company in company_topics {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_field(&company.company),
            company.topics.len(),
            csv_field(&company.topics.join(", "))
        ));
    }
    out
}

fn gap_opportunities_csv(analysis: &GapAnalysis) -> String {
    let mut out = String::from("Topic,Priority\n");
    for gap in &analysis.high_priority {
        out.push_str(&format!("{},High\n", csv_field(gap)));
    }
    for gap in &analysis.medium_priority {
        out.push_str(&format!("{},Medium\n", csv_field(gap)));
    }
    out
}

fn analysis_info(data: &DashboardData, analysis: &GapAnalysis) -> String {
    format!(
        "{} Topic Gap Analysis Dashboard\nGenerated: {}\nCompanies Analyzed: {}\nTotal Topics Identified: {}\nGap Opportunities: {}\nCoverage: {}%\n",
        analysis.reference_company,
        data.metadata.timestamp,
        data.metadata.companies_analyzed,
        data.metadata.total_topics,
        analysis.gaps.len(),
        analysis.coverage_percentage
    )
}
