// report assembly - per-repository analyses rendered into one plain-text report

use crate::catalog::PatternCatalog;
use crate::classifier::{self, Findings};
use crate::error::{DoctorError, Result};
use crate::recommend;
use crate::utils::log_excerpt;
use chrono::NaiveDateTime;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const TITLE: &str = "RAILWAY DEPLOYMENT FAILURE ANALYSIS REPORT";

/// identity of an analysed repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub name: String,
    pub url: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NoIssues,
    IssuesFound(usize),
}

impl Status {
    fn from_findings(findings: &Findings) -> Self {
        if findings.is_empty() {
            Status::NoIssues
        } else {
            Status::IssuesFound(findings.len())
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoIssues => write!(f, "✅ No issues detected"),
            Status::IssuesFound(n) => write!(f, "❌ {n} issue categories found"),
        }
    }
}

/// everything the report needs to know about one repository
#[derive(Debug, Clone)]
pub struct RepositoryAnalysis {
    repo: RepositoryInfo,
    status: Status,
    findings: Findings,
    recommendations: Vec<String>,
    logs_preview: String,
}

impl RepositoryAnalysis {
    /// classify a repository's logs and derive status, advice and preview
    pub fn from_logs(repo: RepositoryInfo, logs: &str, catalog: &PatternCatalog) -> Result<Self> {
        let findings = classifier::analyze(logs, catalog);
        Self::new(repo, findings, logs)
    }

    pub fn new(repo: RepositoryInfo, findings: Findings, logs: &str) -> Result<Self> {
        if repo.name.trim().is_empty() {
            return Err(DoctorError::InvalidAnalysis("repository name"));
        }
        if repo.url.trim().is_empty() {
            return Err(DoctorError::InvalidAnalysis("repository url"));
        }

        let recommendations = recommend::generate(&findings);
        Ok(Self {
            status: Status::from_findings(&findings),
            recommendations,
            logs_preview: log_excerpt(logs),
            findings,
            repo,
        })
    }

    pub fn repo(&self) -> &RepositoryInfo {
        &self.repo
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn findings(&self) -> &Findings {
        &self.findings
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    pub fn logs_preview(&self) -> &str {
        &self.logs_preview
    }

    pub fn has_issues(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// render the full report; output depends only on the arguments
pub fn assemble(user: &str, analyses: &[RepositoryAnalysis], generated_at: NaiveDateTime) -> String {
    let mut report = Vec::new();

    report.push("=".repeat(80));
    report.push(TITLE.to_string());
    report.push("=".repeat(80));
    report.push(format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")));
    report.push(format!("GitHub User: {user}"));
    report.push(format!("Repositories Analyzed: {}", analyses.len()));
    report.push(String::new());

    let total = analyses.len();
    let with_issues = analyses.iter().filter(|a| a.has_issues()).count();

    report.push("📊 SUMMARY".to_string());
    report.push("-".repeat(40));
    report.push(format!("Total Repositories: {total}"));
    report.push(format!("Repositories with Issues: {with_issues}"));
    report.push(format!("Healthy Repositories: {}", total - with_issues));
    report.push(String::new());

    for analysis in analyses {
        push_repository_block(&mut report, analysis);
    }

    report.join("\n")
}

fn push_repository_block(report: &mut Vec<String>, analysis: &RepositoryAnalysis) {
    let repo = analysis.repo();

    report.push("=".repeat(60));
    report.push(format!("REPOSITORY: {}", repo.name));
    report.push("=".repeat(60));
    report.push(format!("URL: {}", repo.url));
    report.push(format!("Last Updated: {}", repo.last_updated));
    report.push(format!("Status: {}", analysis.status()));
    report.push(String::new());

    if analysis.has_issues() {
        report.push("🔍 ISSUES FOUND:".to_string());
        for (category, patterns) in analysis.findings().iter() {
            report.push(format!("  • {}:", category.label()));
            for pattern in patterns {
                report.push(format!("    - {pattern}"));
            }
        }
        report.push(String::new());

        report.push("💡 RECOMMENDATIONS:".to_string());
        for rec in analysis.recommendations() {
            report.push(format!("  {rec}"));
        }
        report.push(String::new());
    } else {
        report.push("✅ No deployment issues detected".to_string());
        report.push(String::new());
    }

    if !analysis.logs_preview().is_empty() {
        report.push("📋 LOGS PREVIEW:".to_string());
        report.push("-".repeat(40));
        report.push(analysis.logs_preview().to_string());
        report.push(String::new());
    }
}

/// file name embedding the generation time, e.g. railway_deployment_report_20240101_120000.txt
pub fn report_filename(generated_at: NaiveDateTime) -> String {
    format!(
        "railway_deployment_report_{}.txt",
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// persist a report into `dir` and return its path
pub fn write_report(dir: &Path, report: &str, generated_at: NaiveDateTime) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_filename(generated_at));
    fs::write(&path, report)?;
    info!(path = %path.display(), bytes = report.len(), "report written");
    Ok(path)
}
