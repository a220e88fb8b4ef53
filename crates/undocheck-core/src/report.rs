use crate::{PhaseOutcome, PhaseRecord, Result, Scenario};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Aggregated result of one verification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub scenario: Scenario,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub phases: Vec<PhaseRecord>,
    /// Capture taken after every phase passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_screenshot: Option<PathBuf>,
}

impl Report {
    pub fn passed(&self) -> bool {
        !self.phases.is_empty() && self.phases.iter().all(|p| p.outcome == PhaseOutcome::Passed)
    }

    pub fn first_failure(&self) -> Option<&PhaseRecord> {
        self.phases.iter().find(|p| p.outcome.is_failure())
    }

    /// Every screenshot written during the run
    pub fn screenshots(&self) -> Vec<&Path> {
        self.phases
            .iter()
            .filter_map(|p| p.screenshot.as_deref())
            .chain(self.success_screenshot.as_deref())
            .collect()
    }
}

pub struct ReportWriter;

impl ReportWriter {
    pub fn to_file(report: &Report, path: &Path) -> Result<()> {
        tracing::debug!("Writing report to: {}", path.display());

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        tracing::info!(
            "Wrote report with {} phases to {}",
            report.phases.len(),
            path.display()
        );

        Ok(())
    }

    pub fn to_string(report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
