//! Read-only, ordered step catalog

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use super::scanner::{scan_dir, ScanIssue, ScanReport};
use super::StepRecord;

/// Lookup failures for 1-based step numbers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("step {0} not found")]
    StepNotFound(usize),

    #[error("step {0} has no check script")]
    NoCheck(usize),
}

/// Whether the catalog reflects the scenario directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    /// The directory was scanned; zero steps is a legitimate scenario
    Loaded,
    /// The directory could not be scanned; the catalog is empty
    Degraded { reason: String },
}

/// Summary view of a step, without content or check text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSummary {
    pub number: usize,
    pub title: String,
    pub has_check: bool,
}

/// Ordered steps, numbered 1..N in catalog order.
///
/// Built once and never mutated, so it can be shared behind an `Arc` and
/// read concurrently without locking.
#[derive(Debug, Clone)]
pub struct Catalog {
    steps: Vec<StepRecord>,
    issues: Vec<ScanIssue>,
    status: CatalogStatus,
}

impl Catalog {
    /// Scan `path` and build the catalog.
    ///
    /// A directory that cannot be read yields an empty, degraded catalog
    /// instead of an error.
    pub fn load(path: &Path) -> Self {
        match scan_dir(path) {
            Ok(report) => {
                let catalog = Self::from_report(report);
                for issue in &catalog.issues {
                    warn!("Step file issue in {}: {}", path.display(), issue);
                }
                info!(
                    steps = catalog.len(),
                    path = %path.display(),
                    "Loaded step catalog"
                );
                catalog
            }
            Err(e) => {
                warn!("Failed to load steps: {}", e);
                Self::degraded(e.to_string())
            }
        }
    }

    /// Build from an already sorted scan report
    pub fn from_report(report: ScanReport) -> Self {
        Self {
            steps: report.records,
            issues: report.issues,
            status: CatalogStatus::Loaded,
        }
    }

    /// Empty catalog standing in for a failed scan
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            issues: Vec::new(),
            status: CatalogStatus::Degraded {
                reason: reason.into(),
            },
        }
    }

    /// Summaries of every step in catalog order
    pub fn list(&self) -> Vec<StepSummary> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepSummary {
                number: i + 1,
                title: step.title.clone(),
                has_check: step.has_check(),
            })
            .collect()
    }

    /// Full step at 1-based `number`
    pub fn get(&self, number: usize) -> Result<&StepRecord, CatalogError> {
        number
            .checked_sub(1)
            .and_then(|index| self.steps.get(index))
            .ok_or(CatalogError::StepNotFound(number))
    }

    /// Check script of the step at 1-based `number`
    pub fn check_script_for(&self, number: usize) -> Result<&str, CatalogError> {
        self.get(number)?
            .check_script
            .as_deref()
            .ok_or(CatalogError::NoCheck(number))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn status(&self) -> &CatalogStatus {
        &self.status
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, CatalogStatus::Degraded { .. })
    }

    /// Problems found while scanning, in discovery order
    pub fn issues(&self) -> &[ScanIssue] {
        &self.issues
    }
}
