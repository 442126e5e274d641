//! Tutorial steps discovered from the scenario directory.
//!
//! Step files are paired by name (`01-setup-content.md` with
//! `01-setup-check.sh`), ordered by their numeric prefix and exposed through
//! an immutable [`Catalog`] numbered 1..N.

pub mod catalog;
pub mod scanner;

pub use catalog::{Catalog, CatalogError, CatalogStatus, StepSummary};
pub use scanner::{match_file_name, scan_dir, FileMatch, ScanError, ScanIssue, ScanReport, StepKey};

/// One tutorial step with its content and optional check script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Numeric filename prefix, defines sort order
    pub ordinal: u32,
    /// Name part of the filename, used for pairing only
    pub slug: String,
    pub title: String,
    /// Markdown body, never empty
    pub content: String,
    pub check_script: Option<String>,
}

impl StepRecord {
    pub fn has_check(&self) -> bool {
        self.check_script.is_some()
    }
}

/// Derive a display title from a slug: `intro-to-pods` becomes `Intro To Pods`
pub fn format_title(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
