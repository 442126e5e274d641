//! Directory scanning for step content and check files

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::{format_title, StepRecord};

static CONTENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-(.+)-content\.md$").expect("content pattern is valid"));

static CHECK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-(.+)-check\.sh$").expect("check pattern is valid"));

/// Scan failed before any file could be considered
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read scenario directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A problem with a single file or step that did not stop the scan
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanIssue {
    #[error("could not read {file}: {reason}")]
    Unreadable { file: String, reason: String },

    #[error("{file} has an invalid step number '{digits}'")]
    InvalidOrdinal { file: String, digits: String },

    #[error("steps {slugs:?} share step number {ordinal}")]
    DuplicateOrdinal { ordinal: u32, slugs: Vec<String> },

    #[error("step '{key}' duplicates step {ordinal} '{slug}' and was skipped")]
    DuplicateStep { ordinal: u32, slug: String, key: String },
}

/// Digits and slug captured from a step filename, exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepKey {
    pub digits: String,
    pub slug: String,
}

impl StepKey {
    /// Key used to pair content and check files
    pub fn pairing_key(&self) -> String {
        format!("{}-{}", self.digits, self.slug)
    }

    pub fn ordinal(&self) -> Option<u32> {
        self.digits.parse().ok()
    }
}

/// Result of matching one filename against the step patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMatch {
    NoMatch,
    Content(StepKey),
    Check(StepKey),
}

/// Match a bare filename against the content and check patterns
pub fn match_file_name(name: &str) -> FileMatch {
    let capture = |re: &Regex| {
        re.captures(name).map(|caps| StepKey {
            digits: caps[1].to_string(),
            slug: caps[2].to_string(),
        })
    };

    if let Some(key) = capture(&CONTENT_RE) {
        FileMatch::Content(key)
    } else if let Some(key) = capture(&CHECK_RE) {
        FileMatch::Check(key)
    } else {
        FileMatch::NoMatch
    }
}

/// Output of a successful scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Steps sorted by ordinal, then slug
    pub records: Vec<StepRecord>,
    pub issues: Vec<ScanIssue>,
}

/// Content and check text collected for one pairing key
struct PendingStep {
    ordinal: u32,
    slug: String,
    content: Option<String>,
    check: Option<String>,
}

impl PendingStep {
    fn into_record(self) -> Option<StepRecord> {
        let content = self.content.filter(|c| !c.is_empty())?;
        Some(StepRecord {
            ordinal: self.ordinal,
            title: format_title(&self.slug),
            slug: self.slug,
            content,
            check_script: self.check.filter(|c| !c.is_empty()),
        })
    }
}

/// Scan a directory (non-recursively) for step files.
///
/// Files that cannot be read or carry an unusable number are reported in
/// [`ScanReport::issues`] and skipped. Only a directory that cannot be
/// listed fails the whole scan.
pub fn scan_dir(path: &Path) -> Result<ScanReport, ScanError> {
    let entries = fs::read_dir(path).map_err(|source| ScanError::ReadDir {
        path: path.to_path_buf(),
        source,
    })?;

    let mut issues = Vec::new();
    let mut pending: BTreeMap<String, PendingStep> = BTreeMap::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        let file_path = entry.path();
        if file_path.is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        let (key, is_content) = match match_file_name(&name) {
            FileMatch::NoMatch => continue,
            FileMatch::Content(key) => (key, true),
            FileMatch::Check(key) => (key, false),
        };

        let Some(ordinal) = key.ordinal() else {
            issues.push(ScanIssue::InvalidOrdinal {
                file: name,
                digits: key.digits,
            });
            continue;
        };

        let text = match fs::read(&file_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                issues.push(ScanIssue::Unreadable {
                    file: name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        debug!(file = %name, ordinal, "Matched step file");

        let step = pending
            .entry(key.pairing_key())
            .or_insert_with(|| PendingStep {
                ordinal,
                slug: key.slug.clone(),
                content: None,
                check: None,
            });
        if is_content {
            step.content = Some(text);
        } else {
            step.check = Some(text);
        }
    }

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (key, step) in pending {
        let Some(record) = step.into_record() else {
            continue;
        };
        if !seen.insert((record.ordinal, record.slug.clone())) {
            issues.push(ScanIssue::DuplicateStep {
                ordinal: record.ordinal,
                slug: record.slug,
                key,
            });
            continue;
        }
        records.push(record);
    }

    records.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.slug.cmp(&b.slug)));
    issues.extend(duplicate_ordinals(&records));

    Ok(ScanReport { records, issues })
}

/// Report every step number used by more than one step
fn duplicate_ordinals(sorted: &[StepRecord]) -> Vec<ScanIssue> {
    let mut issues = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let ordinal = sorted[start].ordinal;
        let end = sorted[start..]
            .iter()
            .position(|r| r.ordinal != ordinal)
            .map_or(sorted.len(), |offset| start + offset);
        if end - start > 1 {
            issues.push(ScanIssue::DuplicateOrdinal {
                ordinal,
                slugs: sorted[start..end].iter().map(|r| r.slug.clone()).collect(),
            });
        }
        start = end;
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) {
        fs::write(dir.path().join(name), body).unwrap();
    }

    fn key(digits: &str, slug: &str) -> StepKey {
        StepKey {
            digits: digits.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_match_content_and_check() {
        assert_eq!(
            match_file_name("01-setup-content.md"),
            FileMatch::Content(key("01", "setup"))
        );
        assert_eq!(
            match_file_name("12-deploy-app-check.sh"),
            FileMatch::Check(key("12", "deploy-app"))
        );
    }

    #[test]
    fn test_match_is_anchored() {
        assert_eq!(match_file_name("x01-setup-content.md"), FileMatch::NoMatch);
        assert_eq!(match_file_name("01-setup-content.md.bak"), FileMatch::NoMatch);
        assert_eq!(match_file_name("01-setup-content.txt"), FileMatch::NoMatch);
        assert_eq!(match_file_name("01-content.md"), FileMatch::NoMatch);
        assert_eq!(match_file_name("setup-content.md"), FileMatch::NoMatch);
        assert_eq!(match_file_name("README.md"), FileMatch::NoMatch);
    }

    #[test]
    fn test_match_slug_is_greedy() {
        assert_eq!(
            match_file_name("03-content-content.md"),
            FileMatch::Content(key("03", "content"))
        );
        assert_eq!(
            match_file_name("03-a-check-check.sh"),
            FileMatch::Check(key("03", "a-check"))
        );
    }

    #[test]
    fn test_step_key() {
        let k = key("007", "intro");
        assert_eq!(k.pairing_key(), "007-intro");
        assert_eq!(k.ordinal(), Some(7));
        assert_eq!(key("99999999999", "big").ordinal(), None);
    }

    #[test]
    fn test_scan_pairs_and_sorts() {
        let dir = TempDir::new().unwrap();
        write(&dir, "02-deploy-content.md", "# Deploy");
        write(&dir, "01-setup-content.md", "# Setup");
        write(&dir, "01-setup-check.sh", "exit 0");
        write(&dir, "notes.txt", "ignored");

        let report = scan_dir(dir.path()).unwrap();
        assert!(report.issues.is_empty());
        assert_eq!(report.records.len(), 2);

        let first = &report.records[0];
        assert_eq!(first.ordinal, 1);
        assert_eq!(first.title, "Setup");
        assert_eq!(first.content, "# Setup");
        assert_eq!(first.check_script.as_deref(), Some("exit 0"));

        let second = &report.records[1];
        assert_eq!(second.ordinal, 2);
        assert!(second.check_script.is_none());
    }

    #[test]
    fn test_scan_drops_check_only_steps() {
        let dir = TempDir::new().unwrap();
        write(&dir, "01-setup-content.md", "# Setup");
        write(&dir, "02-orphan-check.sh", "exit 0");

        let report = scan_dir(dir.path()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].slug, "setup");
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_scan_drops_empty_content() {
        let dir = TempDir::new().unwrap();
        write(&dir, "01-empty-content.md", "");
        write(&dir, "02-real-content.md", "body");
        write(&dir, "02-real-check.sh", "");

        let report = scan_dir(dir.path()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].slug, "real");
        assert!(!report.records[0].has_check());
    }

    #[test]
    fn test_scan_pairing_requires_identical_digits() {
        let dir = TempDir::new().unwrap();
        write(&dir, "1-setup-content.md", "# Setup");
        write(&dir, "01-setup-check.sh", "exit 0");

        let report = scan_dir(dir.path()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert!(report.records[0].check_script.is_none());
    }

    #[test]
    fn test_scan_ignores_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("05-nested-content.md")).unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        write(&dir, "assets/06-deep-content.md", "# Deep");
        write(&dir, "01-top-content.md", "# Top");

        let report = scan_dir(dir.path()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].slug, "top");
    }

    #[test]
    fn test_scan_reports_overflowing_ordinal() {
        let dir = TempDir::new().unwrap();
        write(&dir, "99999999999-big-content.md", "# Big");
        write(&dir, "01-ok-content.md", "# Ok");

        let report = scan_dir(dir.path()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(
            report.issues,
            vec![ScanIssue::InvalidOrdinal {
                file: "99999999999-big-content.md".to_string(),
                digits: "99999999999".to_string(),
            }]
        );
    }

    #[test]
    fn test_scan_reports_shared_ordinal() {
        let dir = TempDir::new().unwrap();
        write(&dir, "01-beta-content.md", "b");
        write(&dir, "01-alpha-content.md", "a");
        write(&dir, "02-gamma-content.md", "c");

        let report = scan_dir(dir.path()).unwrap();
        let slugs: Vec<&str> = report.records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "beta", "gamma"]);
        assert_eq!(
            report.issues,
            vec![ScanIssue::DuplicateOrdinal {
                ordinal: 1,
                slugs: vec!["alpha".to_string(), "beta".to_string()],
            }]
        );
    }

    #[test]
    fn test_scan_reports_leading_zero_duplicates() {
        let dir = TempDir::new().unwrap();
        write(&dir, "01-setup-content.md", "first");
        write(&dir, "1-setup-content.md", "second");

        let report = scan_dir(dir.path()).unwrap();
        assert_eq!(report.records.len(), 1);
        // "01-setup" sorts before "1-setup" and wins
        assert_eq!(report.records[0].content, "first");
        assert_eq!(
            report.issues,
            vec![ScanIssue::DuplicateStep {
                ordinal: 1,
                slug: "setup".to_string(),
                key: "1-setup".to_string(),
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_unreadable_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "01-setup-content.md", "# Setup");
        std::os::unix::fs::symlink(
            dir.path().join("missing-target.md"),
            dir.path().join("02-broken-content.md"),
        )
        .unwrap();

        let report = scan_dir(dir.path()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].slug, "setup");
        assert_eq!(report.issues.len(), 1);
        assert!(matches!(
            &report.issues[0],
            ScanIssue::Unreadable { file, .. } if file == "02-broken-content.md"
        ));
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = scan_dir(&missing).unwrap_err();
        assert!(matches!(err, ScanError::ReadDir { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        let report = scan_dir(dir.path()).unwrap();
        assert!(report.records.is_empty());
        assert!(report.issues.is_empty());
    }
}
