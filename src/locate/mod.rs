//! Snapshot discovery: directory scans, filename-token parsing, and
//! latest-file lookup.
//!
//! Snapshot filenames carry their capture period: `<prefix>_<YYYYMMDD>.json`
//! or `<prefix>_<YYYYMM>.json` for the ranking pipelines, and
//! `<prefix>_<month_name>_<year>[_<YYYYMMDD>_<HHMMSS>].json` for the
//! new-releases variant. Files whose names do not parse are skipped with a
//! warning, never fatal.

pub mod latest;
pub mod period;

pub use latest::{latest_snapshot, LatestFileCache};
pub use period::{date_token, parse_period_token, PeriodToken};

use crate::error::{LoadWarning, ScanError};
use chrono::NaiveDate;
use glob::glob;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One discovered ranking snapshot with its parsed capture period.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    pub path: PathBuf,
    pub file_name: String,
    pub period: PeriodToken,
    /// First day of the capture period; records loaded from this file are
    /// stamped with it.
    pub captured_at: NaiveDate,
    /// Grouping key derived from the period, e.g. `"2025년 03월 07일"`.
    pub period_key: String,
}

/// Result of a directory scan: files in ascending filename order (which the
/// fixed-width token convention makes chronological), plus per-file skips.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<SnapshotFile>,
    pub warnings: Vec<LoadWarning>,
}

/// Matching filenames under `dir`, ascending. Errors only on the two
/// directory-level conditions; everything per-file degrades to a warning.
fn matching_names(dir: &Path, prefix: &str) -> Result<Vec<(PathBuf, String)>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }
    let pattern = format!("{}/{}_*.json", dir.display(), prefix);
    let paths = glob(&pattern)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let mut found: Vec<(PathBuf, String)> = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "unreadable directory entry");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            found.push((path.clone(), name.to_string()));
        }
    }
    if found.is_empty() {
        return Err(ScanError::NoDataFound {
            dir: dir.to_path_buf(),
            pattern: format!("{}_*.json", prefix),
        });
    }
    found.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(found)
}

/// Discover ranking snapshots under `dir` whose names start with `prefix`.
///
/// Files whose date token parses as neither `YYYYMMDD` nor `YYYYMM` are
/// skipped and reported in the warning list.
pub fn scan_snapshots(dir: &Path, prefix: &str) -> Result<ScanOutcome, ScanError> {
    let mut outcome = ScanOutcome::default();
    for (path, file_name) in matching_names(dir, prefix)? {
        let token = date_token(&file_name).unwrap_or("");
        let period = parse_period_token(token);
        let (captured_at, period_key) = match (period.start_date(), period.key()) {
            (Some(date), Some(key)) => (date, key),
            _ => {
                warn!(file = %file_name, token = %token, "unrecognized date token; skipping");
                outcome
                    .warnings
                    .push(LoadWarning::UnparseableFilename { file: file_name });
                continue;
            }
        };
        outcome.files.push(SnapshotFile {
            path,
            file_name,
            period,
            captured_at,
            period_key,
        });
    }
    Ok(outcome)
}

/// `<month_name>_<year>` with an optional trailing capture timestamp, as the
/// new-releases fetcher names its output.
static RELEASE_STEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([a-z]+)_(\d{4})(?:_(\d{8})_\d{6})?$").unwrap());

/// One discovered new-releases snapshot.
#[derive(Debug, Clone)]
pub struct ReleaseFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Month name token, lowercased (`"march"`); unrecognized names are
    /// passed through to the aggregator as-is.
    pub month_name: String,
    pub year: i32,
    /// Capture date from the trailing timestamp token, when present.
    pub captured_at: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct ReleaseScan {
    pub files: Vec<ReleaseFile>,
    pub warnings: Vec<LoadWarning>,
}

/// Discover new-releases snapshots under `dir` whose names start with
/// `prefix`. Names that do not carry `<month_name>_<year>` are skipped with
/// a warning.
pub fn scan_release_snapshots(dir: &Path, prefix: &str) -> Result<ReleaseScan, ScanError> {
    let mut outcome = ReleaseScan::default();
    for (path, file_name) in matching_names(dir, prefix)? {
        let stem = file_name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|rest| rest.strip_suffix(".json"))
            .unwrap_or("");
        let captures = match RELEASE_STEM.captures(stem) {
            Some(c) => c,
            None => {
                warn!(file = %file_name, "unrecognized release filename; skipping");
                outcome
                    .warnings
                    .push(LoadWarning::UnparseableFilename { file: file_name });
                continue;
            }
        };
        let month_name = captures[1].to_ascii_lowercase();
        let year: i32 = match captures[2].parse() {
            Ok(y) => y,
            Err(_) => {
                outcome
                    .warnings
                    .push(LoadWarning::UnparseableFilename { file: file_name });
                continue;
            }
        };
        let captured_at = captures
            .get(3)
            .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y%m%d").ok());
        outcome.files.push(ReleaseFile {
            path,
            file_name,
            month_name,
            year,
            captured_at,
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"[]").unwrap();
    }

    #[test]
    fn scan_orders_files_by_name() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "top100_games_20250310.json");
        touch(tmp.path(), "top100_games_20250301.json");
        touch(tmp.path(), "top100_games_202502.json");

        let outcome = scan_snapshots(tmp.path(), "top100_games").unwrap();
        let names: Vec<&str> = outcome.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "top100_games_202502.json",
                "top100_games_20250301.json",
                "top100_games_20250310.json"
            ]
        );
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn missing_directory_is_its_own_condition() {
        let tmp = tempdir().unwrap();
        let gone = tmp.path().join("nope");
        match scan_snapshots(&gone, "top100_games") {
            Err(ScanError::DirectoryNotFound(path)) => assert_eq!(path, gone),
            other => panic!("expected DirectoryNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_match_is_no_data_not_empty_history() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "unrelated_20250301.json");
        match scan_snapshots(tmp.path(), "top100_games") {
            Err(ScanError::NoDataFound { pattern, .. }) => {
                assert_eq!(pattern, "top100_games_*.json")
            }
            other => panic!("expected NoDataFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn four_digit_token_is_skipped_with_warning() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "snapshot_2025.json");
        touch(tmp.path(), "snapshot_20250301.json");

        let outcome = scan_snapshots(tmp.path(), "snapshot").unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].file_name, "snapshot_20250301.json");
        assert_eq!(
            outcome.warnings,
            vec![LoadWarning::UnparseableFilename {
                file: "snapshot_2025.json".to_string()
            }]
        );
    }

    #[test]
    fn release_scan_extracts_month_year_and_capture_date() {
        let tmp = tempdir().unwrap();
        touch(tmp.path(), "new_releases_march_2025_20250617_114950.json");
        touch(tmp.path(), "new_releases_may_2025.json");
        touch(tmp.path(), "new_releases_garbage.json");

        let outcome = scan_release_snapshots(tmp.path(), "new_releases").unwrap();
        assert_eq!(outcome.files.len(), 2);

        let march = &outcome.files[0];
        assert_eq!(march.month_name, "march");
        assert_eq!(march.year, 2025);
        assert_eq!(
            march.captured_at,
            Some(NaiveDate::from_ymd_opt(2025, 6, 17).unwrap())
        );

        let may = &outcome.files[1];
        assert_eq!(may.month_name, "may");
        assert_eq!(may.captured_at, None);

        assert_eq!(
            outcome.warnings,
            vec![LoadWarning::UnparseableFilename {
                file: "new_releases_garbage.json".to_string()
            }]
        );
    }
}
