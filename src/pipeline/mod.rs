//! Batch loading: locate snapshot files, parse their contents, normalize
//! every record, and group by capture period.
//!
//! Reads are sequential in filename order; that order is load-bearing for
//! the ranking tie-breaks downstream. Every per-file failure degrades to a
//! warning, and only the two directory-level conditions propagate.

use crate::error::{LoadWarning, ScanError};
use crate::locate::{scan_release_snapshots, scan_snapshots};
use crate::monthly::{month_key, month_number, MonthGroup, MonthlySummary};
use crate::normalize::{normalize, CanonicalRecord, RawRecord};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Records of one capture period, concatenated in file-sort order.
#[derive(Debug, Clone)]
pub struct SnapshotGroup {
    pub period_key: String,
    pub records: Vec<CanonicalRecord>,
}

/// The loaded ranking history.
#[derive(Debug, Default)]
pub struct SnapshotCorpus {
    /// Groups in chronological period-key order.
    pub groups: Vec<SnapshotGroup>,
    /// Every record across the whole history, in file-sort order: the
    /// input the consistency ranker counts over.
    pub records: Vec<CanonicalRecord>,
    pub warnings: Vec<LoadWarning>,
}

/// The loaded new-releases history.
#[derive(Debug, Default)]
pub struct ReleaseCorpus {
    /// Month groups in first-seen (file-sort) order.
    pub months: Vec<MonthGroup>,
    pub warnings: Vec<LoadWarning>,
}

impl ReleaseCorpus {
    pub fn month_keys(&self) -> Vec<&str> {
        self.months.iter().map(|g| g.month_key.as_str()).collect()
    }

    pub fn summarize(&self, key: &str) -> Option<MonthlySummary> {
        crate::monthly::summarize(&self.months, key)
    }

    pub fn top_by_rank(&self, key: &str, n: usize) -> Vec<CanonicalRecord> {
        crate::monthly::top_by_rank(&self.months, key, n)
    }
}

/// Parse one snapshot file. Any failure is reported as a reason string; the
/// caller records it and moves on.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())
}

/// Load the full ranking history under `dir` for `prefix`.
///
/// Files are read fully into memory one at a time, in filename order.
/// Unparseable filenames and malformed contents are skipped with warnings;
/// the batch never aborts for one bad snapshot.
pub fn load_corpus(dir: &Path, prefix: &str) -> Result<SnapshotCorpus, ScanError> {
    let scan = scan_snapshots(dir, prefix)?;
    let mut corpus = SnapshotCorpus {
        warnings: scan.warnings,
        ..SnapshotCorpus::default()
    };

    let mut by_key: BTreeMap<String, Vec<CanonicalRecord>> = BTreeMap::new();
    for file in &scan.files {
        let raw: Vec<RawRecord> = match read_document(&file.path) {
            Ok(records) => records,
            Err(reason) => {
                warn!(file = %file.file_name, %reason, "malformed snapshot; skipping");
                corpus.warnings.push(LoadWarning::MalformedSnapshot {
                    file: file.file_name.clone(),
                    reason,
                });
                continue;
            }
        };
        let normalized: Vec<CanonicalRecord> = raw
            .iter()
            .filter_map(|record| normalize(record, file.captured_at))
            .collect();
        info!(
            file = %file.file_name,
            period = %file.period_key,
            records = normalized.len(),
            "loaded snapshot"
        );
        by_key
            .entry(file.period_key.clone())
            .or_default()
            .extend(normalized.iter().cloned());
        corpus.records.extend(normalized);
    }

    corpus.groups = by_key
        .into_iter()
        .map(|(period_key, records)| SnapshotGroup {
            period_key,
            records,
        })
        .collect();
    info!(
        groups = corpus.groups.len(),
        records = corpus.records.len(),
        skipped = corpus.warnings.len(),
        "history loaded"
    );
    Ok(corpus)
}

/// Load the new-releases history under `dir` for `prefix`, grouped by the
/// month key parsed from each filename.
pub fn load_release_corpus(dir: &Path, prefix: &str) -> Result<ReleaseCorpus, ScanError> {
    let scan = scan_release_snapshots(dir, prefix)?;
    let mut corpus = ReleaseCorpus {
        warnings: scan.warnings,
        ..ReleaseCorpus::default()
    };

    for file in &scan.files {
        let raw: Vec<RawRecord> = match read_document(&file.path) {
            Ok(records) => records,
            Err(reason) => {
                warn!(file = %file.file_name, %reason, "malformed snapshot; skipping");
                corpus.warnings.push(LoadWarning::MalformedSnapshot {
                    file: file.file_name.clone(),
                    reason,
                });
                continue;
            }
        };
        // The record date is informational for this variant: capture token
        // when present, else the month itself.
        let captured_at = file
            .captured_at
            .or_else(|| {
                month_number(&file.month_name)
                    .and_then(|m| NaiveDate::from_ymd_opt(file.year, m, 1))
            })
            .or_else(|| NaiveDate::from_ymd_opt(file.year, 1, 1))
            .unwrap_or_default();
        let key = month_key(&file.month_name, file.year);
        let normalized: Vec<CanonicalRecord> = raw
            .iter()
            .filter_map(|record| normalize(record, captured_at))
            .collect();
        info!(
            file = %file.file_name,
            month = %key,
            records = normalized.len(),
            "loaded release snapshot"
        );
        match corpus.months.iter_mut().find(|g| g.month_key == key) {
            Some(group) => group.records.extend(normalized),
            None => corpus.months.push(MonthGroup {
                month_key: key,
                records: normalized,
            }),
        }
    }

    info!(
        months = corpus.months.len(),
        skipped = corpus.warnings.len(),
        "release history loaded"
    );
    Ok(corpus)
}
