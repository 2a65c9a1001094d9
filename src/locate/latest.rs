//! "Latest capture" lookup for single-document loads (metadata, country
//! stats, the current top-100 overview).
//!
//! The fixed-width timestamp convention makes the lexicographic maximum the
//! most recent capture. [`LatestFileCache`] wraps the lookup in an explicit
//! cache keyed by directory mtime with a stated TTL, so callers that poll
//! (dashboards) neither re-scan on every access nor hold a stale answer for
//! the life of the process.

use crate::error::ScanError;
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

/// Most recent snapshot for `prefix` under `dir`, by max filename.
pub fn latest_snapshot(dir: &Path, prefix: &str) -> Result<PathBuf, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound(dir.to_path_buf()));
    }
    let pattern = format!("{}/{}_*.json", dir.display(), prefix);
    let paths = glob(&pattern)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    paths
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .max_by(|a, b| a.file_name().cmp(&b.file_name()))
        .ok_or_else(|| ScanError::NoDataFound {
            dir: dir.to_path_buf(),
            pattern: format!("{}_*.json", prefix),
        })
}

struct CachedLookup {
    path: PathBuf,
    dir_mtime: Option<SystemTime>,
    resolved_at: Instant,
}

/// Cached [`latest_snapshot`] lookup. A cached answer is served until its
/// TTL elapses or the directory mtime moves; `refresh` drops it eagerly.
pub struct LatestFileCache {
    dir: PathBuf,
    prefix: String,
    ttl: Duration,
    state: Mutex<Option<CachedLookup>>,
}

impl LatestFileCache {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Resolve the latest snapshot, reusing the cached answer while fresh.
    pub fn get(&self) -> Result<PathBuf, ScanError> {
        let dir_mtime = fs::metadata(&self.dir).and_then(|m| m.modified()).ok();
        let mut guard = self.state.lock().unwrap();
        if let Some(cached) = guard.as_ref() {
            if cached.resolved_at.elapsed() < self.ttl && cached.dir_mtime == dir_mtime {
                return Ok(cached.path.clone());
            }
        }
        let path = latest_snapshot(&self.dir, &self.prefix)?;
        *guard = Some(CachedLookup {
            path: path.clone(),
            dir_mtime,
            resolved_at: Instant::now(),
        });
        Ok(path)
    }

    /// Drop the cached answer; the next `get` re-scans the directory.
    pub fn refresh(&self) {
        *self.state.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn latest_is_max_filename() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("game_metadata_20250301_090000.json"), b"{}").unwrap();
        fs::write(tmp.path().join("game_metadata_20250302_090000.json"), b"{}").unwrap();
        fs::write(tmp.path().join("other_20250401_090000.json"), b"{}").unwrap();

        let latest = latest_snapshot(tmp.path(), "game_metadata").unwrap();
        assert_eq!(
            latest.file_name().unwrap(),
            "game_metadata_20250302_090000.json"
        );
    }

    #[test]
    fn latest_reports_no_data_when_nothing_matches() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            latest_snapshot(tmp.path(), "game_metadata"),
            Err(ScanError::NoDataFound { .. })
        ));
    }

    #[test]
    fn cache_refresh_picks_up_new_files() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("top100_games_20250301.json"), b"[]").unwrap();

        let cache = LatestFileCache::new(tmp.path(), "top100_games", Duration::from_secs(3600));
        let first = cache.get().unwrap();
        assert_eq!(first.file_name().unwrap(), "top100_games_20250301.json");

        fs::write(tmp.path().join("top100_games_20250302.json"), b"[]").unwrap();
        cache.refresh();
        let second = cache.get().unwrap();
        assert_eq!(second.file_name().unwrap(), "top100_games_20250302.json");
    }

    #[test]
    fn zero_ttl_always_re_resolves() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("top100_games_20250301.json"), b"[]").unwrap();

        let cache = LatestFileCache::new(tmp.path(), "top100_games", Duration::ZERO);
        assert_eq!(
            cache.get().unwrap().file_name().unwrap(),
            "top100_games_20250301.json"
        );
        fs::write(tmp.path().join("top100_games_20250305.json"), b"[]").unwrap();
        assert_eq!(
            cache.get().unwrap().file_name().unwrap(),
            "top100_games_20250305.json"
        );
    }
}
