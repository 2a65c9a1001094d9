//! Game metadata documents and the analyses layered on them: genre and
//! category frequencies, and the current top-N overview joining the latest
//! ranking snapshot with the latest metadata capture.

use crate::locate::latest_snapshot;
use crate::normalize::CanonicalRecord;
use crate::rank::frequency;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// One entity's metadata document. Every field defaults so partial
/// documents still deserialize.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GameMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub header_image: String,
}

/// Metadata documents keyed by entity id.
pub type MetadataIndex = BTreeMap<String, GameMetadata>;

/// Load the most recent `<prefix>_*.json` metadata capture under `dir`.
pub fn load_latest_metadata(dir: &Path, prefix: &str) -> Result<MetadataIndex> {
    let path = latest_snapshot(dir, prefix)?;
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let index: MetadataIndex = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing metadata document {}", path.display()))?;
    info!(file = %path.display(), entities = index.len(), "loaded metadata");
    Ok(index)
}

/// Genre occurrence counts across all documents, descending.
pub fn genre_counts(index: &MetadataIndex) -> Vec<(String, usize)> {
    frequency(index.values().flat_map(|m| m.genres.iter().map(String::as_str)))
}

/// Category occurrence counts across all documents, descending.
pub fn category_counts(index: &MetadataIndex) -> Vec<(String, usize)> {
    frequency(
        index
            .values()
            .flat_map(|m| m.categories.iter().map(String::as_str)),
    )
}

/// One row of the current top-N overview table.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewRow {
    pub rank: Option<i64>,
    pub entity_id: String,
    pub name: String,
    pub current_players: f64,
    pub peak: Option<f64>,
    pub genres: Vec<String>,
    pub release_date: String,
}

/// Join a snapshot with the metadata index: entities sorted descending by
/// metric, restricted to those with a metadata document, top `n`.
pub fn top_overview(
    records: &[CanonicalRecord],
    index: &MetadataIndex,
    n: usize,
) -> Vec<OverviewRow> {
    let mut with_meta: Vec<&CanonicalRecord> = records
        .iter()
        .filter(|r| index.contains_key(&r.entity_id))
        .collect();
    with_meta.sort_by(|a, b| {
        let (a, b) = (a.metric.unwrap_or(0.0), b.metric.unwrap_or(0.0));
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
    with_meta.truncate(n);

    with_meta
        .into_iter()
        .map(|record| {
            let meta = &index[&record.entity_id];
            let name = if !meta.name.is_empty() {
                meta.name.clone()
            } else {
                record
                    .name
                    .clone()
                    .unwrap_or_else(|| record.entity_id.clone())
            };
            OverviewRow {
                rank: record.rank,
                entity_id: record.entity_id.clone(),
                name,
                current_players: record.metric.unwrap_or(0.0),
                peak: record.peak,
                genres: meta.genres.clone(),
                release_date: meta.release_date.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn meta(name: &str, genres: &[&str]) -> GameMetadata {
        GameMetadata {
            name: name.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ..GameMetadata::default()
        }
    }

    fn record(entity: &str, metric: Option<f64>) -> CanonicalRecord {
        CanonicalRecord {
            entity_id: entity.to_string(),
            metric,
            captured_at: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            name: None,
            tags: Vec::new(),
            rating: None,
            rank: None,
            peak: None,
        }
    }

    #[test]
    fn loads_the_latest_metadata_capture() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join("game_metadata_20250301_090000.json"),
            serde_json::to_vec(&json!({"1": {"name": "Old"}})).unwrap(),
        )
        .unwrap();
        fs::write(
            tmp.path().join("game_metadata_20250401_090000.json"),
            serde_json::to_vec(&json!({
                "730": {"name": "Counter-Strike 2", "genres": ["Action", "FPS"]},
                "570": {"name": "Dota 2", "genres": ["Action", "MOBA"], "price": 0.0}
            }))
            .unwrap(),
        )
        .unwrap();

        let index = load_latest_metadata(tmp.path(), "game_metadata").unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index["730"].name, "Counter-Strike 2");
        assert_eq!(index["570"].genres, vec!["Action", "MOBA"]);
    }

    #[test]
    fn genre_counts_flatten_across_documents() {
        let mut index = MetadataIndex::new();
        index.insert("1".into(), meta("A", &["Action", "FPS"]));
        index.insert("2".into(), meta("B", &["Action", "MOBA"]));
        assert_eq!(
            genre_counts(&index),
            vec![
                ("Action".to_string(), 2),
                ("FPS".to_string(), 1),
                ("MOBA".to_string(), 1),
            ]
        );
        assert!(category_counts(&index).is_empty());
    }

    #[test]
    fn overview_sorts_by_metric_and_requires_metadata() {
        let mut index = MetadataIndex::new();
        index.insert("1".into(), meta("Alpha", &["Action"]));
        index.insert("2".into(), meta("Beta", &[]));

        let records = vec![
            record("1", Some(100.0)),
            record("2", Some(900.0)),
            record("3", Some(9_999.0)), // no metadata; filtered out
        ];
        let rows = top_overview(&records, &index, 10);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(rows[0].current_players, 900.0);
    }

    #[test]
    fn overview_falls_back_to_record_name_then_id() {
        let mut index = MetadataIndex::new();
        index.insert("9".into(), GameMetadata::default());
        let rows = top_overview(&[record("9", Some(1.0))], &index, 1);
        assert_eq!(rows[0].name, "9");
    }
}
