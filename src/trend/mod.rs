//! Daily trend assembly: collapse intra-day snapshots to day means, span a
//! dense date axis, and fill the gaps so charts never break.

use crate::normalize::CanonicalRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// One entity's interpolated values, aligned with the matrix date axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendColumn {
    pub entity_id: String,
    pub values: Vec<f64>,
}

/// Dense date-by-entity table of interpolated metric values.
///
/// The date axis is daily-continuous between the first and last observed
/// day; columns appear in first-observation order. An empty matrix is the
/// normal "no trend" state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendMatrix {
    dates: Vec<NaiveDate>,
    columns: Vec<TrendColumn>,
}

impl TrendMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[TrendColumn] {
        &self.columns
    }

    pub fn column(&self, entity_id: &str) -> Option<&TrendColumn> {
        self.columns.iter().find(|c| c.entity_id == entity_id)
    }

    /// Value for `entity_id` on `date`, if both lie in the matrix.
    pub fn value(&self, entity_id: &str, date: NaiveDate) -> Option<f64> {
        let idx = self.dates.iter().position(|d| *d == date)?;
        self.column(entity_id).map(|c| c.values[idx])
    }
}

/// Build the trend matrix from normalized records.
///
/// Metric values from the same (entity, day) average together; interior gaps
/// fill by linear interpolation between the nearest known neighbors; days
/// outside an entity's observed range hold the nearest known value so a
/// chart never shows a gap at either end of its lifetime. Entities with no
/// usable metric anywhere are excluded.
pub fn build_trend_matrix(records: &[CanonicalRecord]) -> TrendMatrix {
    // Per-entity day sums, keeping first-observation column order.
    let mut order: Vec<String> = Vec::new();
    let mut samples: HashMap<String, BTreeMap<NaiveDate, (f64, u32)>> = HashMap::new();
    for record in records {
        let metric = match record.metric {
            Some(m) => m,
            None => continue,
        };
        if !samples.contains_key(&record.entity_id) {
            order.push(record.entity_id.clone());
        }
        let slot = samples
            .entry(record.entity_id.clone())
            .or_default()
            .entry(record.captured_at)
            .or_insert((0.0, 0));
        slot.0 += metric;
        slot.1 += 1;
    }
    if samples.is_empty() {
        debug!("no records with a usable metric; trend matrix is empty");
        return TrendMatrix::default();
    }

    // Dense daily axis across every observation.
    let first = samples
        .values()
        .filter_map(|days| days.keys().next().copied())
        .min()
        .expect("samples is non-empty");
    let last = samples
        .values()
        .filter_map(|days| days.keys().next_back().copied())
        .max()
        .expect("samples is non-empty");
    let mut dates = Vec::new();
    let mut day = first;
    while day <= last {
        dates.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    let columns = order
        .into_iter()
        .map(|entity_id| {
            let means: BTreeMap<NaiveDate, f64> = samples[&entity_id]
                .iter()
                .map(|(d, (sum, count))| (*d, sum / f64::from(*count)))
                .collect();
            let values = interpolate_daily(&dates, &means);
            TrendColumn { entity_id, values }
        })
        .collect();

    TrendMatrix { dates, columns }
}

/// Fill one column along the axis: exact day means where observed, linear
/// interpolation between neighbors, nearest value held at the boundaries.
fn interpolate_daily(axis: &[NaiveDate], known: &BTreeMap<NaiveDate, f64>) -> Vec<f64> {
    axis.iter()
        .map(|day| {
            if let Some(v) = known.get(day) {
                return *v;
            }
            let before = known.range(..*day).next_back();
            let after = known.range(*day..).next();
            match (before, after) {
                (Some((d0, v0)), Some((d1, v1))) => {
                    let span = (*d1 - *d0).num_days() as f64;
                    let offset = (*day - *d0).num_days() as f64;
                    v0 + (v1 - v0) * offset / span
                }
                (Some((_, v)), None) | (None, Some((_, v))) => *v,
                // A column only exists with at least one sample.
                (None, None) => 0.0,
            }
        })
        .collect()
}
