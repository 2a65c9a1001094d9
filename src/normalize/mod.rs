//! Schema normalization for heterogeneous snapshot records.
//!
//! Snapshot generations disagree on field names (realtime captures carry
//! `current_players` and `peak_in_game`, monthly charts carry `avg_players`
//! and `peak_players`, storefront captures identify entities by `id` instead
//! of `appid`). Each concept resolves through an ordered candidate-key table
//! rather than branching at call sites, and normalization is pure and total:
//! it never fails on a record shape it does not recognize.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

/// One record as it appears in a raw snapshot file.
pub type RawRecord = Map<String, Value>;

/// Candidate keys for the entity identifier, in priority order.
pub const ID_KEYS: &[&str] = &["appid", "id"];
/// Candidate keys for the popularity metric, in priority order.
pub const METRIC_KEYS: &[&str] = &["current_players", "avg_players"];
/// Candidate keys for the peak metric, in priority order.
pub const PEAK_KEYS: &[&str] = &["peak_in_game", "peak_players"];

/// The normalized, schema-agnostic form of one entity observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    /// Always a string; numeric identifiers are coerced so `730` and
    /// `"730"` count as the same entity.
    pub entity_id: String,
    /// Popularity metric. Records without one are excluded from trend
    /// building but still count toward appearance rankings.
    pub metric: Option<f64>,
    pub captured_at: NaiveDate,
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub rating: Option<String>,
    pub rank: Option<i64>,
    pub peak: Option<f64>,
}

/// First candidate key present in `raw`, with its value.
pub fn resolve_field<'a>(raw: &'a RawRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| raw.get(*key))
}

/// String coercion: strings pass through, numbers render to their literal.
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric coercion: JSON numbers pass through, numeric strings parse after
/// stripping comma thousands separators.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn coerce_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(coerce_string).collect(),
        Some(Value::String(s)) => s.split(',').map(|tag| tag.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Map a raw record onto the canonical shape, stamping it with the capture
/// date of the file it came from. Returns `None` only when no candidate
/// identifier field is present; nothing downstream can use such a record.
pub fn normalize(raw: &RawRecord, captured_at: NaiveDate) -> Option<CanonicalRecord> {
    let entity_id = resolve_field(raw, ID_KEYS).and_then(coerce_string)?;
    Some(CanonicalRecord {
        entity_id,
        metric: resolve_field(raw, METRIC_KEYS).and_then(coerce_number),
        captured_at,
        name: raw.get("name").and_then(coerce_string),
        tags: coerce_tags(raw.get("tags")),
        rating: raw.get("rating").and_then(coerce_string),
        rank: raw.get("rank").and_then(Value::as_i64),
        peak: resolve_field(raw, PEAK_KEYS).and_then(coerce_number),
    })
}
