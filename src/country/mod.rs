//! Cross-country storefront statistics: per-country price and discount
//! summaries plus cross-country title popularity, from the latest
//! `country_stats` capture. Shares the normalizer's field-resolution
//! helpers with the ranking pipelines.

use crate::locate::latest_snapshot;
use crate::normalize::{coerce_number, coerce_string, RawRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// One country's captured storefront lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryStats {
    #[serde(default)]
    pub top_sellers: Vec<RawRecord>,
    #[serde(default)]
    pub specials: Vec<RawRecord>,
}

/// Captured stats keyed by country code.
pub type CountryIndex = BTreeMap<String, CountryStats>;

/// Load the most recent `<prefix>_*.json` country capture under `dir`.
pub fn load_latest_country_stats(dir: &Path, prefix: &str) -> Result<CountryIndex> {
    let path = latest_snapshot(dir, prefix)?;
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let index: CountryIndex = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing country stats {}", path.display()))?;
    info!(file = %path.display(), countries = index.len(), "loaded country stats");
    Ok(index)
}

/// Price and discount statistics for one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_discount: f64,
    pub max_discount: f64,
}

fn field_values(records: &[RawRecord], key: &str) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| r.get(key).and_then(coerce_number))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Per-country price/discount summaries, in country-code order.
pub fn summarize_countries(index: &CountryIndex) -> Vec<CountrySummary> {
    index
        .iter()
        .map(|(country, stats)| {
            let prices = field_values(&stats.top_sellers, "price");
            let discounts = field_values(&stats.specials, "discount");
            CountrySummary {
                country: country.clone(),
                avg_price: mean(&prices),
                min_price: min(&prices),
                max_price: max(&prices),
                avg_discount: mean(&discounts),
                max_discount: max(&discounts),
            }
        })
        .collect()
}

/// How many countries' top-seller lists each title appears on, descending.
pub fn title_popularity(index: &CountryIndex) -> Vec<(String, usize)> {
    crate::rank::frequency(index.values().flat_map(|stats| {
        stats
            .top_sellers
            .iter()
            .filter_map(|r| r.get("name").and_then(coerce_string))
    }))
}
