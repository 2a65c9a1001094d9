//! Monthly aggregation for the new-releases snapshots: per-month record
//! groups, tag frequencies, and rating distributions.

use crate::normalize::CanonicalRecord;
use crate::rank::frequency;
use serde::Serialize;
use std::collections::BTreeMap;

/// How many tags the per-month summary keeps.
const TOP_TAG_COUNT: usize = 10;

/// Recognized month-name tokens with their month number and display label.
/// Unrecognized names pass through to the month key as their raw token.
const MONTHS: &[(&str, u32, &str)] = &[
    ("january", 1, "1월"),
    ("february", 2, "2월"),
    ("march", 3, "3월"),
    ("april", 4, "4월"),
    ("may", 5, "5월"),
    ("june", 6, "6월"),
    ("july", 7, "7월"),
    ("august", 8, "8월"),
    ("september", 9, "9월"),
    ("october", 10, "10월"),
    ("november", 11, "11월"),
    ("december", 12, "12월"),
];

/// Month number for a recognized month-name token.
pub fn month_number(month_name: &str) -> Option<u32> {
    let lower = month_name.to_ascii_lowercase();
    MONTHS
        .iter()
        .find(|(name, _, _)| *name == lower)
        .map(|(_, number, _)| *number)
}

/// Display key for a filename month token, e.g. `("march", 2025)` →
/// `"2025년 3월"`. Unrecognized names keep their literal token.
pub fn month_key(month_name: &str, year: i32) -> String {
    let lower = month_name.to_ascii_lowercase();
    match MONTHS.iter().find(|(name, _, _)| *name == lower) {
        Some((_, _, label)) => format!("{}년 {}", year, label),
        None => format!("{}년 {}", year, month_name),
    }
}

/// Records of one calendar month, concatenated in file-sort order.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGroup {
    pub month_key: String,
    pub records: Vec<CanonicalRecord>,
}

/// Per-month analysis product.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub month_key: String,
    pub total_games: usize,
    /// Ten most frequent tags, descending, ties in first-seen order.
    pub top_tags: Vec<(String, usize)>,
    /// Count per distinct rating label; records without a rating excluded.
    pub rating_distribution: BTreeMap<String, usize>,
    pub records: Vec<CanonicalRecord>,
}

fn group<'a>(groups: &'a [MonthGroup], month_key: &str) -> Option<&'a MonthGroup> {
    groups.iter().find(|g| g.month_key == month_key)
}

/// Summarize one month. A month with no data yields `None`, "no analysis",
/// not a failure.
pub fn summarize(groups: &[MonthGroup], key: &str) -> Option<MonthlySummary> {
    let group = group(groups, key)?;
    if group.records.is_empty() {
        return None;
    }

    let mut top_tags = frequency(
        group
            .records
            .iter()
            .flat_map(|r| r.tags.iter().map(String::as_str)),
    );
    top_tags.truncate(TOP_TAG_COUNT);

    let mut rating_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for rating in group.records.iter().filter_map(|r| r.rating.as_ref()) {
        *rating_distribution.entry(rating.clone()).or_insert(0) += 1;
    }

    Some(MonthlySummary {
        month_key: group.month_key.clone(),
        total_games: group.records.len(),
        top_tags,
        rating_distribution,
        records: group.records.clone(),
    })
}

/// Top `n` records of a month by ascending rank. Records without a rank
/// sort last via a sentinel instead of failing the sort.
pub fn top_by_rank(groups: &[MonthGroup], key: &str, n: usize) -> Vec<CanonicalRecord> {
    let mut records = match group(groups, key) {
        Some(g) => g.records.clone(),
        None => return Vec::new(),
    };
    records.sort_by_key(|r| r.rank.unwrap_or(i64::MAX));
    records.truncate(n);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(entity: &str, tags: &[&str], rating: Option<&str>, rank: Option<i64>) -> CanonicalRecord {
        CanonicalRecord {
            entity_id: entity.to_string(),
            metric: None,
            captured_at: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            name: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            rating: rating.map(str::to_string),
            rank,
            peak: None,
        }
    }

    fn march() -> MonthGroup {
        MonthGroup {
            month_key: "2025년 3월".to_string(),
            records: vec![
                record("1", &["Action", "RPG"], Some("Very Positive"), Some(2)),
                record("2", &["Action"], Some("Mixed"), None),
                record("3", &["RPG", "Action"], Some("Very Positive"), Some(1)),
            ],
        }
    }

    #[test]
    fn recognized_month_names_map_to_labels() {
        assert_eq!(month_key("march", 2025), "2025년 3월");
        assert_eq!(month_key("May", 2025), "2025년 5월");
        assert_eq!(month_key("december", 2024), "2024년 12월");
        assert_eq!(month_number("april"), Some(4));
    }

    #[test]
    fn unrecognized_month_names_pass_through_literally() {
        assert_eq!(month_key("brumaire", 2025), "2025년 brumaire");
        assert_eq!(month_number("brumaire"), None);
    }

    #[test]
    fn summary_counts_tags_and_ratings() {
        let groups = vec![march()];
        let summary = summarize(&groups, "2025년 3월").unwrap();

        assert_eq!(summary.total_games, 3);
        assert_eq!(
            summary.top_tags,
            vec![("Action".to_string(), 3), ("RPG".to_string(), 2)]
        );
        assert_eq!(summary.rating_distribution.get("Very Positive"), Some(&2));
        assert_eq!(summary.rating_distribution.get("Mixed"), Some(&1));
        assert_eq!(summary.records.len(), 3);
    }

    #[test]
    fn absent_month_yields_no_analysis() {
        let groups = vec![march()];
        assert!(summarize(&groups, "2025년 4월").is_none());
        assert!(summarize(&[], "2025년 3월").is_none());
    }

    #[test]
    fn top_by_rank_orders_unranked_records_last() {
        let groups = vec![march()];
        let top = top_by_rank(&groups, "2025년 3월", 10);
        let ids: Vec<&str> = top.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);

        let top_one = top_by_rank(&groups, "2025년 3월", 1);
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].entity_id, "3");
    }

    #[test]
    fn top_by_rank_of_absent_month_is_empty() {
        assert!(top_by_rank(&[march()], "1999년 1월", 5).is_empty());
    }
}
