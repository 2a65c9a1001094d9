//! Appearance counting: the consistency ranking and the shared frequency
//! core behind tag, genre, and category tables.

use crate::normalize::CanonicalRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Occurrence counts in descending order. The sort is stable, so entries
/// with equal counts keep their first-seen order.
pub fn frequency<I, S>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        let item = item.into();
        let slot = counts.entry(item.clone()).or_insert(0);
        if *slot == 0 {
            order.push(item);
        }
        *slot += 1;
    }
    let mut table: Vec<(String, usize)> = order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            (key, count)
        })
        .collect();
    table.sort_by(|a, b| b.1.cmp(&a.1));
    table
}

/// One entry of the consistency ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntity {
    pub entity_id: String,
    pub appearances: usize,
}

/// Rank entities by how often they appear across the concatenated history.
///
/// Every snapshot occurrence counts: a day covered by two source files
/// contributes two counts (appearance count is occurrence count, not
/// distinct-day count). If `top_n` exceeds the number of
/// distinct entities, all of them are returned.
pub fn rank_by_appearances(records: &[CanonicalRecord], top_n: usize) -> Vec<RankedEntity> {
    let mut ranked: Vec<RankedEntity> =
        frequency(records.iter().map(|r| r.entity_id.as_str()))
            .into_iter()
            .map(|(entity_id, appearances)| RankedEntity {
                entity_id,
                appearances,
            })
            .collect();
    ranked.truncate(top_n);
    ranked
}
