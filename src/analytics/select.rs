use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::aggregate::Aggregated;
use super::grid::YearRange;
use crate::data::model::Metric;

/// Groups chosen for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub items: Vec<String>,
    /// `true` when `items` came from the top-N ranking rather than the caller.
    pub default_selection_used: bool,
}

/// Explicit selection vs. top-N default.
///
/// With a non-empty `explicit` list the caller's items are returned as given
/// (first occurrence wins on duplicates), present in the data or not.
/// Otherwise the groups are ranked by `metric` at the end of `range`; when no
/// group has a value at that year the mean across the whole range is used
/// instead. The sort is descending and stable over groups in label order, so
/// ties keep label order. Groups with no value at all are never picked.
pub fn select(
    aggregated: &Aggregated<String>,
    explicit: &[String],
    range: YearRange,
    metric: Metric,
    top_n: usize,
) -> Selection {
    if !explicit.is_empty() {
        let mut seen = BTreeSet::new();
        let items = explicit
            .iter()
            .filter(|item| seen.insert(item.as_str()))
            .cloned()
            .collect();
        return Selection {
            items,
            default_selection_used: false,
        };
    }

    let mut scores = snapshot_scores(aggregated, range.end(), metric);
    if scores.is_empty() {
        scores = range_scores(aggregated, range, metric);
    }

    // BTreeMap iteration is label order; sort_by is stable.
    let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(top_n);

    Selection {
        items: ranked.into_iter().map(|(label, _)| label).collect(),
        default_selection_used: true,
    }
}

fn snapshot_scores(aggregated: &Aggregated<String>, year: i32, metric: Metric) -> BTreeMap<String, f64> {
    aggregated
        .iter()
        .filter(|((_, y), _)| *y == year)
        .filter_map(|((label, _), point)| point.values.get(metric).map(|v| (label.clone(), v)))
        .collect()
}

fn range_scores(aggregated: &Aggregated<String>, range: YearRange, metric: Metric) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for ((label, year), point) in aggregated {
        if !range.contains(*year) {
            continue;
        }
        if let Some(v) = point.values.get(metric) {
            let entry = sums.entry(label.clone()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(label, (sum, n))| (label, sum / n as f64))
        .collect()
}
