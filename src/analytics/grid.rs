use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::aggregate::Aggregated;
use super::error::{QueryError, QueryResult};
use crate::data::model::{MetricValues, Provenance};

// ---------------------------------------------------------------------------
// YearRange
// ---------------------------------------------------------------------------

/// Validated, inclusive, non-empty year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> QueryResult<Self> {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Like [`YearRange::new`], additionally rejecting ranges longer than
    /// `max_span` years.
    pub fn bounded(start: i32, end: i32, max_span: usize) -> QueryResult<Self> {
        let range = Self::new(start, end)?;
        if range.len() > max_span {
            return Err(QueryError::RangeTooWide {
                start,
                end,
                max: max_span,
            });
        }
        Ok(range)
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        (i64::from(self.end) - i64::from(self.start)) as usize + 1
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years().contains(&year)
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// One (key, year) cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSlot {
    pub year: i32,
    pub values: MetricValues,
    pub provenance: Provenance,
}

impl GridSlot {
    fn empty(year: i32) -> Self {
        Self {
            year,
            values: MetricValues::default(),
            provenance: Provenance::Observed,
        }
    }
}

/// Dense key × year table. Every key owns exactly one slot per year of the
/// range, in ascending year order, whether or not anything was observed.
#[derive(Debug, Clone)]
pub struct Grid<K> {
    rows: Vec<(K, Vec<GridSlot>)>,
}

/// Build the empty grid for `keys` over `range`.
///
/// Key order is kept as given; a repeated key keeps its first position.
pub fn complete<K, I>(keys: I, range: YearRange) -> Grid<K>
where
    K: Ord + Clone,
    I: IntoIterator<Item = K>,
{
    let mut seen = BTreeSet::new();
    let rows = keys
        .into_iter()
        .filter(|k| seen.insert(k.clone()))
        .map(|k| (k, range.years().map(GridSlot::empty).collect()))
        .collect();
    Grid { rows }
}

impl<K: Ord + Clone> Grid<K> {
    /// Left-join aggregated points onto the grid on (key, year). Slots without
    /// a matching point keep "no observation"; points outside the grid are
    /// dropped.
    pub fn fill(&mut self, aggregated: &Aggregated<K>) {
        for (key, slots) in &mut self.rows {
            for slot in slots.iter_mut() {
                if let Some(point) = aggregated.get(&(key.clone(), slot.year)) {
                    slot.values = point.values;
                    slot.provenance = point.provenance;
                }
            }
        }
    }
}

impl<K> Grid<K> {
    pub fn rows(&self) -> &[(K, Vec<GridSlot>)] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<(K, Vec<GridSlot>)> {
        self.rows
    }
}
