use std::collections::BTreeSet;

use super::model::{Dimension, Observation};

// ---------------------------------------------------------------------------
// Filter predicates
// ---------------------------------------------------------------------------

/// Conjunctive row predicates.
///
/// Each categorical set is a membership test on that column; an empty set
/// means "no filter" for the column (show all), never "match nothing".
/// Year bounds are inclusive and either may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicates {
    pub universities: BTreeSet<String>,
    pub degrees: BTreeSet<String>,
    pub schools: BTreeSet<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = match dimension {
            Dimension::University => &mut self.universities,
            Dimension::Degree => &mut self.degrees,
            Dimension::School => &mut self.schools,
        };
        set.extend(values.into_iter().map(|v| v.as_ref().trim().to_string()));
        self
    }

    pub fn with_years(mut self, min_year: Option<i32>, max_year: Option<i32>) -> Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    /// Whether a single row passes every predicate.
    pub fn matches(&self, obs: &Observation) -> bool {
        fn member(set: &BTreeSet<String>, value: &str) -> bool {
            set.is_empty() || set.contains(value)
        }

        member(&self.universities, &obs.university)
            && member(&self.degrees, &obs.degree)
            && member(&self.schools, &obs.school)
            && self.min_year.map_or(true, |min| obs.year >= min)
            && self.max_year.map_or(true, |max| obs.year <= max)
    }
}

/// Return the rows that pass all predicates, in store order.
///
/// An empty result is not an error; callers decide whether it means "no data".
pub fn filter<'a>(rows: &'a [Observation], predicates: &Predicates) -> Vec<&'a Observation> {
    rows.iter().filter(|obs| predicates.matches(obs)).collect()
}
