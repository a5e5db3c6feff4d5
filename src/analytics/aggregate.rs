use std::collections::BTreeMap;

use crate::data::model::{Metric, MetricValues, Observation, Provenance};

// ---------------------------------------------------------------------------
// Sample – one row entering the aggregator
// ---------------------------------------------------------------------------

/// A keyed row entering the aggregator. Observed store rows and forecast rows
/// both take this shape, so the aggregator never needs to know which is which.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<K> {
    pub key: K,
    pub year: i32,
    pub values: MetricValues,
    pub provenance: Provenance,
}

impl<K> Sample<K> {
    pub fn from_observation(key: K, obs: &Observation) -> Self {
        Self {
            key,
            year: obs.year,
            values: obs.values,
            provenance: obs.provenance,
        }
    }

    pub fn forecast(key: K, year: i32, values: MetricValues) -> Self {
        Self {
            key,
            year,
            values,
            provenance: Provenance::Forecast,
        }
    }
}

/// One collapsed (key, year) point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    pub values: MetricValues,
    pub provenance: Provenance,
}

/// Aggregated points keyed by (group key, year).
pub type Aggregated<K> = BTreeMap<(K, i32), Aggregate>;

#[derive(Default)]
struct Accumulator {
    sums: [f64; Metric::COUNT],
    counts: [usize; Metric::COUNT],
    provenance: Provenance,
}

impl Accumulator {
    fn add(&mut self, values: &MetricValues) {
        for (i, metric) in Metric::ALL.iter().enumerate() {
            if let Some(v) = values.get(*metric) {
                self.sums[i] += v;
                self.counts[i] += 1;
            }
        }
    }

    fn finish(self) -> Aggregate {
        let mut values = MetricValues::default();
        for (i, metric) in Metric::ALL.iter().enumerate() {
            if self.counts[i] > 0 {
                values.set(*metric, Some(self.sums[i] / self.counts[i] as f64));
            }
        }
        Aggregate {
            values,
            provenance: self.provenance,
        }
    }
}

/// Collapse samples sharing a (key, year) into one point per metric.
///
/// Each metric is the arithmetic mean of the non-missing values; if every
/// value is missing the aggregate is missing. Provenance is taken from the
/// first sample after a stable sort by year then key.
pub fn aggregate<K: Ord + Clone>(mut samples: Vec<Sample<K>>) -> Aggregated<K> {
    samples.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.key.cmp(&b.key)));

    let mut acc: BTreeMap<(K, i32), Accumulator> = BTreeMap::new();
    for sample in &samples {
        let slot = acc
            .entry((sample.key.clone(), sample.year))
            .or_insert_with(|| Accumulator {
                provenance: sample.provenance,
                ..Accumulator::default()
            });
        slot.add(&sample.values);
    }

    acc.into_iter().map(|(k, a)| (k, a.finish())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(key: &str, year: i32, median: Option<f64>) -> Sample<String> {
        let mut values = MetricValues::default();
        values.set(Metric::GrossMonthlyMedian, median);
        Sample {
            key: key.to_string(),
            year,
            values,
            provenance: Provenance::Observed,
        }
    }

    #[test]
    fn mean_ignores_missing_values() {
        let agg = aggregate(vec![
            sample("Law", 2020, Some(4000.0)),
            sample("Law", 2020, None),
            sample("Law", 2020, Some(5000.0)),
        ]);
        let point = agg[&("Law".to_string(), 2020)];
        assert_eq!(point.values.get(Metric::GrossMonthlyMedian), Some(4500.0));
    }

    #[test]
    fn all_missing_stays_missing() {
        let agg = aggregate(vec![sample("Law", 2020, None), sample("Law", 2020, None)]);
        let point = agg[&("Law".to_string(), 2020)];
        assert_eq!(point.values.get(Metric::GrossMonthlyMedian), None);
        assert_eq!(point.provenance, Provenance::Observed);
    }

    #[test]
    fn groups_are_kept_apart() {
        let agg = aggregate(vec![
            sample("Law", 2020, Some(4000.0)),
            sample("Law", 2021, Some(4200.0)),
            sample("Medicine", 2020, Some(6000.0)),
        ]);
        assert_eq!(agg.len(), 3);
        assert_eq!(
            agg[&("Medicine".to_string(), 2020)].values.get(Metric::GrossMonthlyMedian),
            Some(6000.0)
        );
    }

    #[test]
    fn provenance_comes_from_first_sample() {
        let forecast = Sample::forecast("Law".to_string(), 2024, MetricValues::default());
        let agg = aggregate(vec![forecast, sample("Law", 2024, Some(1.0))]);
        assert_eq!(agg[&("Law".to_string(), 2024)].provenance, Provenance::Forecast);
    }
}
