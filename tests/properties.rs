use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use grad_insight::analytics::aggregate::{Sample, aggregate};
use grad_insight::analytics::grid::{YearRange, complete};
use grad_insight::analytics::forecast::HorizonPolicy;
use grad_insight::analytics::sanitize::Sanitize;
use grad_insight::analytics::{Analytics, QueryError};
use grad_insight::config::AnalyticsConfig;
use grad_insight::data::model::{Metric, MetricValues, Observation, Provenance, RecordStore};

const DEGREES: [&str; 3] = ["Law", "Medicine", "Arts"];

fn rows() -> impl Strategy<Value = Vec<(usize, i32, Option<f64>)>> {
    prop::collection::vec(
        (0..DEGREES.len(), 2010..2020i32, prop::option::of(1000.0..9000.0f64)),
        0..40,
    )
}

fn maybe_nan() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        Just(Some(f64::NAN)),
        Just(Some(f64::INFINITY)),
        (-1.0e6..1.0e6f64).prop_map(Some),
    ]
}

proptest! {
    #[test]
    fn aggregate_is_the_mean_of_present_values(rows in rows()) {
        let samples: Vec<Sample<String>> = rows
            .iter()
            .map(|&(d, year, v)| {
                let mut values = MetricValues::default();
                values.set(Metric::GrossMonthlyMedian, v);
                Sample {
                    key: DEGREES[d].to_string(),
                    year,
                    values,
                    provenance: Provenance::Observed,
                }
            })
            .collect();

        let mut expected: BTreeMap<(String, i32), Vec<f64>> = BTreeMap::new();
        for &(d, year, v) in &rows {
            let entry = expected.entry((DEGREES[d].to_string(), year)).or_default();
            entry.extend(v);
        }

        let aggregated = aggregate(samples);
        prop_assert_eq!(aggregated.len(), expected.len());
        for (key, values) in expected {
            let got = aggregated[&key].values.get(Metric::GrossMonthlyMedian);
            if values.is_empty() {
                prop_assert_eq!(got, None);
            } else {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                prop_assert!((got.unwrap() - mean).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn grid_has_one_slot_per_key_and_year(
        keys in prop::collection::vec(0..DEGREES.len(), 0..6),
        start in 2000..2030i32,
        span in 0..12i32,
    ) {
        let range = YearRange::new(start, start + span).unwrap();
        let grid = complete(keys.iter().map(|&d| DEGREES[d].to_string()), range);
        for (_, slots) in grid.rows() {
            prop_assert_eq!(slots.len(), range.len());
            let years: Vec<i32> = slots.iter().map(|s| s.year).collect();
            prop_assert_eq!(years, range.years().collect::<Vec<_>>());
        }
    }

    #[test]
    fn employment_series_are_dense(rows in rows(), start in 2008..2016i32, span in 0..8i32) {
        let observations: Vec<Observation> = rows
            .iter()
            .map(|&(d, year, v)| {
                let mut obs = Observation::new("NUS", DEGREES[d], "", year);
                obs.values.set(Metric::EmploymentRateOverall, v.map(|v| v / 100.0));
                obs
            })
            .collect();
        let mut config = AnalyticsConfig::default();
        config.forecast.horizon = HorizonPolicy::RequestEnd;
        let analytics = Analytics::new(Arc::new(RecordStore::from_observations(observations)), config);
        let degrees: Vec<String> = DEGREES.iter().map(|d| d.to_string()).collect();

        match analytics.employment_series(&["NUS".to_string()], &degrees, start, start + span, true) {
            Ok(result) => {
                prop_assert_eq!(result.years.len(), span as usize + 1);
                for series in &result.series {
                    prop_assert_eq!(series.overall_employment_rate.len(), result.years.len());
                    prop_assert_eq!(series.data_source.len(), result.years.len());
                    prop_assert!(series
                        .overall_employment_rate
                        .iter()
                        .flatten()
                        .all(|v| (0.0..=100.0).contains(v)));
                }
            }
            Err(e) => prop_assert_eq!(e, QueryError::NoData),
        }
    }

    #[test]
    fn employment_values_are_means_of_store_rows(
        rows in prop::collection::vec(
            (0..DEGREES.len(), 2010..2020i32, prop::option::of(0.0..100.0f64)),
            1..40,
        ),
        start in 2008..2016i32,
        span in 0..8i32,
    ) {
        let observations: Vec<Observation> = rows
            .iter()
            .map(|&(d, year, v)| {
                let mut obs = Observation::new("NUS", DEGREES[d], "", year);
                obs.values.set(Metric::EmploymentRateOverall, v);
                obs
            })
            .collect();
        let analytics = Analytics::new(
            Arc::new(RecordStore::from_observations(observations.clone())),
            AnalyticsConfig::default(),
        );
        let degrees: Vec<String> = DEGREES.iter().map(|d| d.to_string()).collect();

        match analytics.employment_series(&["NUS".to_string()], &degrees, start, start + span, false) {
            Ok(result) => {
                for series in &result.series {
                    for (i, &year) in series.years.iter().enumerate() {
                        let present: Vec<f64> = observations
                            .iter()
                            .filter(|o| o.degree == series.degree && o.year == year)
                            .filter_map(|o| o.metric(Metric::EmploymentRateOverall))
                            .collect();
                        let got = series.overall_employment_rate[i];
                        if present.is_empty() {
                            prop_assert_eq!(got, None);
                        } else {
                            let mean = present.iter().sum::<f64>() / present.len() as f64;
                            prop_assert!((got.unwrap() - mean).abs() < 1e-6);
                        }
                        prop_assert_eq!(series.data_source[i], Provenance::Observed);
                    }
                }
            }
            Err(e) => {
                prop_assert_eq!(e, QueryError::NoData);
                prop_assert!(observations
                    .iter()
                    .all(|o| o.year < start || o.year > start + span));
            }
        }
    }

    #[test]
    fn sanitizing_is_idempotent(values in prop::collection::vec(maybe_nan(), 0..20)) {
        let once = values.sanitized();
        prop_assert!(once.iter().flatten().all(|v| v.is_finite()));
        let twice = once.clone().sanitized();
        prop_assert_eq!(once, twice);
    }
}
