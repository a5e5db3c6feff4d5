use std::collections::BTreeSet;

use super::aggregate::aggregate;
use super::error::{QueryError, QueryResult};
use super::grid::{self, YearRange};
use super::response::{self, EmploymentSeries, EmploymentSummary, EmploymentTrend};
use super::sanitize::Sanitize;
use super::{Analytics, SeriesKey, mean};
use crate::data::filter::{Predicates, filter};
use crate::data::model::{Dimension, Metric, Provenance, canonical_university};

const EMPLOYMENT_METRICS: [Metric; 2] = [Metric::EmploymentRateOverall, Metric::EmploymentRateFtPerm];

impl Analytics {
    /// Employment-rate trend per (university, degree) over `start_year..=end_year`.
    ///
    /// Every series spans the whole range. With `enable_forecast` the years
    /// after each pair's last observed year are extended by the trend model
    /// (or read from the precomputed table, when one is configured).
    pub fn employment_series(
        &self,
        universities: &[String],
        degrees: &[String],
        start_year: i32,
        end_year: i32,
        enable_forecast: bool,
    ) -> QueryResult<EmploymentSeries> {
        let range = YearRange::bounded(start_year, end_year, self.config.max_year_span)?;
        if universities.is_empty() {
            return Err(QueryError::MissingSelection("university"));
        }
        if degrees.is_empty() {
            return Err(QueryError::MissingSelection("degree"));
        }

        let predicates = Predicates::new()
            .with_members(
                Dimension::University,
                universities.iter().map(|u| canonical_university(u)),
            )
            .with_members(Dimension::Degree, degrees);

        let (store, precomputed) = self.source(enable_forecast);
        let history = filter(store.observations(), &predicates);
        let samples = self.samples(
            &history,
            SeriesKey::of,
            range,
            enable_forecast,
            precomputed,
            &EMPLOYMENT_METRICS,
        );
        if samples.is_empty() {
            return Err(QueryError::NoData);
        }

        let observed = || {
            samples
                .iter()
                .filter(|s| s.provenance == Provenance::Observed)
        };
        let summary = EmploymentSummary {
            overall_employment_rate: mean(
                observed().filter_map(|s| s.values.get(Metric::EmploymentRateOverall)),
            )
            .map(round2),
            full_time_employment_rate: mean(
                observed().filter_map(|s| s.values.get(Metric::EmploymentRateFtPerm)),
            )
            .map(round2),
        };

        let aggregated = aggregate(samples);
        let keys: BTreeSet<SeriesKey> = aggregated.keys().map(|(k, _)| k.clone()).collect();
        let mut grid = grid::complete(keys, range);
        grid.fill(&aggregated);

        let years: Vec<i32> = range.years().collect();
        let series = grid
            .into_rows()
            .into_iter()
            .map(|(key, slots)| EmploymentTrend {
                university: key.university,
                degree: key.degree,
                years: years.clone(),
                overall_employment_rate: response::column(&slots, Metric::EmploymentRateOverall),
                ft_perm_employment_rate: response::column(&slots, Metric::EmploymentRateFtPerm),
                data_source: response::provenance(&slots),
            })
            .collect();

        Ok(EmploymentSeries {
            years,
            forecast_enabled: enable_forecast,
            summary,
            series,
        }
        .sanitized())
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
