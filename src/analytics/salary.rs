use std::collections::BTreeSet;

use log::debug;

use super::aggregate::{Sample, aggregate};
use super::error::{QueryError, QueryResult};
use super::grid::{self, YearRange};
use super::response::{self, DispersionItem, SalaryComparison, SalaryDispersion, SalaryTrend};
use super::sanitize::Sanitize;
use super::select::select;
use super::{Analytics, GroupBy};
use crate::data::filter::{Predicates, filter};
use crate::data::model::{Dimension, Metric, canonical_university};

const SALARY_METRICS: [Metric; 2] = [Metric::GrossMonthlyMean, Metric::GrossMonthlyMedian];

impl Analytics {
    /// Gross monthly salary over time for one grouping dimension.
    ///
    /// Groups are either `explicit_items` or the configured top-N by median
    /// salary at the end of the range.
    pub fn salary_comparison(
        &self,
        group_by: &str,
        explicit_items: &[String],
        start_year: i32,
        end_year: i32,
        enable_forecast: bool,
    ) -> QueryResult<SalaryComparison> {
        let group_by: GroupBy = group_by.parse()?;
        let range = YearRange::bounded(start_year, end_year, self.config.max_year_span)?;

        let explicit: Vec<String> = explicit_items
            .iter()
            .map(|item| match group_by {
                GroupBy::University => canonical_university(item),
                GroupBy::Degree => item.trim().to_string(),
            })
            .filter(|item| !item.is_empty())
            .collect();

        let (store, precomputed) = self.source(enable_forecast);
        let history = filter(store.observations(), &Predicates::new());
        let samples = self.samples(
            &history,
            |obs| group_by.key(obs).to_string(),
            range,
            enable_forecast,
            precomputed,
            &SALARY_METRICS,
        );
        if samples.is_empty() {
            return Err(QueryError::NoData);
        }

        let aggregated = aggregate(samples);
        let selection = select(
            &aggregated,
            &explicit,
            range,
            Metric::GrossMonthlyMedian,
            self.config.top_n,
        );
        if selection.items.is_empty() {
            return Err(QueryError::NoData);
        }
        debug!(
            "salary comparison by {:?}: {} group(s), default selection {}",
            group_by,
            selection.items.len(),
            selection.default_selection_used
        );

        let mut grid = grid::complete(selection.items.iter().cloned(), range);
        grid.fill(&aggregated);

        let series = grid
            .into_rows()
            .into_iter()
            .map(|(label, slots)| SalaryTrend {
                mean: response::column(&slots, Metric::GrossMonthlyMean),
                median: response::column(&slots, Metric::GrossMonthlyMedian),
                data_source: response::provenance(&slots),
                label,
            })
            .collect();

        Ok(SalaryComparison {
            group_by,
            years: range.years().collect(),
            labels: selection.items,
            series,
            default_selection_used: selection.default_selection_used,
        }
        .sanitized())
    }

    /// Gross monthly salary spread (p25 / median / p75) for the chosen
    /// degrees in a single year. Reads observed data only.
    pub fn salary_dispersion(
        &self,
        universities: &[String],
        degrees: &[String],
        year: i32,
    ) -> QueryResult<SalaryDispersion> {
        let degrees: BTreeSet<String> = degrees
            .iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        if degrees.is_empty() {
            return Err(QueryError::MissingDegrees);
        }
        let max = self.config.max_dispersion_degrees;
        if degrees.len() > max {
            return Err(QueryError::TooManyDegrees {
                requested: degrees.len(),
                max,
            });
        }

        let predicates = Predicates::new()
            .with_members(
                Dimension::University,
                universities.iter().map(|u| canonical_university(u)),
            )
            .with_members(Dimension::Degree, degrees)
            .with_years(Some(year), Some(year));

        let rows = filter(self.observed.observations(), &predicates);
        if rows.is_empty() {
            return Err(QueryError::NoData);
        }

        let samples: Vec<Sample<(String, String)>> = rows
            .iter()
            .map(|&obs| Sample::from_observation((obs.degree.clone(), obs.university.clone()), obs))
            .collect();

        let series = aggregate(samples)
            .into_iter()
            .map(|(((degree, university), _), point)| DispersionItem {
                label: format!("{degree} ({university})"),
                p25: point.values.get(Metric::GrossMthly25Percentile),
                median: point.values.get(Metric::GrossMonthlyMedian),
                p75: point.values.get(Metric::GrossMthly75Percentile),
                degree,
                university,
            })
            .collect();

        Ok(SalaryDispersion { year, series }.sanitized())
    }
}
