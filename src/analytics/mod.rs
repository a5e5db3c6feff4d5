//! Query engine over an immutable [`RecordStore`].
//!
//! ```text
//!  RecordStore ──filter──▶ history rows ──▶ samples ─┬─────────────────────┐
//!                                                    │                     │
//!                                          (forecast on, no precomputed)   │
//!                                                    ▼                     │
//!                                              Forecaster ──▶ forecast ───┤
//!                                                                          ▼
//!                      response ◀── sanitize ◀── grid.fill ◀── aggregate ◀─┘
//!                                                   ▲
//!                                     keys (all, or Selector) × years
//! ```

pub mod aggregate;
mod employment;
pub mod error;
pub mod forecast;
pub mod grid;
pub mod response;
mod salary;
pub mod sanitize;
pub mod select;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::data::model::{Dimension, Metric, Observation, RecordStore, YearBounds};
use aggregate::Sample;
use forecast::Forecaster;
use grid::YearRange;

pub use error::{ErrorKind, QueryError, QueryResult};
pub use response::{
    DispersionItem, EmploymentSeries, EmploymentSummary, EmploymentTrend, SalaryComparison,
    SalaryDispersion, SalaryTrend,
};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// (university, degree) selection key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub university: String,
    pub degree: String,
}

impl SeriesKey {
    pub fn of(obs: &Observation) -> Self {
        Self {
            university: obs.university.clone(),
            degree: obs.degree.clone(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.university, self.degree)
    }
}

/// Single-dimension grouping for comparison views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    University,
    Degree,
}

impl GroupBy {
    pub fn dimension(self) -> Dimension {
        match self {
            GroupBy::University => Dimension::University,
            GroupBy::Degree => Dimension::Degree,
        }
    }

    /// The grouping value of a row.
    pub fn key(self, obs: &Observation) -> &str {
        obs.dimension(self.dimension())
    }
}

impl FromStr for GroupBy {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "university" | "universities" => Ok(GroupBy::University),
            "degree" | "degrees" => Ok(GroupBy::Degree),
            _ => Err(QueryError::InvalidGroupBy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// The query engine.
///
/// Holds the observed store, an optional precomputed predictions store and
/// the configuration. It keeps no per-request state, so one instance can
/// serve any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Analytics {
    observed: Arc<RecordStore>,
    predictions: Option<Arc<RecordStore>>,
    config: AnalyticsConfig,
    forecaster: Forecaster,
}

impl Analytics {
    pub fn new(observed: Arc<RecordStore>, config: AnalyticsConfig) -> Self {
        let forecaster = Forecaster::new(config.forecast.model);
        Self {
            observed,
            predictions: None,
            config,
            forecaster,
        }
    }

    /// Serve forecast requests from a precomputed table instead of fitting
    /// trends per request.
    pub fn with_predictions(mut self, predictions: Arc<RecordStore>) -> Self {
        self.predictions = Some(predictions);
        self
    }

    /// Sorted distinct values of a categorical column.
    pub fn list_distinct(&self, dimension: Dimension) -> Vec<String> {
        self.observed.distinct(dimension).iter().cloned().collect()
    }

    /// Sorted distinct (university, degree) pairs.
    pub fn distinct_pairs(&self) -> Vec<(String, String)> {
        self.observed.pairs().iter().cloned().collect()
    }

    pub fn year_bounds(&self) -> Option<YearBounds> {
        self.observed.year_bounds()
    }

    /// The store a request reads from, and whether its forecast rows are
    /// already in it.
    fn source(&self, enable_forecast: bool) -> (&RecordStore, bool) {
        match (&self.predictions, enable_forecast) {
            (Some(pred), true) => (pred.as_ref(), true),
            _ => (self.observed.as_ref(), false),
        }
    }

    /// Turn filtered history rows into in-range samples, adding forecast
    /// samples when asked to.
    ///
    /// `history` must hold every matching row regardless of year: the
    /// forecaster fits on the full history and "last observed year" is
    /// measured against it.
    fn samples<K, F>(
        &self,
        history: &[&Observation],
        key_of: F,
        range: YearRange,
        enable_forecast: bool,
        precomputed: bool,
        metrics: &[Metric],
    ) -> Vec<Sample<K>>
    where
        K: Ord + Clone + fmt::Display,
        F: Fn(&Observation) -> K,
    {
        let mut samples: Vec<Sample<K>> = history
            .iter()
            .map(|&obs| Sample::from_observation(key_of(obs), obs))
            .collect();

        if enable_forecast && !precomputed {
            let window = range.start()..=self.config.forecast.horizon.horizon(range.end());
            let forecast = self.forecaster.forecast_samples(&samples, metrics, window);
            samples.extend(forecast);
        }

        samples.retain(|s| range.contains(s.year));
        debug!(
            "{} sample(s) in {}..={} from {} history row(s)",
            samples.len(),
            range.start(),
            range.end(),
            history.len()
        );
        samples
    }
}

/// Arithmetic mean, `None` for an empty input.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
