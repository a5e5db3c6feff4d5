//! Trend forecasting for per-group yearly series.
//!
//! The [`Forecaster`] extends each group's observed history past its last
//! observed year. The fitting algorithm sits behind [`TrendModel`] so it can
//! be swapped through configuration without touching the pipeline.

mod holt;
mod linear;

use std::collections::BTreeMap;
use std::fmt::Display;
use std::ops::RangeInclusive;

use chrono::Datelike;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::aggregate::{Sample, aggregate};
use crate::data::model::{Metric, MetricValues};

pub use holt::HoltTrend;
pub use linear::LinearTrend;

/// Result type alias for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while fitting or applying a trend model.
///
/// None of these abort a query: the affected (group, metric) series is left
/// without forecast points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Too few distinct years to fit a trend.
    #[error("Insufficient history: need at least {required} distinct years, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// The model could not be fitted or produced unusable output.
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// Model has not been fitted yet.
    #[error("Model must be fitted before prediction")]
    NotFitted,

    /// Invalid model parameter.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Fit-predict interface for a single yearly series.
///
/// `points` are `(year, value)` pairs in strictly ascending year order with
/// finite values.
pub trait TrendModel {
    /// Fit the model to the observed points.
    fn fit(&mut self, points: &[(i32, f64)]) -> Result<()>;

    /// Predict one value per requested year.
    fn predict(&self, years: &[i32]) -> Result<Vec<f64>>;

    /// Whether [`fit`](TrendModel::fit) has succeeded.
    fn is_fitted(&self) -> bool;
}

/// Shared input validation for trend models.
pub(crate) fn check_points(points: &[(i32, f64)]) -> Result<()> {
    if points.len() < 2 {
        return Err(ForecastError::InsufficientHistory {
            required: 2,
            actual: points.len(),
        });
    }
    if points.windows(2).any(|w| w[0].0 >= w[1].0) {
        return Err(ForecastError::ModelFit(
            "years must be strictly ascending".to_string(),
        ));
    }
    if points.iter().any(|(_, y)| !y.is_finite()) {
        return Err(ForecastError::ModelFit(
            "history contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which trend model to fit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendModelKind {
    #[default]
    Linear,
    Holt { alpha: f64, beta: f64 },
}

impl TrendModelKind {
    /// A fresh, unfitted model.
    pub fn build(&self) -> Result<Box<dyn TrendModel>> {
        Ok(match *self {
            TrendModelKind::Linear => Box::new(LinearTrend::new()),
            TrendModelKind::Holt { alpha, beta } => Box::new(HoltTrend::new(alpha, beta)?),
        })
    }
}

/// How far forward a request may forecast.
///
/// The target is always the request's end year; the policy only caps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HorizonPolicy {
    /// No later than the current calendar year.
    #[default]
    CurrentYear,
    /// No later than a fixed year.
    Fixed { year: i32 },
    /// Up to the request's end year, uncapped.
    RequestEnd,
}

impl HorizonPolicy {
    pub fn horizon(&self, end_year: i32) -> i32 {
        match *self {
            HorizonPolicy::CurrentYear => end_year.min(chrono::Local::now().year()),
            HorizonPolicy::Fixed { year } => end_year.min(year),
            HorizonPolicy::RequestEnd => end_year,
        }
    }
}

// ---------------------------------------------------------------------------
// Forecaster
// ---------------------------------------------------------------------------

/// Extends observed group histories with trend forecasts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forecaster {
    model: TrendModelKind,
}

impl Forecaster {
    pub fn new(model: TrendModelKind) -> Self {
        Self { model }
    }

    /// Forecast rows for one group.
    ///
    /// `history` is the group's per-year aggregate built from observed data.
    /// Output years are the years of `window` strictly after the last
    /// observed year; each metric is fitted independently and the results are
    /// combined per year. Metrics that cannot be forecast are left missing.
    pub fn extend(
        &self,
        group: &str,
        history: &BTreeMap<i32, MetricValues>,
        metrics: &[Metric],
        window: RangeInclusive<i32>,
    ) -> Vec<(i32, MetricValues)> {
        let Some(first) = history
            .keys()
            .next_back()
            .and_then(|last_observed| last_observed.checked_add(1))
        else {
            return Vec::new();
        };
        let years: Vec<i32> = (first.max(*window.start())..=*window.end()).collect();
        if years.is_empty() {
            return Vec::new();
        }

        let mut rows: Vec<(i32, MetricValues)> =
            years.iter().map(|&y| (y, MetricValues::default())).collect();

        for &metric in metrics {
            let points: Vec<(i32, f64)> = history
                .iter()
                .filter_map(|(&year, values)| values.get(metric).map(|v| (year, v)))
                .collect();

            match self.forecast_metric(&points, &years) {
                Ok(predicted) => {
                    let (lo, hi) = metric.bounds();
                    for ((_, values), value) in rows.iter_mut().zip(predicted) {
                        values.set(metric, Some(value.clamp(lo, hi)));
                    }
                }
                Err(ForecastError::InsufficientHistory { actual, .. }) => {
                    debug!("forecast skipped for {group} / {metric}: {actual} observed year(s)");
                }
                Err(e) => {
                    warn!("forecast dropped for {group} / {metric}: {e}");
                }
            }
        }

        rows.retain(|(_, values)| !values.is_empty());
        rows
    }

    fn forecast_metric(&self, points: &[(i32, f64)], years: &[i32]) -> Result<Vec<f64>> {
        let mut model = self.model.build()?;
        model.fit(points)?;
        model.predict(years)
    }

    /// Forecast samples for every group in `observed`.
    ///
    /// `observed` must contain the full observed history of each group it
    /// mentions; the returned samples are tagged forecast and fall inside
    /// `window`.
    pub fn forecast_samples<K>(
        &self,
        observed: &[Sample<K>],
        metrics: &[Metric],
        window: RangeInclusive<i32>,
    ) -> Vec<Sample<K>>
    where
        K: Ord + Clone + Display,
    {
        let mut histories: BTreeMap<K, BTreeMap<i32, MetricValues>> = BTreeMap::new();
        for ((key, year), point) in aggregate(observed.to_vec()) {
            histories.entry(key).or_default().insert(year, point.values);
        }

        let mut samples = Vec::new();
        for (key, history) in &histories {
            let label = key.to_string();
            for (year, values) in self.extend(&label, history, metrics, window.clone()) {
                samples.push(Sample::forecast(key.clone(), year, values));
            }
        }
        debug!(
            "forecast {} point(s) across {} group(s) in {}..={}",
            samples.len(),
            histories.len(),
            window.start(),
            window.end()
        );
        samples
    }
}
