//! Structured query results, shaped for JSON emission.
//!
//! Every series in a result carries one entry per requested year, so clients
//! can zip `years` with any value array unconditionally.

use serde::Serialize;

use super::grid::GridSlot;
use super::sanitize::Sanitize;
use crate::data::model::{Metric, Provenance};

/// Per-(university, degree) employment trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmploymentTrend {
    pub university: String,
    pub degree: String,
    pub years: Vec<i32>,
    pub overall_employment_rate: Vec<Option<f64>>,
    pub ft_perm_employment_rate: Vec<Option<f64>>,
    pub data_source: Vec<Provenance>,
}

/// Mean employment rates over the observed rows of the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmploymentSummary {
    pub overall_employment_rate: Option<f64>,
    pub full_time_employment_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmploymentSeries {
    pub years: Vec<i32>,
    pub forecast_enabled: bool,
    pub summary: EmploymentSummary,
    pub series: Vec<EmploymentTrend>,
}

/// Per-label salary trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryTrend {
    pub label: String,
    pub mean: Vec<Option<f64>>,
    pub median: Vec<Option<f64>>,
    pub data_source: Vec<Provenance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryComparison {
    pub group_by: super::GroupBy,
    pub years: Vec<i32>,
    pub labels: Vec<String>,
    pub series: Vec<SalaryTrend>,
    pub default_selection_used: bool,
}

/// Gross monthly salary spread for one (degree, university).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispersionItem {
    pub label: String,
    pub degree: String,
    pub university: String,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryDispersion {
    pub year: i32,
    pub series: Vec<DispersionItem>,
}

// -- builders --

pub(crate) fn column(slots: &[GridSlot], metric: Metric) -> Vec<Option<f64>> {
    slots.iter().map(|s| s.values.get(metric)).collect()
}

pub(crate) fn provenance(slots: &[GridSlot]) -> Vec<Provenance> {
    slots.iter().map(|s| s.provenance).collect()
}

// -- sanitizing --

impl Sanitize for EmploymentTrend {
    fn sanitize(&mut self) {
        self.overall_employment_rate.sanitize();
        self.ft_perm_employment_rate.sanitize();
    }
}

impl Sanitize for EmploymentSummary {
    fn sanitize(&mut self) {
        self.overall_employment_rate.sanitize();
        self.full_time_employment_rate.sanitize();
    }
}

impl Sanitize for EmploymentSeries {
    fn sanitize(&mut self) {
        self.summary.sanitize();
        self.series.sanitize();
    }
}

impl Sanitize for SalaryTrend {
    fn sanitize(&mut self) {
        self.mean.sanitize();
        self.median.sanitize();
    }
}

impl Sanitize for SalaryComparison {
    fn sanitize(&mut self) {
        self.series.sanitize();
    }
}

impl Sanitize for DispersionItem {
    fn sanitize(&mut self) {
        self.p25.sanitize();
        self.median.sanitize();
        self.p75.sanitize();
    }
}

impl Sanitize for SalaryDispersion {
    fn sanitize(&mut self) {
        self.series.sanitize();
    }
}
