use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metric – the numeric columns of the survey
// ---------------------------------------------------------------------------

/// One numeric survey column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    EmploymentRateOverall,
    EmploymentRateFtPerm,
    BasicMonthlyMean,
    BasicMonthlyMedian,
    GrossMonthlyMean,
    GrossMonthlyMedian,
    GrossMthly25Percentile,
    GrossMthly75Percentile,
}

impl Metric {
    pub const COUNT: usize = 8;

    /// All metrics in column order.
    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::EmploymentRateOverall,
        Metric::EmploymentRateFtPerm,
        Metric::BasicMonthlyMean,
        Metric::BasicMonthlyMedian,
        Metric::GrossMonthlyMean,
        Metric::GrossMonthlyMedian,
        Metric::GrossMthly25Percentile,
        Metric::GrossMthly75Percentile,
    ];

    /// Column name as written in the survey files.
    pub fn column(self) -> &'static str {
        match self {
            Metric::EmploymentRateOverall => "employment_rate_overall",
            Metric::EmploymentRateFtPerm => "employment_rate_ft_perm",
            Metric::BasicMonthlyMean => "basic_monthly_mean",
            Metric::BasicMonthlyMedian => "basic_monthly_median",
            Metric::GrossMonthlyMean => "gross_monthly_mean",
            Metric::GrossMonthlyMedian => "gross_monthly_median",
            Metric::GrossMthly25Percentile => "gross_mthly_25_percentile",
            Metric::GrossMthly75Percentile => "gross_mthly_75_percentile",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Physical domain of the metric, used to clamp extrapolated values.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Metric::EmploymentRateOverall | Metric::EmploymentRateFtPerm => (0.0, 100.0),
            _ => (0.0, f64::INFINITY),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// MetricValues – one optional value per metric
// ---------------------------------------------------------------------------

/// Fixed-size record of the eight survey metrics. `None` is "missing".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricValues([Option<f64>; Metric::COUNT]);

impl MetricValues {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0[metric.index()]
    }

    /// Store a value. Non-finite input is recorded as missing.
    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        self.0[metric.index()] = value.filter(|v| v.is_finite());
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, Some(value));
        self
    }

    /// Whether every metric is missing.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Where a data point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    #[default]
    Observed,
    #[serde(alias = "predicted", alias = "prediction")]
    Forecast,
}

impl FromStr for Provenance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "observed" | "actual" => Ok(Provenance::Observed),
            "forecast" | "predicted" | "prediction" => Ok(Provenance::Forecast),
            other => Err(format!("unknown provenance '{other}'")),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Observed => f.write_str("observed"),
            Provenance::Forecast => f.write_str("forecast"),
        }
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the survey table
// ---------------------------------------------------------------------------

/// A single survey row. Categorical fields are trimmed on construction so
/// key equality is plain string equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub university: String,
    pub degree: String,
    pub school: String,
    pub year: i32,
    pub values: MetricValues,
    pub provenance: Provenance,
}

impl Observation {
    pub fn new(university: &str, degree: &str, school: &str, year: i32) -> Self {
        Self {
            university: university.trim().to_string(),
            degree: degree.trim().to_string(),
            school: school.trim().to_string(),
            year,
            values: MetricValues::default(),
            provenance: Provenance::Observed,
        }
    }

    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        self.values.set(metric, Some(value));
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.values.get(metric)
    }

    pub fn dimension(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::University => &self.university,
            Dimension::Degree => &self.degree,
            Dimension::School => &self.school,
        }
    }
}

/// Categorical column of the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    University,
    Degree,
    School,
}

// ---------------------------------------------------------------------------
// University aliases
// ---------------------------------------------------------------------------

const UNIVERSITY_ALIASES: [(&str, &str); 6] = [
    ("NUS", "National University of Singapore"),
    ("NTU", "Nanyang Technological University"),
    ("SMU", "Singapore Management University"),
    ("SIT", "Singapore Institute of Technology"),
    ("SUSS", "Singapore University of Social Sciences"),
    ("SUTD", "Singapore University of Technology and Design"),
];

/// Expand a well-known abbreviation to the university's full survey name.
/// Anything else is returned trimmed but otherwise untouched.
pub fn canonical_university(name: &str) -> String {
    let name = name.trim();
    UNIVERSITY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, full)| full.to_string())
        .unwrap_or_else(|| name.to_string())
}

// ---------------------------------------------------------------------------
// RecordStore – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Inclusive year span of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

/// The full parsed dataset with pre-computed column indices. Built once and
/// never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    observations: Vec<Observation>,
    universities: BTreeSet<String>,
    degrees: BTreeSet<String>,
    schools: BTreeSet<String>,
    pairs: BTreeSet<(String, String)>,
    year_bounds: Option<YearBounds>,
}

impl RecordStore {
    /// Build column indices from the loaded observations.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut universities = BTreeSet::new();
        let mut degrees = BTreeSet::new();
        let mut schools = BTreeSet::new();
        let mut pairs = BTreeSet::new();
        let mut year_bounds: Option<YearBounds> = None;

        for obs in &observations {
            universities.insert(obs.university.clone());
            degrees.insert(obs.degree.clone());
            if !obs.school.is_empty() {
                schools.insert(obs.school.clone());
            }
            pairs.insert((obs.university.clone(), obs.degree.clone()));
            year_bounds = Some(match year_bounds {
                Some(b) => YearBounds {
                    min: b.min.min(obs.year),
                    max: b.max.max(obs.year),
                },
                None => YearBounds {
                    min: obs.year,
                    max: obs.year,
                },
            });
        }

        RecordStore {
            observations,
            universities,
            degrees,
            schools,
            pairs,
            year_bounds,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Sorted distinct values of a categorical column.
    pub fn distinct(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::University => &self.universities,
            Dimension::Degree => &self.degrees,
            Dimension::School => &self.schools,
        }
    }

    /// Sorted distinct (university, degree) pairs.
    pub fn pairs(&self) -> &BTreeSet<(String, String)> {
        &self.pairs
    }

    /// `None` for an empty store.
    pub fn year_bounds(&self) -> Option<YearBounds> {
        self.year_bounds
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_trims_categorical_fields() {
        let obs = Observation::new("  National University of Singapore ", "Law\t", " ", 2020);
        assert_eq!(obs.university, "National University of Singapore");
        assert_eq!(obs.degree, "Law");
        assert_eq!(obs.school, "");
    }

    #[test]
    fn metric_values_reject_non_finite() {
        let mut values = MetricValues::default();
        values.set(Metric::GrossMonthlyMean, Some(f64::NAN));
        values.set(Metric::GrossMonthlyMedian, Some(f64::INFINITY));
        assert!(values.is_empty());

        let values = values.with(Metric::BasicMonthlyMean, 3500.0);
        assert_eq!(values.get(Metric::BasicMonthlyMean), Some(3500.0));
        assert!(!values.is_empty());
    }

    #[test]
    fn store_indexes_distinct_values_and_years() {
        let store = RecordStore::from_observations(vec![
            Observation::new("NTU", "Accountancy", "Business", 2015),
            Observation::new("NUS", "Law", "Law", 2019),
            Observation::new("NUS", "Accountancy", "Business", 2013),
        ]);

        let unis: Vec<_> = store.distinct(Dimension::University).iter().cloned().collect();
        assert_eq!(unis, vec!["NTU", "NUS"]);
        assert_eq!(store.distinct(Dimension::Degree).len(), 2);
        assert_eq!(store.pairs().len(), 3);
        assert_eq!(store.year_bounds(), Some(YearBounds { min: 2013, max: 2019 }));
    }

    #[test]
    fn empty_store_has_no_bounds() {
        let store = RecordStore::from_observations(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.year_bounds(), None);
    }

    #[test]
    fn aliases_expand_case_insensitively() {
        assert_eq!(canonical_university("nus"), "National University of Singapore");
        assert_eq!(canonical_university(" SUTD "), "Singapore University of Technology and Design");
        assert_eq!(canonical_university("Some College"), "Some College");
    }

    #[test]
    fn provenance_parses_legacy_labels() {
        assert_eq!("predicted".parse::<Provenance>(), Ok(Provenance::Forecast));
        assert_eq!("Observed".parse::<Provenance>(), Ok(Provenance::Observed));
        assert_eq!("".parse::<Provenance>(), Ok(Provenance::Observed));
        assert!("guess".parse::<Provenance>().is_err());
    }
}
