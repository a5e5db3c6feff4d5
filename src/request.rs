//! JSON request surface over [`Analytics`].
//!
//! A request is an object tagged by `"query"`:
//!
//! ```json
//! { "query": "salary_comparison", "group_by": "degree",
//!   "start_year": 2018, "end_year": 2023, "enable_forecast": true }
//! ```

use serde::{Deserialize, Serialize};

use crate::analytics::{
    Analytics, EmploymentSeries, QueryError, QueryResult, SalaryComparison, SalaryDispersion,
};
use crate::data::model::{Dimension, YearBounds};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Request {
    ListDistinct {
        dimension: Dimension,
    },
    DistinctPairs,
    YearBounds,
    EmploymentSeries {
        #[serde(default)]
        universities: Vec<String>,
        #[serde(default)]
        degrees: Vec<String>,
        start_year: i32,
        end_year: i32,
        #[serde(default)]
        enable_forecast: bool,
    },
    SalaryComparison {
        group_by: String,
        #[serde(default)]
        items: Vec<String>,
        start_year: i32,
        end_year: i32,
        #[serde(default)]
        enable_forecast: bool,
    },
    SalaryDispersion {
        #[serde(default)]
        universities: Vec<String>,
        #[serde(default)]
        degrees: Vec<String>,
        year: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pair {
    pub university: String,
    pub degree: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Values(Vec<String>),
    Pairs(Vec<Pair>),
    YearBounds(YearBounds),
    Employment(EmploymentSeries),
    Comparison(SalaryComparison),
    Dispersion(SalaryDispersion),
}

impl Request {
    pub fn execute(&self, analytics: &Analytics) -> QueryResult<Response> {
        Ok(match self {
            Request::ListDistinct { dimension } => {
                Response::Values(analytics.list_distinct(*dimension))
            }
            Request::DistinctPairs => Response::Pairs(
                analytics
                    .distinct_pairs()
                    .into_iter()
                    .map(|(university, degree)| Pair { university, degree })
                    .collect(),
            ),
            Request::YearBounds => {
                Response::YearBounds(analytics.year_bounds().ok_or(QueryError::NoData)?)
            }
            Request::EmploymentSeries {
                universities,
                degrees,
                start_year,
                end_year,
                enable_forecast,
            } => Response::Employment(analytics.employment_series(
                universities,
                degrees,
                *start_year,
                *end_year,
                *enable_forecast,
            )?),
            Request::SalaryComparison {
                group_by,
                items,
                start_year,
                end_year,
                enable_forecast,
            } => Response::Comparison(analytics.salary_comparison(
                group_by,
                items,
                *start_year,
                *end_year,
                *enable_forecast,
            )?),
            Request::SalaryDispersion {
                universities,
                degrees,
                year,
            } => Response::Dispersion(analytics.salary_dispersion(universities, degrees, *year)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::data::model::{Metric, Observation, RecordStore};

    fn analytics() -> Analytics {
        let rows = vec![
            Observation::new("NUS", "Law", "Faculty of Law", 2019)
                .with_metric(Metric::GrossMonthlyMedian, 5000.0),
            Observation::new("NTU", "Arts", "", 2021)
                .with_metric(Metric::GrossMonthlyMedian, 3500.0),
        ];
        Analytics::new(
            Arc::new(RecordStore::from_observations(rows)),
            AnalyticsConfig::default(),
        )
    }

    #[test]
    fn parses_tagged_requests() {
        let request: Request = serde_json::from_value(json!({
            "query": "employment_series",
            "universities": ["NUS"],
            "degrees": ["Law"],
            "start_year": 2019,
            "end_year": 2021
        }))
        .unwrap();
        assert_eq!(
            request,
            Request::EmploymentSeries {
                universities: vec!["NUS".into()],
                degrees: vec!["Law".into()],
                start_year: 2019,
                end_year: 2021,
                enable_forecast: false,
            }
        );
    }

    #[test]
    fn metadata_queries() {
        let a = analytics();
        let response = Request::ListDistinct { dimension: Dimension::School }
            .execute(&a)
            .unwrap();
        assert_eq!(serde_json::to_value(response).unwrap(), json!(["Faculty of Law"]));

        let response = Request::DistinctPairs.execute(&a).unwrap();
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!([
                { "university": "NTU", "degree": "Arts" },
                { "university": "NUS", "degree": "Law" }
            ])
        );

        let response = Request::YearBounds.execute(&a).unwrap();
        assert_eq!(serde_json::to_value(response).unwrap(), json!({ "min": 2019, "max": 2021 }));
    }

    #[test]
    fn query_errors_pass_through() {
        let request = Request::SalaryComparison {
            group_by: "faculty".into(),
            items: Vec::new(),
            start_year: 2019,
            end_year: 2021,
            enable_forecast: false,
        };
        assert_eq!(
            request.execute(&analytics()),
            Err(QueryError::InvalidGroupBy("faculty".into()))
        );
    }
}
