//! Ordinary least squares trend on the real year axis.
//!
//! Fits `y = intercept + slope * (year - mean_year)`. Using actual years rather
//! than the sample index means a gap in the survey (say 2015 then 2018) is a
//! three-year step, not a one-year one.

use super::{ForecastError, Result, TrendModel, check_points};

/// Linear trend model.
///
/// # Example
///
/// ```rust
/// use grad_insight::analytics::forecast::{LinearTrend, TrendModel};
///
/// let mut model = LinearTrend::new();
/// model.fit(&[(2018, 90.0), (2019, 91.0), (2020, 92.0)]).unwrap();
/// let next = model.predict(&[2021]).unwrap();
/// assert!((next[0] - 93.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinearTrend {
    intercept: f64,
    slope: f64,
    mean_year: f64,
    fitted: bool,
}

impl LinearTrend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change per year.
    pub fn slope(&self) -> f64 {
        self.slope
    }
}

impl TrendModel for LinearTrend {
    fn fit(&mut self, points: &[(i32, f64)]) -> Result<()> {
        check_points(points)?;

        let n = points.len() as f64;
        let mean_year = points.iter().map(|&(t, _)| t as f64).sum::<f64>() / n;
        let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n;

        let sxx: f64 = points
            .iter()
            .map(|&(t, _)| (t as f64 - mean_year).powi(2))
            .sum();
        let sxy: f64 = points
            .iter()
            .map(|&(t, y)| (t as f64 - mean_year) * (y - mean_y))
            .sum();

        if sxx.abs() < 1e-12 {
            return Err(ForecastError::ModelFit(
                "Singular design in trend regression".to_string(),
            ));
        }

        self.slope = sxy / sxx;
        self.intercept = mean_y;
        self.mean_year = mean_year;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, years: &[i32]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        years
            .iter()
            .map(|&year| {
                let value = self.intercept + self.slope * (year as f64 - self.mean_year);
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(ForecastError::ModelFit(format!(
                        "non-finite prediction for {year}"
                    )))
                }
            })
            .collect()
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}
