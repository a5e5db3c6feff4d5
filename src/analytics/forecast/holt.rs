//! Holt's linear (double exponential) smoothing over irregular years.
//!
//! The survey skips years for some programmes, so the textbook recursion is
//! stretched by the gap `g` between consecutive observations:
//!
//! - `level_t = α * y_t + (1 - α) * (level + g * trend)`
//! - `trend_t = β * (level_t - level) / g + (1 - β) * trend`
//!
//! Forecasts continue the final level along the final trend.

use super::{ForecastError, Result, TrendModel, check_points};

/// Holt's linear trend model.
#[derive(Debug, Clone)]
pub struct HoltTrend {
    alpha: f64,
    beta: f64,
    level: f64,
    trend: f64,
    last_year: i32,
    fitted: bool,
}

impl HoltTrend {
    /// * `alpha` - level smoothing (0 < alpha < 1)
    /// * `beta` - trend smoothing (0 < beta < 1)
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta)] {
            if !(0.0 < value && value < 1.0) {
                return Err(ForecastError::InvalidParameter {
                    name: name.to_string(),
                    reason: "must be between 0 and 1 (exclusive)".to_string(),
                });
            }
        }
        Ok(Self {
            alpha,
            beta,
            level: 0.0,
            trend: 0.0,
            last_year: 0,
            fitted: false,
        })
    }

    pub fn trend(&self) -> f64 {
        self.trend
    }
}

impl TrendModel for HoltTrend {
    fn fit(&mut self, points: &[(i32, f64)]) -> Result<()> {
        check_points(points)?;

        let (t0, y0) = points[0];
        let (t1, y1) = points[1];
        let mut level = y0;
        let mut trend = (y1 - y0) / f64::from(t1 - t0);
        let mut prev_year = t0;

        for &(year, y) in &points[1..] {
            let gap = f64::from(year - prev_year);
            let projected = level + gap * trend;
            let new_level = self.alpha * y + (1.0 - self.alpha) * projected;
            trend = self.beta * (new_level - level) / gap + (1.0 - self.beta) * trend;
            level = new_level;
            prev_year = year;
        }

        if !(level.is_finite() && trend.is_finite()) {
            return Err(ForecastError::ModelFit(
                "smoothing diverged".to_string(),
            ));
        }

        self.level = level;
        self.trend = trend;
        self.last_year = prev_year;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, years: &[i32]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(ForecastError::NotFitted);
        }
        Ok(years
            .iter()
            .map(|&year| self.level + f64::from(year - self.last_year) * self.trend)
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}
