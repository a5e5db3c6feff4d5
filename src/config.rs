//! Engine configuration.
//!
//! Read from a JSON file; every field is optional and falls back to its
//! default.
//!
//! ```json
//! {
//!   "top_n": 5,
//!   "max_dispersion_degrees": 7,
//!   "max_year_span": 100,
//!   "forecast": {
//!     "model": { "kind": "holt", "alpha": 0.6, "beta": 0.3 },
//!     "horizon": { "kind": "fixed", "year": 2025 }
//!   }
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use serde::{Deserialize, Serialize};

use crate::analytics::forecast::{HorizonPolicy, TrendModelKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Groups picked by the default selection of a salary comparison.
    pub top_n: usize,
    /// Upper limit on degrees in one dispersion request.
    pub max_dispersion_degrees: usize,
    /// Longest `start_year..=end_year` a series request may ask for.
    pub max_year_span: usize,
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub model: TrendModelKind,
    pub horizon: HorizonPolicy,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            max_dispersion_degrees: 7,
            max_year_span: 100,
            forecast: ForecastConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        if self.max_dispersion_degrees == 0 {
            bail!("max_dispersion_degrees must be at least 1");
        }
        if self.max_year_span == 0 {
            bail!("max_year_span must be at least 1");
        }
        self.forecast
            .model
            .build()
            .context("Invalid forecast model")?;
        Ok(())
    }
}
