use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use serde_json::json;

use grad_insight::analytics::Analytics;
use grad_insight::config::AnalyticsConfig;
use grad_insight::data::loader::load_file;
use grad_insight::request::Request;

#[derive(Parser)]
#[command(name = "grad-insight")]
#[command(about = "Query graduate employment survey data", long_about = None)]
struct Cli {
    /// Observed survey data (CSV, JSON or Parquet)
    #[arg(long)]
    observed: PathBuf,

    /// Precomputed predictions, served instead of fitting trends
    #[arg(long)]
    predictions: Option<PathBuf>,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON request file; read from stdin when omitted
    #[arg(long)]
    request: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };

    let mut analytics = Analytics::new(Arc::new(load_file(&cli.observed)?), config);
    if let Some(path) = &cli.predictions {
        analytics = analytics.with_predictions(Arc::new(load_file(path)?));
    }

    let body = match &cli.request {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Cannot read request {}", path.display()))?,
        None => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .context("Cannot read request from stdin")?;
            body
        }
    };
    let request: Request = serde_json::from_str(&body).context("Invalid request")?;
    info!("executing {request:?}");

    match request.execute(&analytics) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!("query failed: {err}");
            let body = json!({ "error": { "kind": err.kind(), "message": err.to_string() } });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::from(2))
        }
    }
}
