use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
use clap::Parser;
use parquet::arrow::ArrowWriter;

use grad_insight::data::model::Metric;

/// Write a synthetic graduate employment survey to Parquet.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Cli {
    #[arg(short, long, default_value = "sample_survey.parquet")]
    output: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 2013)]
    first_year: i64,

    #[arg(long, default_value_t = 2022)]
    last_year: i64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// (university, school, degree, base salary, base employment rate)
const PROGRAMMES: [(&str, &str, &str, f64, f64); 8] = [
    ("National University of Singapore", "School of Computing", "Computer Science", 5200.0, 93.0),
    ("National University of Singapore", "Faculty of Law", "Bachelor of Laws", 5600.0, 95.0),
    ("National University of Singapore", "Faculty of Arts and Social Sciences", "Bachelor of Arts", 3500.0, 82.0),
    ("Nanyang Technological University", "College of Engineering", "Computer Science", 5000.0, 92.0),
    ("Nanyang Technological University", "Nanyang Business School", "Accountancy", 3600.0, 94.0),
    ("Singapore Management University", "School of Law", "Bachelor of Laws", 5400.0, 93.0),
    ("Singapore Management University", "School of Economics", "Economics", 4300.0, 88.0),
    ("Singapore Institute of Technology", "Engineering", "Mechanical Engineering", 3700.0, 90.0),
];

struct Columns {
    university: Vec<String>,
    school: Vec<String>,
    degree: Vec<String>,
    year: Vec<i64>,
    metrics: Vec<Float64Builder>,
}

impl Columns {
    fn new() -> Self {
        Self {
            university: Vec::new(),
            school: Vec::new(),
            degree: Vec::new(),
            year: Vec::new(),
            metrics: Metric::ALL.iter().map(|_| Float64Builder::new()).collect(),
        }
    }

    fn len(&self) -> usize {
        self.year.len()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = SimpleRng::new(cli.seed);
    let mut cols = Columns::new();

    for &(university, school, degree, salary, rate) in &PROGRAMMES {
        for year in cli.first_year..=cli.last_year {
            // Surveys skip programmes in some years.
            if rng.chance(0.15) {
                continue;
            }
            let t = (year - cli.first_year) as f64;
            let median = salary * (1.0 + 0.03 * t) + rng.gauss(0.0, 120.0);
            let spread = median * 0.18;
            let overall = (rate + rng.gauss(0.0, 2.0)).clamp(0.0, 100.0);

            let values = [
                overall,
                (overall - 6.0 + rng.gauss(0.0, 2.0)).clamp(0.0, 100.0),
                median * 0.9 + rng.gauss(0.0, 60.0),
                median * 0.88,
                median * 1.04 + rng.gauss(0.0, 80.0),
                median,
                median - spread,
                median + spread,
            ];
            for (builder, value) in cols.metrics.iter_mut().zip(values) {
                // Individual cells go missing too.
                if rng.chance(0.05) {
                    builder.append_null();
                } else {
                    builder.append_value((value * 10.0).round() / 10.0);
                }
            }

            cols.university.push(university.to_string());
            cols.school.push(school.to_string());
            cols.degree.push(degree.to_string());
            cols.year.push(year);
        }
    }

    let mut fields = vec![
        Field::new("year", DataType::Int64, false),
        Field::new("university", DataType::Utf8, false),
        Field::new("school", DataType::Utf8, false),
        Field::new("degree", DataType::Utf8, false),
    ];
    fields.extend(
        Metric::ALL
            .iter()
            .map(|m| Field::new(m.column(), DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let rows = cols.len();
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.year)),
        Arc::new(StringArray::from(cols.university)),
        Arc::new(StringArray::from(cols.school)),
        Arc::new(StringArray::from(cols.degree)),
    ];
    arrays.extend(
        cols.metrics
            .iter_mut()
            .map(|b| Arc::new(b.finish()) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    print_batches(&[batch.slice(0, rows.min(5))]).context("Failed to print preview")?;
    println!("Wrote {rows} survey rows to {}", cli.output.display());
    Ok(())
}
