use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use grad_insight::data::loader::load_file;
use grad_insight::data::model::{Dimension, Metric, Provenance, YearBounds};

fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn csv_with_percent_signs_and_blanks() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "survey.csv",
        "year,university,school,degree,employment_rate_overall,gross_monthly_median\n\
         2019,National University of Singapore,School of Computing,Computer Science,97.4%,4500\n\
         2020,National University of Singapore,School of Computing,Computer Science,na,\n\
         2020, Nanyang Technological University ,,Accountancy,93.1,3400\n",
    );

    let store = load_file(&path).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.year_bounds(), Some(YearBounds { min: 2019, max: 2020 }));

    let rows = store.observations();
    assert_eq!(rows[0].metric(Metric::EmploymentRateOverall), Some(97.4));
    assert_eq!(rows[1].metric(Metric::EmploymentRateOverall), None);
    assert_eq!(rows[1].metric(Metric::GrossMonthlyMedian), None);
    assert_eq!(rows[2].university, "Nanyang Technological University");

    let schools: Vec<_> = store.distinct(Dimension::School).iter().cloned().collect();
    assert_eq!(schools, vec!["School of Computing"]);
}

#[test]
fn json_records_with_provenance() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "predictions.json",
        r#"[
            {"year": 2023, "university": "SMU", "degree": "Law",
             "gross_monthly_mean": 5800.5, "data_source": "forecast"},
            {"year": "2022", "university": "SMU", "degree": "Law",
             "gross_monthly_mean": "5600", "data_source": null}
        ]"#,
    );

    let store = load_file(&path).unwrap();
    let rows = store.observations();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].provenance, Provenance::Forecast);
    assert_eq!(rows[1].provenance, Provenance::Observed);
    assert_eq!(rows[1].year, 2022);
    assert_eq!(rows[1].metric(Metric::GrossMonthlyMean), Some(5600.0));
}

#[test]
fn parquet_with_mixed_column_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int64, false),
        Field::new("university", DataType::Utf8, false),
        Field::new("degree", DataType::Utf8, false),
        Field::new("employment_rate_ft_perm", DataType::Utf8, true),
        Field::new("gross_mthly_25_percentile", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![2018, 2019])),
        Arc::new(StringArray::from(vec!["NTU", "NTU"])),
        Arc::new(StringArray::from(vec!["Accountancy", "Accountancy"])),
        Arc::new(StringArray::from(vec![Some("88.0%"), None])),
        Arc::new(Float64Array::from(vec![Some(3000.0), Some(3100.0)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let store = load_file(&path).unwrap();
    let rows = store.observations();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].metric(Metric::EmploymentRateFtPerm), Some(88.0));
    assert_eq!(rows[1].metric(Metric::EmploymentRateFtPerm), None);
    assert_eq!(rows[1].metric(Metric::GrossMthly25Percentile), Some(3100.0));
}

#[test]
fn missing_required_column_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.csv", "year,degree\n2020,Law\n");
    let err = load_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("university"));
}

#[test]
fn bad_year_names_the_row() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.csv", "year,university,degree\n2020,NUS,Law\nabc,NUS,Law\n");
    assert!(load_file(&path).is_err());
}

#[test]
fn json_year_beyond_i32_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "huge.json",
        r#"[
            {"year": 3000000000, "university": "NUS", "degree": "Law"},
            {"year": 2020, "university": "NUS", "degree": "Law"}
        ]"#,
    );
    let err = load_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("out of range"));
}

#[test]
fn parquet_int64_year_beyond_i32_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("huge.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int64, false),
        Field::new("university", DataType::Utf8, false),
        Field::new("degree", DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![2020, 5_000_000_000])),
        Arc::new(StringArray::from(vec!["NUS", "NUS"])),
        Arc::new(StringArray::from(vec!["Law", "Law"])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    assert!(load_file(&path).is_err());
}

#[test]
fn unknown_extension_is_rejected() {
    assert!(load_file(Path::new("survey.xlsx")).is_err());
}
