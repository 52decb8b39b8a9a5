use std::fs;
use std::path::PathBuf;

use dba2db::pipeline::{run_average, run_datasets, run_extrema, Outputs};
use dba2db::{ConversionError, RangePolicy};
use tempfile::TempDir;

fn scratch(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn table_only(path: PathBuf) -> Outputs {
    Outputs {
        table: Some(path),
        chart: None,
    }
}

#[test]
fn datasets_run_writes_averages() {
    let dir = TempDir::new().unwrap();
    let input = scratch(&dir, "data.csv", "Hz;10;1000\nrun1;50;80\nrun2;40;90\n");
    let out = dir.path().join("average_db_per_frequency.csv");

    let result = run_datasets(&input, b';', RangePolicy::Clamp, &table_only(out.clone())).unwrap();
    let averages = result.averages.unwrap();
    assert!((averages[0] - 115.4).abs() < 1e-9);
    assert_eq!(averages[1], 85.0);
    assert_eq!(result.maxima.unwrap()[1], 90.0);
    assert_eq!(result.minima.unwrap()[1], 80.0);

    let written = fs::read_to_string(out).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("Frequency (Hz),Average dB"));
    assert_eq!(lines.nth(1), Some("1000,85.0"));
}

#[test]
fn extrema_run_writes_highest_and_lowest() {
    let dir = TempDir::new().unwrap();
    let input = scratch(&dir, "data.csv", "Hz;1000\nrun1;80\nrun2;90\nrun3;85\n");
    let out = dir.path().join("hi_lo.csv");

    let result = run_extrema(&input, b';', RangePolicy::Clamp, &table_only(out.clone())).unwrap();
    assert!(result.averages.is_none());
    assert_eq!(fs::read_to_string(out).unwrap(), "Frequency (Hz),Highest dB,Lowest dB\n1000,90.0,80.0\n");
}

#[test]
fn strict_policy_stops_the_run() {
    let dir = TempDir::new().unwrap();
    let input = scratch(&dir, "data.csv", "Hz;5;1000\nrun1;50;80\n");
    let out = dir.path().join("never.csv");

    let err = run_extrema(&input, b';', RangePolicy::Strict, &table_only(out.clone())).unwrap_err();
    assert!(matches!(err, ConversionError::OutOfRange { frequency, .. } if frequency == 5.0));
    assert!(!out.exists());
}

#[test]
fn mismatched_row_aborts_before_writing() {
    let dir = TempDir::new().unwrap();
    let input = scratch(
        &dir,
        "data.csv",
        "Hz;100;200;400;800;1600;3200\nrun1;50;51;52;53;54;55\nrun2;50;51;52;53;54\n",
    );
    let out = dir.path().join("never.csv");

    let err = run_datasets(&input, b';', RangePolicy::Clamp, &table_only(out.clone())).unwrap_err();
    match err {
        ConversionError::ShapeMismatch { dataset, expected, found } => {
            assert_eq!(dataset, "run2");
            assert_eq!((expected, found), (6, 5));
        }
        other => panic!("expected shape mismatch, got {:?}", other),
    }
    assert!(!out.exists());
}

#[test]
fn header_only_table_has_nothing_to_average() {
    let dir = TempDir::new().unwrap();
    let input = scratch(&dir, "data.csv", "Hz;125;250\n");
    let err = run_datasets(&input, b';', RangePolicy::Clamp, &Outputs::default()).unwrap_err();
    assert!(matches!(err, ConversionError::EmptyDataset { frequency } if frequency == 125.0));
}

#[test]
fn missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("data.csv");
    let err = run_datasets(&input, b';', RangePolicy::Clamp, &Outputs::default()).unwrap_err();
    assert!(matches!(err, ConversionError::MissingInput(_)));
    assert!(err.to_string().contains("not found"));
}

#[test]
fn average_run_converts_each_level() {
    let dir = TempDir::new().unwrap();
    let input = scratch(
        &dir,
        "average_dba_per_frequency.csv",
        "Frequency (Hz),Average dBA\n10,50\n1000,80\n1125,60\n",
    );
    let out = dir.path().join("average_db.csv");

    let result = run_average(&input, RangePolicy::Clamp, &table_only(out.clone())).unwrap();
    let averages = result.averages.unwrap();
    assert!((averages[0] - 120.4).abs() < 1e-9);
    assert_eq!(averages[1], 80.0);
    assert!((averages[2] - 59.7).abs() < 1e-9);
    assert!(fs::read_to_string(out).unwrap().starts_with("Frequency (Hz),Average dB\n"));
}

#[test]
fn non_finite_cells_stop_the_run_before_writing() {
    let dir = TempDir::new().unwrap();
    let input = scratch(&dir, "data.csv", "Hz;nan;1000\nrun1;50;NaN\nrun2;40;90\n");
    let out = dir.path().join("never.csv");

    let err = run_datasets(&input, b';', RangePolicy::Clamp, &table_only(out.clone())).unwrap_err();
    assert!(matches!(err, ConversionError::Parse { line: 1, column: 2, .. }));
    let err = run_extrema(&input, b';', RangePolicy::Clamp, &table_only(out.clone())).unwrap_err();
    assert!(matches!(err, ConversionError::Parse { .. }));
    assert!(!out.exists());

    let input = scratch(&dir, "cells.csv", "Hz;100;1000\nrun1;50;NaN\nrun2;40;90\n");
    let err = run_extrema(&input, b';', RangePolicy::Clamp, &table_only(out.clone())).unwrap_err();
    assert!(matches!(err, ConversionError::Parse { line: 2, column: 3, .. }));
    assert!(!out.exists());
}

#[test]
fn clamped_frequencies_still_convert() {
    let dir = TempDir::new().unwrap();
    let input = scratch(&dir, "data.csv", "Hz;5;1000\nrun1;50;80\n");
    let result = run_datasets(&input, b';', RangePolicy::Clamp, &Outputs::default()).unwrap();
    assert!((result.averages.unwrap()[0] - 120.4).abs() < 1e-9);
}
