use std::fs::{self, File};
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;

use crate::domain::error::ConversionError;
use crate::domain::types::{AverageDbRecord, AverageDbaRecord, DatasetRow, ExtremaRecord, FrequencySeries};

/// A frequency header plus one dBA row per dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetTable {
    pub frequencies: FrequencySeries,
    pub rows: Vec<DatasetRow>,
}

fn open_input(path: &Path) -> Result<File, ConversionError> {
    File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ConversionError::MissingInput(path.to_path_buf()),
        _ => ConversionError::Io(err),
    })
}

/// Loads a headerless, delimiter-separated table: the first row holds a label
/// cell followed by the frequencies, every following row a dataset label
/// followed by its dBA levels.
pub fn load_dataset_table(path: &Path, delimiter: u8) -> Result<DatasetTable, ConversionError> {
    let file = open_input(path)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let mut frequencies: Option<FrequencySeries> = None;
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        let values = parse_cells(&record, line)?;

        match &frequencies {
            None => {
                log::debug!("{}: header with {} frequencies", path.display(), values.len());
                frequencies = Some(FrequencySeries::new(values));
            }
            Some(series) => {
                let label = match record.get(0) {
                    Some(label) if !label.is_empty() => label.to_string(),
                    _ => format!("Dataset {}", rows.len() + 1),
                };
                let row = DatasetRow::new(label, values);
                series.check_row(&row)?;
                rows.push(row);
            }
        }
    }

    let frequencies = match frequencies {
        Some(series) if !series.is_empty() => series,
        _ => return Err(ConversionError::EmptyTable(path.to_path_buf())),
    };
    log::info!(
        "loaded {} dataset(s) over {} frequencies from {}",
        rows.len(),
        frequencies.len(),
        path.display()
    );
    Ok(DatasetTable { frequencies, rows })
}

// Every cell after the label, trailing blanks dropped. `nan` and `inf` are
// rejected like any other non-number.
fn parse_cells(record: &StringRecord, line: u64) -> Result<Vec<f64>, ConversionError> {
    let cells: Vec<&str> = record.iter().skip(1).collect();
    let used = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);

    cells[..used]
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ConversionError::Parse {
                line,
                column: i + 2,
                value: cell.to_string(),
            }),
        })
        .collect()
}

/// Loads the single-series layout with `Frequency (Hz)` and `Average dBA` columns.
pub fn load_average_table(path: &Path) -> Result<Vec<AverageDbaRecord>, ConversionError> {
    let file = open_input(path)?;
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let records = reader
        .deserialize()
        .collect::<Result<Vec<AverageDbaRecord>, csv::Error>>()?;
    if records.is_empty() {
        return Err(ConversionError::EmptyTable(path.to_path_buf()));
    }
    for (i, record) in records.iter().enumerate() {
        let cells = [record.frequency, record.average_dba];
        if let Some(column) = cells.iter().position(|v| !v.is_finite()) {
            return Err(ConversionError::Parse {
                line: i as u64 + 2,
                column: column + 1,
                value: cells[column].to_string(),
            });
        }
    }
    log::info!("loaded {} averaged level(s) from {}", records.len(), path.display());
    Ok(records)
}

pub fn write_averages(path: &Path, frequencies: &[f64], averages: &[f64]) -> Result<(), ConversionError> {
    let records = frequencies
        .iter()
        .zip(averages)
        .map(|(&frequency, &average_db)| AverageDbRecord { frequency, average_db });
    write_records(path, records)
}

pub fn write_extrema(path: &Path, frequencies: &[f64], maxima: &[f64], minima: &[f64]) -> Result<(), ConversionError> {
    let records = frequencies
        .iter()
        .zip(maxima.iter().zip(minima))
        .map(|(&frequency, (&highest_db, &lowest_db))| ExtremaRecord {
            frequency,
            highest_db,
            lowest_db,
        });
    write_records(path, records)
}

fn write_records<R: Serialize>(path: &Path, records: impl Iterator<Item = R>) -> Result<(), ConversionError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = WriterBuilder::new().from_path(path)?;
    let mut count = 0usize;
    for record in records {
        writer.serialize(record)?;
        count += 1;
    }
    writer.flush()?;
    log::info!("wrote {} row(s) to {}", count, path.display());
    Ok(())
}
