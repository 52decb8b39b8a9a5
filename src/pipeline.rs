use std::path::{Path, PathBuf};

use crate::aggregate::{aggregate, convert_rows, extrema, flag_clamped};
use crate::domain::error::ConversionError;
use crate::domain::types::{AggregateResult, FrequencySeries, RangePolicy};
use crate::frequency_weightings::WeightingTable;
use crate::plot::{plot_average, plot_datasets, plot_extrema};
use crate::table_io::{load_average_table, load_dataset_table, write_averages, write_extrema};

/// Where a run writes its artifacts. `None` skips that artifact.
#[derive(Debug, Clone, Default)]
pub struct Outputs {
    pub table: Option<PathBuf>,
    pub chart: Option<PathBuf>,
}

/// Converts every dataset of a multi-dataset table, writes the per-frequency
/// averages and charts each dataset in dB.
pub fn run_datasets(
    input: &Path,
    delimiter: u8,
    policy: RangePolicy,
    outputs: &Outputs,
) -> Result<AggregateResult, ConversionError> {
    let table = load_dataset_table(input, delimiter)?;
    let converted = convert_rows(&table.frequencies, &table.rows, policy)?;
    let result = aggregate(&table.frequencies, &converted)?;

    if let (Some(path), Some(averages)) = (&outputs.table, &result.averages) {
        write_averages(path, &result.frequencies, averages)?;
    }
    if let Some(path) = &outputs.chart {
        plot_datasets(path, &result.frequencies, &converted)?;
    }
    Ok(result)
}

/// Highest and lowest dB per frequency across all datasets.
pub fn run_extrema(
    input: &Path,
    delimiter: u8,
    policy: RangePolicy,
    outputs: &Outputs,
) -> Result<AggregateResult, ConversionError> {
    let table = load_dataset_table(input, delimiter)?;
    let converted = convert_rows(&table.frequencies, &table.rows, policy)?;
    let (maxima, minima) = extrema(&table.frequencies, &converted)?;
    let frequencies = table.frequencies.frequencies();

    if let Some(path) = &outputs.table {
        write_extrema(path, &frequencies, &maxima, &minima)?;
    }
    if let Some(path) = &outputs.chart {
        plot_extrema(path, &frequencies, &maxima, &minima)?;
    }
    Ok(AggregateResult {
        frequencies,
        averages: None,
        maxima: Some(maxima),
        minima: Some(minima),
    })
}

/// Converts an already averaged dBA series, one level per frequency.
pub fn run_average(input: &Path, policy: RangePolicy, outputs: &Outputs) -> Result<AggregateResult, ConversionError> {
    let records = load_average_table(input)?;
    let series = FrequencySeries::new(records.iter().map(|r| r.frequency));
    let table = WeightingTable::a_weighting();
    flag_clamped(series.frequencies(), policy);
    let averages = records
        .iter()
        .map(|r| table.convert_with(r.average_dba, r.frequency, policy))
        .collect::<Result<Vec<f64>, _>>()?;
    let frequencies = series.frequencies();

    if let Some(path) = &outputs.table {
        write_averages(path, &frequencies, &averages)?;
    }
    if let Some(path) = &outputs.chart {
        plot_average(path, &frequencies, &averages)?;
    }
    Ok(AggregateResult {
        frequencies,
        averages: Some(averages),
        maxima: None,
        minima: None,
    })
}
