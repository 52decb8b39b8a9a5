use crate::domain::error::ConversionError;
use crate::domain::types::{AggregateResult, ConvertedMeasurement, DatasetRow, FrequencySeries, RangePolicy};
use crate::frequency_weightings::WeightingTable;

/// Warns once for each frequency the clamp policy will pin to a boundary
/// correction and returns those frequencies.
pub fn flag_clamped(frequencies: impl IntoIterator<Item = f64>, policy: RangePolicy) -> Vec<f64> {
    if policy != RangePolicy::Clamp {
        return Vec::new();
    }
    let table = WeightingTable::a_weighting();
    let clamped: Vec<f64> = frequencies.into_iter().filter(|&f| !table.covers(f)).collect();
    for frequency in &clamped {
        log::warn!(
            "{} Hz is outside [{}, {}] Hz, using the boundary correction",
            frequency,
            table.min_frequency(),
            table.max_frequency()
        );
    }
    clamped
}

/// Converts every dBA value of every row, flattened to one measurement per cell.
pub fn convert_dataset(
    frequencies: &FrequencySeries,
    dba_rows: &[DatasetRow],
    policy: RangePolicy,
) -> Result<Vec<ConvertedMeasurement>, ConversionError> {
    let table = WeightingTable::a_weighting();
    flag_clamped(frequencies.frequencies(), policy);
    let mut measurements = Vec::with_capacity(dba_rows.len() * frequencies.len());
    for row in dba_rows {
        for m in row.measurements(frequencies)? {
            let db = table.convert_with(m.dba, m.frequency, policy)?;
            measurements.push(ConvertedMeasurement {
                dataset: m.dataset,
                frequency: m.frequency,
                db,
            });
        }
    }
    Ok(measurements)
}

/// Same conversion as `convert_dataset`, keeping one row per dataset.
pub fn convert_rows(
    frequencies: &FrequencySeries,
    dba_rows: &[DatasetRow],
    policy: RangePolicy,
) -> Result<Vec<DatasetRow>, ConversionError> {
    let table = WeightingTable::a_weighting();
    flag_clamped(frequencies.frequencies(), policy);
    let mut converted = Vec::with_capacity(dba_rows.len());

    for row in dba_rows {
        frequencies.check_row(row)?;
        let mut values = vec![0.0; frequencies.len()];
        for column in frequencies.columns() {
            values[column.index] = table.convert_with(row.values[column.index], column.frequency, policy)?;
        }
        log::debug!("converted dataset '{}' ({} columns)", row.dataset, values.len());
        converted.push(DatasetRow::new(row.dataset.clone(), values));
    }

    Ok(converted)
}

/// Column-wise arithmetic mean over all rows.
pub fn average(frequencies: &FrequencySeries, rows: &[DatasetRow]) -> Result<Vec<f64>, ConversionError> {
    let sums = fold_columns(frequencies, rows, 0.0, |acc, v| acc + v)?;
    let n = rows.len() as f64;
    Ok(sums.into_iter().map(|sum| sum / n).collect())
}

/// Column-wise (maxima, minima) over all rows.
pub fn extrema(frequencies: &FrequencySeries, rows: &[DatasetRow]) -> Result<(Vec<f64>, Vec<f64>), ConversionError> {
    let maxima = fold_columns(frequencies, rows, f64::NEG_INFINITY, f64::max)?;
    let minima = fold_columns(frequencies, rows, f64::INFINITY, f64::min)?;
    Ok((maxima, minima))
}

pub fn aggregate(frequencies: &FrequencySeries, rows: &[DatasetRow]) -> Result<AggregateResult, ConversionError> {
    let averages = average(frequencies, rows)?;
    let (maxima, minima) = extrema(frequencies, rows)?;
    Ok(AggregateResult {
        frequencies: frequencies.frequencies(),
        averages: Some(averages),
        maxima: Some(maxima),
        minima: Some(minima),
    })
}

fn fold_columns(
    frequencies: &FrequencySeries,
    rows: &[DatasetRow],
    init: f64,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Vec<f64>, ConversionError> {
    if rows.is_empty() {
        if let Some(column) = frequencies.columns().first() {
            return Err(ConversionError::EmptyDataset {
                frequency: column.frequency,
            });
        }
    }
    for row in rows {
        frequencies.check_row(row)?;
    }

    Ok(frequencies
        .columns()
        .iter()
        .map(|column| rows.iter().map(|row| row.values[column.index]).fold(init, &f))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn rows_at_1khz() -> (FrequencySeries, Vec<DatasetRow>) {
        let series = FrequencySeries::new([1000.0]);
        let rows = vec![DatasetRow::new("a", vec![80.0]), DatasetRow::new("b", vec![90.0])];
        (series, rows)
    }

    #[test]
    fn two_datasets_at_1khz() {
        let (series, dba) = rows_at_1khz();
        let db = convert_rows(&series, &dba, RangePolicy::Clamp).unwrap();
        let result = aggregate(&series, &db).unwrap();
        assert_eq!(result.averages.unwrap(), vec![85.0]);
        assert_eq!(result.maxima.unwrap(), vec![90.0]);
        assert_eq!(result.minima.unwrap(), vec![80.0]);
        assert_eq!(result.frequencies, vec![1000.0]);
    }

    #[test]
    fn convert_dataset_flattens_in_row_then_column_order() {
        let series = FrequencySeries::new([10.0, 1000.0]);
        let dba = vec![DatasetRow::new("x", vec![50.0, 80.0]), DatasetRow::new("y", vec![40.0, 70.0])];
        let flat = convert_dataset(&series, &dba, RangePolicy::Clamp).unwrap();
        assert_eq!(flat.len(), 4);
        assert_eq!(flat[0].dataset, "x");
        assert!((flat[0].db - 120.4).abs() < EPS);
        assert_eq!(flat[1].frequency, 1000.0);
        assert_eq!(flat[1].db, 80.0);
        assert_eq!(flat[3].dataset, "y");
        assert_eq!(flat[3].db, 70.0);
    }

    #[test]
    fn short_row_is_a_shape_mismatch() {
        let series = FrequencySeries::new([100.0, 200.0, 400.0, 800.0, 1600.0, 3200.0]);
        let rows = vec![DatasetRow::new("short", vec![60.0; 5])];
        assert!(matches!(
            convert_rows(&series, &rows, RangePolicy::Clamp),
            Err(ConversionError::ShapeMismatch { expected: 6, found: 5, .. })
        ));
        assert!(matches!(
            convert_dataset(&series, &rows, RangePolicy::Clamp),
            Err(ConversionError::ShapeMismatch { expected: 6, found: 5, .. })
        ));
        assert!(matches!(
            average(&series, &rows),
            Err(ConversionError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            extrema(&series, &rows),
            Err(ConversionError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn strict_policy_propagates_out_of_range() {
        let series = FrequencySeries::new([5.0]);
        let rows = vec![DatasetRow::new("low", vec![60.0])];
        assert!(matches!(
            convert_rows(&series, &rows, RangePolicy::Strict),
            Err(ConversionError::OutOfRange { .. })
        ));
        assert!(convert_rows(&series, &rows, RangePolicy::Clamp).is_ok());
    }

    #[test]
    fn clamped_columns_are_flagged_under_clamp_only() {
        let frequencies = [5.0, 1000.0, 25000.0, 10.0];
        assert_eq!(flag_clamped(frequencies, RangePolicy::Clamp), vec![5.0, 25000.0]);
        assert!(flag_clamped(frequencies, RangePolicy::Strict).is_empty());
        assert!(flag_clamped(frequencies, RangePolicy::Extrapolate).is_empty());
        assert!(flag_clamped([20.0, 20000.0], RangePolicy::Clamp).is_empty());
    }

    #[test]
    fn empty_input_is_rejected() {
        let series = FrequencySeries::new([250.0, 500.0]);
        assert!(matches!(
            average(&series, &[]),
            Err(ConversionError::EmptyDataset { frequency }) if frequency == 250.0
        ));
        assert!(matches!(extrema(&series, &[]), Err(ConversionError::EmptyDataset { .. })));
    }

    #[test]
    fn no_columns_and_no_rows_is_an_empty_result() {
        let series = FrequencySeries::default();
        assert!(average(&series, &[]).unwrap().is_empty());
    }

    #[test]
    fn single_dataset_average_is_identity() {
        let series = FrequencySeries::new([31.5, 1000.0, 8000.0]);
        let dba = vec![DatasetRow::new("only", vec![45.0, 60.0, 52.5])];
        let db = convert_rows(&series, &dba, RangePolicy::Clamp).unwrap();
        assert_eq!(average(&series, &db).unwrap(), db[0].values);
    }

    #[test]
    fn reductions_ignore_row_order() {
        let series = FrequencySeries::new([63.0, 500.0, 2000.0, 12500.0]);
        let rows = vec![
            DatasetRow::new("a", vec![41.2, 55.0, 63.1, 38.4]),
            DatasetRow::new("b", vec![47.9, 51.3, 66.0, 42.2]),
            DatasetRow::new("c", vec![39.5, 58.8, 61.7, 40.0]),
            DatasetRow::new("d", vec![44.0, 53.6, 64.4, 36.9]),
        ];
        let reference_avg = average(&series, &rows).unwrap();
        let reference_ext = extrema(&series, &rows).unwrap();

        let orders: [[usize; 4]; 4] = [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1], [0, 2, 1, 3]];
        for order in orders {
            let permuted: Vec<DatasetRow> = order.iter().map(|&i| rows[i].clone()).collect();
            let avg = average(&series, &permuted).unwrap();
            for (a, b) in avg.iter().zip(&reference_avg) {
                assert!((a - b).abs() < EPS);
            }
            assert_eq!(extrema(&series, &permuted).unwrap(), reference_ext);
        }
    }

    #[test]
    fn extrema_tracks_each_column_independently() {
        let series = FrequencySeries::new([100.0, 200.0]);
        let rows = vec![DatasetRow::new("a", vec![1.0, 9.0]), DatasetRow::new("b", vec![5.0, 2.0])];
        let (max, min) = extrema(&series, &rows).unwrap();
        assert_eq!(max, vec![5.0, 9.0]);
        assert_eq!(min, vec![1.0, 2.0]);
    }
}
