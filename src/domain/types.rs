use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{Display, EnumIter, EnumString};

use crate::domain::error::ConversionError;

/// What to do with a frequency that falls outside the tabulated knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RangePolicy {
    /// Use the correction of the nearest boundary knot.
    #[default]
    Clamp,
    /// Continue the first/last segment linearly.
    Extrapolate,
    /// Fail with `ConversionError::OutOfRange`.
    Strict,
}

/// A single dBA reading of one dataset at one frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub dataset: String,
    pub frequency: f64,
    pub dba: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedMeasurement {
    pub dataset: String,
    pub frequency: f64,
    pub db: f64,
}

/// One header column: the frequency it carries and its position in every row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyColumn {
    pub frequency: f64,
    pub index: usize,
}

/// Ordered frequencies shared by every dataset of a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrequencySeries {
    columns: Vec<FrequencyColumn>,
}

impl FrequencySeries {
    pub fn new(frequencies: impl IntoIterator<Item = f64>) -> Self {
        let columns = frequencies
            .into_iter()
            .enumerate()
            .map(|(index, frequency)| FrequencyColumn { frequency, index })
            .collect();
        FrequencySeries { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[FrequencyColumn] {
        &self.columns
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.frequency).collect()
    }

    /// Fails unless `row` has exactly one value per column.
    pub fn check_row(&self, row: &DatasetRow) -> Result<(), ConversionError> {
        if row.values.len() != self.columns.len() {
            return Err(ConversionError::ShapeMismatch {
                dataset: row.dataset.clone(),
                expected: self.columns.len(),
                found: row.values.len(),
            });
        }
        Ok(())
    }
}

/// A labelled row of levels, one per `FrequencySeries` column. Holds dBA
/// straight from the loader and dB once converted.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub dataset: String,
    pub values: Vec<f64>,
}

impl DatasetRow {
    pub fn new(dataset: impl Into<String>, values: Vec<f64>) -> Self {
        DatasetRow {
            dataset: dataset.into(),
            values,
        }
    }

    /// Pairs each value with its column frequency.
    pub fn measurements(&self, frequencies: &FrequencySeries) -> Result<Vec<Measurement>, ConversionError> {
        frequencies.check_row(self)?;
        Ok(frequencies
            .columns()
            .iter()
            .map(|column| Measurement {
                dataset: self.dataset.clone(),
                frequency: column.frequency,
                dba: self.values[column.index],
            })
            .collect())
    }
}

/// Per-frequency statistics over all datasets of a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateResult {
    pub frequencies: Vec<f64>,
    pub averages: Option<Vec<f64>>,
    pub maxima: Option<Vec<f64>>,
    pub minima: Option<Vec<f64>>,
}

/// Row of the single-series input: one averaged dBA level per frequency.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AverageDbaRecord {
    #[serde(rename = "Frequency (Hz)")]
    pub frequency: f64,
    #[serde(rename = "Average dBA")]
    pub average_dba: f64,
}

/// Whole-number frequencies are written as integers (`100`, not `100.0`).
fn serialize_frequency<S: Serializer>(frequency: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if frequency.fract() == 0.0 && frequency.abs() < 1e15 {
        serializer.serialize_i64(*frequency as i64)
    } else {
        serializer.serialize_f64(*frequency)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageDbRecord {
    #[serde(rename = "Frequency (Hz)", serialize_with = "serialize_frequency")]
    pub frequency: f64,
    #[serde(rename = "Average dB")]
    pub average_db: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremaRecord {
    #[serde(rename = "Frequency (Hz)", serialize_with = "serialize_frequency")]
    pub frequency: f64,
    #[serde(rename = "Highest dB")]
    pub highest_db: f64,
    #[serde(rename = "Lowest dB")]
    pub lowest_db: f64,
}
