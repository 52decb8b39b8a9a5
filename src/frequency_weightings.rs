use std::cmp::Ordering;

use interp::{interp, InterpMode};
use once_cell::sync::Lazy;

use crate::domain::error::ConversionError;
use crate::domain::types::RangePolicy;

/// A-weighting corrections (dB) at the one-third-octave centre frequencies,
/// ISO 226:2003 reference curve.
const A_WEIGHTING_KNOTS: [(f64, f64); 34] = [
    (10.0, -70.4),
    (12.5, -63.4),
    (16.0, -56.7),
    (20.0, -50.5),
    (25.0, -44.7),
    (31.5, -39.4),
    (40.0, -34.6),
    (50.0, -30.2),
    (63.0, -26.2),
    (80.0, -22.5),
    (100.0, -19.1),
    (125.0, -16.1),
    (160.0, -13.4),
    (200.0, -10.9),
    (250.0, -8.6),
    (315.0, -6.6),
    (400.0, -4.8),
    (500.0, -3.2),
    (630.0, -1.9),
    (800.0, -0.8),
    (1000.0, 0.0),
    (1250.0, 0.6),
    (1600.0, 1.0),
    (2000.0, 1.2),
    (2500.0, 1.3),
    (3150.0, 1.2),
    (4000.0, 1.0),
    (5000.0, 0.5),
    (6300.0, -0.1),
    (8000.0, -1.1),
    (10000.0, -2.5),
    (12500.0, -4.3),
    (16000.0, -6.6),
    (20000.0, -9.3),
];

static A_WEIGHTING: Lazy<WeightingTable> = Lazy::new(|| WeightingTable {
    frequencies: A_WEIGHTING_KNOTS.iter().map(|k| k.0).collect(),
    corrections: A_WEIGHTING_KNOTS.iter().map(|k| k.1).collect(),
});

/// Correction curve sampled at strictly increasing frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightingTable {
    frequencies: Vec<f64>,
    corrections: Vec<f64>,
}

impl WeightingTable {
    pub fn new(knots: &[(f64, f64)]) -> Result<Self, ConversionError> {
        if knots.len() < 2 {
            return Err(ConversionError::InvalidTable(format!(
                "need at least two knots, got {}",
                knots.len()
            )));
        }
        if let Some(pair) = knots.windows(2).find(|w| !(w[0].0 < w[1].0)) {
            return Err(ConversionError::InvalidTable(format!(
                "frequencies must be strictly increasing ({} Hz followed by {} Hz)",
                pair[0].0, pair[1].0
            )));
        }
        if knots.iter().any(|(f, c)| !f.is_finite() || !c.is_finite()) {
            return Err(ConversionError::InvalidTable("knots must be finite".to_string()));
        }
        Ok(WeightingTable {
            frequencies: knots.iter().map(|k| k.0).collect(),
            corrections: knots.iter().map(|k| k.1).collect(),
        })
    }

    /// The built-in A-weighting table, 10 Hz to 20 kHz.
    pub fn a_weighting() -> &'static WeightingTable {
        &A_WEIGHTING
    }

    pub fn min_frequency(&self) -> f64 {
        self.frequencies[0]
    }

    pub fn max_frequency(&self) -> f64 {
        self.frequencies[self.frequencies.len() - 1]
    }

    pub fn knots(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies.iter().copied().zip(self.corrections.iter().copied())
    }

    /// True when `frequency` lies within the tabulated knots.
    pub fn covers(&self, frequency: f64) -> bool {
        frequency >= self.min_frequency() && frequency <= self.max_frequency()
    }

    /// Interpolated correction at `frequency`.
    pub fn correction(&self, frequency: f64, policy: RangePolicy) -> Result<f64, ConversionError> {
        if self.covers(frequency) {
            return Ok(self.bracketed(frequency));
        }

        match policy {
            RangePolicy::Clamp => Ok(self.clamped_correction(frequency)),
            RangePolicy::Extrapolate if frequency.is_finite() => Ok(interp(
                &self.frequencies,
                &self.corrections,
                frequency,
                &InterpMode::Extrapolate,
            )),
            RangePolicy::Extrapolate | RangePolicy::Strict => Err(ConversionError::OutOfRange {
                frequency,
                min: self.min_frequency(),
                max: self.max_frequency(),
            }),
        }
    }

    fn clamped_correction(&self, frequency: f64) -> f64 {
        let last = self.corrections.len() - 1;
        if frequency < self.min_frequency() {
            self.corrections[0]
        } else if frequency > self.max_frequency() {
            self.corrections[last]
        } else if self.covers(frequency) {
            self.bracketed(frequency)
        } else {
            // NaN falls through every comparison
            f64::NAN
        }
    }

    // Caller guarantees min_frequency <= frequency <= max_frequency.
    fn bracketed(&self, frequency: f64) -> f64 {
        match self
            .frequencies
            .binary_search_by(|f| f.partial_cmp(&frequency).unwrap_or(Ordering::Less))
        {
            Ok(i) => self.corrections[i],
            Err(i) => {
                let (f0, f1) = (self.frequencies[i - 1], self.frequencies[i]);
                let (c0, c1) = (self.corrections[i - 1], self.corrections[i]);
                let t = (frequency - f0) / (f1 - f0);
                c0 + t * (c1 - c0)
            }
        }
    }

    pub fn convert_with(&self, dba: f64, frequency: f64, policy: RangePolicy) -> Result<f64, ConversionError> {
        let correction = self.correction(frequency, policy)?;
        Ok(dba - correction)
    }
}

/// Converts an A-weighted level to an unweighted one, clamping the correction
/// at the table boundaries.
pub fn convert(dba: f64, frequency: f64) -> f64 {
    dba - WeightingTable::a_weighting().clamped_correction(frequency)
}

pub fn convert_with(dba: f64, frequency: f64, policy: RangePolicy) -> Result<f64, ConversionError> {
    WeightingTable::a_weighting().convert_with(dba, frequency, policy)
}
