//! Converts A-weighted sound levels (dBA) to unweighted levels (dB) and
//! aggregates them across measurement datasets.

pub mod aggregate;
pub mod cli;
pub mod frequency_weightings;
pub mod logging;
pub mod pipeline;
pub mod plot;
pub mod table_io;

pub mod domain {
    pub mod error;
    pub mod types;
}

pub use domain::error::ConversionError;
pub use domain::types::RangePolicy;
pub use frequency_weightings::{convert, convert_with, WeightingTable};
