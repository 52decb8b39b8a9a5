use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::domain::types::RangePolicy;
use crate::pipeline::Outputs;

#[derive(Parser, Debug, Clone)]
#[command(name = "dba2db", version, about = "Convert A-weighted sound levels to unweighted dB", long_about = None)]
pub struct Args {
    /// log4rs YAML configuration; a console logger is used when the file is absent.
    #[arg(long, default_value = "log.yml", global = true)]
    pub log_config: PathBuf,

    /// Level for the fallback console logger.
    #[arg(long, default_value_t = LevelFilter::Info, global = true)]
    pub log_level: LevelFilter,

    /// Handling of frequencies outside 10 Hz..20 kHz: clamp, extrapolate or strict.
    #[arg(long, default_value_t = RangePolicy::Clamp, global = true)]
    pub policy: RangePolicy,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert every dataset, write per-frequency averages and chart all datasets.
    Datasets {
        /// Table whose first row lists the frequencies and every other row one dataset.
        #[arg(short, long, default_value = "data.csv")]
        input: PathBuf,

        #[arg(short, long, default_value = ";", value_parser = parse_delimiter)]
        delimiter: u8,

        /// Output table with `Frequency (Hz)` and `Average dB` columns.
        #[arg(long, default_value = "average_db_per_frequency.csv")]
        averages_out: PathBuf,

        /// Output chart; `.png` is appended when no extension is given.
        #[arg(long, default_value = "Hz_to_dBA")]
        chart: PathBuf,

        #[arg(long)]
        no_chart: bool,
    },

    /// Highest and lowest dB per frequency across datasets.
    Extrema {
        #[arg(short, long, default_value = "data.csv")]
        input: PathBuf,

        #[arg(short, long, default_value = ";", value_parser = parse_delimiter)]
        delimiter: u8,

        /// Optional table with `Frequency (Hz)`, `Highest dB` and `Lowest dB` columns.
        #[arg(long)]
        table_out: Option<PathBuf>,

        #[arg(long, default_value = "Hz_to_dB_highest_lowest_per_frequency")]
        chart: PathBuf,

        #[arg(long)]
        no_chart: bool,
    },

    /// Convert a single averaged series (`Frequency (Hz)`, `Average dBA`).
    Average {
        #[arg(short, long, default_value = "average_dba_per_frequency.csv")]
        input: PathBuf,

        #[arg(long)]
        table_out: Option<PathBuf>,

        #[arg(long, default_value = "average")]
        chart: PathBuf,

        #[arg(long)]
        no_chart: bool,
    },
}

impl Command {
    pub fn outputs(&self) -> Outputs {
        let chart_unless = |chart: &PathBuf, skip: bool| if skip { None } else { Some(chart.clone()) };
        match self {
            Command::Datasets {
                averages_out,
                chart,
                no_chart,
                ..
            } => Outputs {
                table: Some(averages_out.clone()),
                chart: chart_unless(chart, *no_chart),
            },
            Command::Extrema {
                table_out,
                chart,
                no_chart,
                ..
            }
            | Command::Average {
                table_out,
                chart,
                no_chart,
                ..
            } => Outputs {
                table: table_out.clone(),
                chart: chart_unless(chart, *no_chart),
            },
        }
    }
}

/// Parse a single ASCII character as a field delimiter.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got '{}'", s)),
        },
    }
}
