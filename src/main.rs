extern crate anyhow;

use anyhow::Context;
use clap::Parser;

use dba2db::cli::{Args, Command};
use dba2db::domain::types::AggregateResult;
use dba2db::{logging, pipeline};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(&args.log_config, args.log_level).context("failed to initialise logging")?;
    log::info!("dBA to dB converter, policy {}", args.policy);

    let outputs = args.command.outputs();
    let result = match &args.command {
        Command::Datasets { input, delimiter, .. } => pipeline::run_datasets(input, *delimiter, args.policy, &outputs)
            .with_context(|| format!("processing datasets from {}", input.display()))?,
        Command::Extrema { input, delimiter, .. } => pipeline::run_extrema(input, *delimiter, args.policy, &outputs)
            .with_context(|| format!("computing extrema from {}", input.display()))?,
        Command::Average { input, .. } => pipeline::run_average(input, args.policy, &outputs)
            .with_context(|| format!("converting averages from {}", input.display()))?,
    };

    print_summary(&result);
    if let Some(path) = &outputs.table {
        println!("Table saved to: {}", path.display());
    }
    if let Some(path) = &outputs.chart {
        println!("Graph saved as: {}", dba2db::plot::with_png_extension(path).display());
    }
    Ok(())
}

fn print_summary(result: &AggregateResult) {
    for (i, frequency) in result.frequencies.iter().enumerate() {
        let mut line = format!("{:>8} Hz", frequency);
        if let Some(averages) = &result.averages {
            line.push_str(&format!(" | avg {:6.1} dB", averages[i]));
        }
        if let (Some(maxima), Some(minima)) = (&result.maxima, &result.minima) {
            line.push_str(&format!(" | max {:6.1} dB | min {:6.1} dB", maxima[i], minima[i]));
        }
        println!("{}", line);
    }
}
