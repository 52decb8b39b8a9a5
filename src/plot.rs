use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::error::ConversionError;
use crate::domain::types::DatasetRow;

const CHART_SIZE: (u32, u32) = (1200, 600);

/// One polyline of a chart.
#[derive(Clone)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: RGBAColor,
    pub markers: bool,
}

impl Series {
    pub fn new(label: impl Into<String>, frequencies: &[f64], levels: &[f64], color: RGBAColor) -> Self {
        Series {
            label: label.into(),
            points: frequencies.iter().copied().zip(levels.iter().copied()).collect(),
            color,
            markers: false,
        }
    }

    pub fn with_markers(mut self) -> Self {
        self.markers = true;
        self
    }
}

/// `savefig("average")` style names get a `.png` suffix.
pub fn with_png_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.to_path_buf(),
        None => path.with_extension("png"),
    }
}

/// Span of `values` widened by 5% on each side; a flat span is widened by 1.
pub fn axis_range(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return None;
    }
    let margin = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    Some((lo - margin)..(hi + margin))
}

fn plot_err<E: std::fmt::Display>(err: E) -> ConversionError {
    ConversionError::Plot(err.to_string())
}

/// Renders `series` as a PNG line chart and returns the written path.
pub fn draw_chart(path: &Path, title: &str, y_label: &str, series: &[Series]) -> Result<PathBuf, ConversionError> {
    let path = with_png_extension(path);
    let x_range = axis_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))
        .ok_or_else(|| ConversionError::Plot("nothing to draw".to_string()))?;
    let y_range = axis_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)))
        .ok_or_else(|| ConversionError::Plot("nothing to draw".to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc("Frequency (Hz)")
            .y_desc(y_label)
            .draw()
            .map_err(plot_err)?;

        for s in series {
            let color = s.color;
            chart
                .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))
                .map_err(plot_err)?
                .label(s.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            if s.markers {
                chart
                    .draw_series(s.points.iter().map(|&p| Circle::new(p, 4, color.filled())))
                    .map_err(plot_err)?;
            }
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
    }
    log::info!("chart saved as {}", path.display());
    Ok(path)
}

/// One line per dataset.
pub fn plot_datasets(path: &Path, frequencies: &[f64], rows: &[DatasetRow]) -> Result<PathBuf, ConversionError> {
    let series: Vec<Series> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| Series::new(row.dataset.as_str(), frequencies, &row.values, Palette99::pick(i).to_rgba()))
        .collect();
    draw_chart(path, "Frequency vs. Sound Level (in dB)", "Sound Level (dB)", &series)
}

pub fn plot_extrema(path: &Path, frequencies: &[f64], maxima: &[f64], minima: &[f64]) -> Result<PathBuf, ConversionError> {
    let series = [
        Series::new("Highest dB Values Across Datasets", frequencies, maxima, RED.to_rgba()),
        Series::new("Lowest dB Values Across Datasets", frequencies, minima, BLUE.to_rgba()),
    ];
    draw_chart(
        path,
        "Frequency vs. Sound Level (Highest and Lowest Across Datasets in dB)",
        "Sound Level (dB)",
        &series,
    )
}

pub fn plot_average(path: &Path, frequencies: &[f64], averages: &[f64]) -> Result<PathBuf, ConversionError> {
    let series = [Series::new("Average dB", frequencies, averages, BLUE.to_rgba()).with_markers()];
    draw_chart(path, "Average dB vs. Frequency", "Average Sound Level (dB)", &series)
}
