//! PNG surface and file I/O for UHC plots.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use serde::{Deserialize, Serialize};

use crate::canvas::{Axes, Canvas, DrawCommand, LegendEntry, LinePattern, LineStyle, Rgb};
use crate::curve::{DensityCurve, DensityEnsemble};
use crate::envelope::Envelope;
use crate::UhcError;

/// Drawing surface backed by a plotters bitmap, written out as PNG.
///
/// Commands are buffered and realized as a single chart on `present`, so a
/// render pass that fails partway leaves no file behind.
pub struct PngCanvas {
    path: PathBuf,
    size: (u32, u32),
    axes: Option<Axes>,
    commands: Vec<DrawCommand>,
}

impl PngCanvas {
    pub fn new(path: &Path, size: (u32, u32)) -> Self {
        Self {
            path: path.to_path_buf(),
            size,
            axes: None,
            commands: Vec::new(),
        }
    }
}

impl Canvas for PngCanvas {
    fn begin_axes(&mut self, axes: &Axes) -> anyhow::Result<()> {
        self.axes = Some(axes.clone());
        self.commands.clear();
        Ok(())
    }

    fn fill_band(&mut self, outline: &[(f64, f64)], fill: Rgb) -> anyhow::Result<()> {
        self.commands.push(DrawCommand::FillBand {
            outline: outline.to_vec(),
            fill,
        });
        Ok(())
    }

    fn draw_line(&mut self, points: &[(f64, f64)], style: &LineStyle) -> anyhow::Result<()> {
        self.commands.push(DrawCommand::Line {
            points: points.to_vec(),
            style: *style,
        });
        Ok(())
    }

    fn draw_legend(&mut self, anchor: (f64, f64), entries: &[LegendEntry]) -> anyhow::Result<()> {
        self.commands.push(DrawCommand::Legend {
            anchor,
            entries: entries.to_vec(),
        });
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let axes = self
            .axes
            .as_ref()
            .context("present issued before begin_axes")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(
                axes.x_range.0..axes.x_range.1,
                axes.y_range.0..axes.y_range.1,
            )?;

        {
            let mut mesh = chart.configure_mesh();
            if let Some(title) = axes.y_title.as_deref() {
                mesh.y_desc(title);
            }
            mesh.draw()?;
        }

        for command in &self.commands {
            match command {
                DrawCommand::FillBand { outline, fill } => {
                    let color = to_rgb(*fill);
                    chart.draw_series(std::iter::once(Polygon::new(
                        outline.clone(),
                        color.filled(),
                    )))?;
                    let mut border = outline.clone();
                    if let Some(&first) = outline.first() {
                        border.push(first);
                    }
                    chart.draw_series(std::iter::once(PathElement::new(
                        border,
                        color.stroke_width(1),
                    )))?;
                }
                DrawCommand::Line { points, style } => {
                    draw_styled_line(&mut chart, points, style)?;
                }
                DrawCommand::Legend { anchor, entries } => {
                    draw_legend_block(&mut chart, axes, *anchor, entries)?;
                }
                DrawCommand::BeginAxes(_) | DrawCommand::Present => {}
            }
        }

        root.present()?;
        Ok(())
    }
}

type PngChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn to_rgb(color: Rgb) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

fn draw_styled_line(
    chart: &mut PngChart<'_, '_>,
    points: &[(f64, f64)],
    style: &LineStyle,
) -> anyhow::Result<()> {
    let shape = to_rgb(style.color).stroke_width(style.width);
    match style.pattern {
        LinePattern::Solid => {
            chart.draw_series(LineSeries::new(points.iter().copied(), shape))?;
        }
        LinePattern::Dashed => {
            chart.draw_series(DashedLineSeries::new(points.iter().copied(), 8, 5, shape))?;
        }
    }
    Ok(())
}

fn draw_legend_block(
    chart: &mut PngChart<'_, '_>,
    axes: &Axes,
    anchor: (f64, f64),
    entries: &[LegendEntry],
) -> anyhow::Result<()> {
    let sample_len = (axes.x_range.1 - axes.x_range.0) * 0.06;
    let row_step = (axes.y_range.1 - axes.y_range.0) * 0.055;

    for (idx, entry) in entries.iter().enumerate() {
        let y = anchor.1 - row_step * (idx as f64 + 0.5);
        let sample = [(anchor.0, y), (anchor.0 + sample_len, y)];
        draw_styled_line(chart, &sample, &entry.style)?;
        chart.draw_series(std::iter::once(Text::new(
            entry.label,
            (anchor.0 + sample_len * 1.25, y),
            ("sans-serif", 18).into_font(),
        )))?;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CurveRow {
    x: f64,
    y: f64,
}

/// Reads a density curve from a CSV file with `x,y` columns.
pub fn read_curve_csv(path: &Path) -> Result<DensityCurve, UhcError> {
    read_curve(csv::Reader::from_path(path)?)
}

fn read_curve<R: Read>(mut reader: csv::Reader<R>) -> Result<DensityCurve, UhcError> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for record in reader.deserialize() {
        let row: CurveRow = record?;
        xs.push(row.x);
        ys.push(row.y);
    }
    DensityCurve::new(xs, ys)
}

/// Reads a density ensemble from a headerless CSV file, one simulated
/// curve per row. Blank and `NA` fields are missing values.
pub fn read_ensemble_csv(path: &Path) -> Result<DensityEnsemble, UhcError> {
    read_ensemble(
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?,
    )
}

fn read_ensemble<R: Read>(mut reader: csv::Reader<R>) -> Result<DensityEnsemble, UhcError> {
    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let mut row = Vec::with_capacity(record.len());
        for field in record.iter() {
            row.push(parse_density_field(field, row_idx)?);
        }
        rows.push(row);
    }
    DensityEnsemble::new(rows)
}

fn parse_density_field(field: &str, row_idx: usize) -> Result<f64, UhcError> {
    let trimmed = field.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("nan")
    {
        return Ok(f64::NAN);
    }
    trimmed
        .parse()
        .map_err(|_| UhcError::InvalidNumber(format!("row {}: '{trimmed}'", row_idx + 1)))
}

/// Writes the computed envelope next to its grid, one row per grid point.
/// Missing statistics are written as blank fields, mirroring the ensemble
/// reader.
pub fn write_envelope_csv(path: &Path, grid: &[f64], envelope: &Envelope) -> Result<(), UhcError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    write_envelope(&mut writer, grid, envelope)
}

fn write_envelope<W: Write>(
    writer: &mut csv::Writer<W>,
    grid: &[f64],
    envelope: &Envelope,
) -> Result<(), UhcError> {
    if envelope.grid_len() != grid.len() {
        return Err(UhcError::LengthMismatch {
            context: "envelope",
            expected: grid.len(),
            got: envelope.grid_len(),
        });
    }

    writer.write_record(["x", "mean", "lower", "upper"])?;
    for g in 0..grid.len() {
        writer.write_record([
            fmt_f64(grid[g]),
            fmt_cell(envelope.mean[g]),
            fmt_cell(envelope.lower[g]),
            fmt_cell(envelope.upper[g]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn fmt_f64(value: f64) -> String {
    format!("{value:.10}")
}

fn fmt_cell(value: f64) -> String {
    if value.is_finite() {
        fmt_f64(value)
    } else {
        String::new()
    }
}

/// What one CLI run produced, written alongside the plot.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSummary {
    pub simulations: usize,
    pub grid_points: usize,
    pub include_avail: bool,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub plot_path: PathBuf,
    pub envelope_path: Option<PathBuf>,
}

pub fn write_summary(path: &Path, summary: &RenderSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(summary)?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_reader_parses_headed_records() {
        let data = "x,y\n0.0,0.10\n1.0,0.30\n2.0,0.10\n";
        let curve = read_curve(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(curve.x(), &[0.0, 1.0, 2.0]);
        assert_eq!(curve.y(), &[0.1, 0.3, 0.1]);
    }

    #[test]
    fn curve_reader_propagates_grid_validation() {
        let data = "x,y\n1.0,0.2\n0.5,0.3\n";
        let err = read_curve(csv::Reader::from_reader(data.as_bytes())).unwrap_err();
        assert!(matches!(err, UhcError::NonIncreasingGrid));
    }

    fn ensemble_reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_bytes())
    }

    #[test]
    fn ensemble_reader_parses_rows_and_missing_fields() {
        let data = "0.1,0.3,0.1\n0.2,,0.2\n0.1,NA,0.3\n";
        let ensemble = read_ensemble(ensemble_reader(data)).unwrap();
        assert_eq!(ensemble.simulations(), 3);
        assert_eq!(ensemble.grid_len(), 3);
        assert!(ensemble.rows()[1][1].is_nan());
        assert!(ensemble.rows()[2][1].is_nan());
        assert_eq!(ensemble.rows()[2][2], 0.3);
    }

    #[test]
    fn ensemble_reader_rejects_garbage_fields() {
        let err = read_ensemble(ensemble_reader("0.1,abc\n")).unwrap_err();
        assert!(matches!(err, UhcError::InvalidNumber(_)));
    }

    #[test]
    fn envelope_writer_round_trips_grid_and_blanks_missing() {
        let ensemble =
            DensityEnsemble::new(vec![vec![0.2, f64::NAN], vec![0.4, f64::NAN]]).unwrap();
        let envelope = Envelope::from_ensemble(&ensemble);

        let mut writer = csv::Writer::from_writer(Vec::new());
        write_envelope(&mut writer, &[0.0, 1.0], &envelope).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("x,mean,lower,upper"));
        let first = lines.next().unwrap();
        assert!(first.starts_with("0.0000000000,0.3000000000,"));
        // The all-missing column writes blank statistics.
        assert_eq!(lines.next(), Some("1.0000000000,,,"));
    }

    #[test]
    fn envelope_writer_rejects_grid_mismatch() {
        let ensemble = DensityEnsemble::new(vec![vec![0.2, 0.4]]).unwrap();
        let envelope = Envelope::from_ensemble(&ensemble);
        let mut writer = csv::Writer::from_writer(Vec::new());
        let err = write_envelope(&mut writer, &[0.0], &envelope).unwrap_err();
        assert!(matches!(err, UhcError::LengthMismatch { .. }));
    }
}
