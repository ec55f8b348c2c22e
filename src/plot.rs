//! The UHC envelope render pass.

use crate::canvas::{Axes, Canvas};
use crate::config::{LegendLayout, PlotConfig, AVAILABLE_LINE, BAND_FILL, USED_LINE};
use crate::curve::{DensityCurve, DensityEnsemble};
use crate::envelope::Envelope;
use crate::UhcError;

/// Render a used-habitat calibration plot onto `canvas`.
///
/// The pointwise simulation envelope of `densrand` is drawn as a filled
/// band, the observed density `densdat` as a solid line above it, and the
/// available density as a dashed overlay when `config.include_avail` is
/// set, followed by a legend listing the series actually drawn. Inputs are
/// validated up front; on failure no draw command has been issued.
pub fn render<C: Canvas>(
    densdat: &DensityCurve,
    densrand: &DensityEnsemble,
    densavail: Option<&DensityCurve>,
    config: &PlotConfig,
    canvas: &mut C,
) -> Result<(), UhcError> {
    config.validate()?;
    if config.include_avail && densavail.is_none() {
        return Err(UhcError::MissingAvailable);
    }
    if densrand.grid_len() != densdat.len() {
        return Err(UhcError::LengthMismatch {
            context: "ensemble grid",
            expected: densdat.len(),
            got: densrand.grid_len(),
        });
    }

    let overlay = if config.include_avail { densavail } else { None };
    let (x_range, y_range) = resolve_ranges(densdat, densrand, overlay, config);
    let envelope = Envelope::from_ensemble(densrand);

    // The y axis stays untitled under auto-ranged extents; callers fixing
    // the extents are composing a standalone figure and get the title.
    let y_title = config.xlim.map(|_| "Density".to_string());
    canvas.begin_axes(&Axes {
        x_range,
        y_range,
        y_title,
    })?;

    canvas.fill_band(&band_outline(densdat.x(), &envelope), BAND_FILL)?;
    canvas.draw_line(&densdat.points(), &USED_LINE)?;
    if let Some(avail) = overlay {
        canvas.draw_line(&avail.points(), &AVAILABLE_LINE)?;
    }

    let layout = config.legend_layout();
    if layout != LegendLayout::Hidden {
        let anchor = config
            .legend_anchor
            .unwrap_or((x_range.0, y_range.1));
        canvas.draw_legend(anchor, layout.entries())?;
    }

    canvas.present()?;
    Ok(())
}

/// Axis extents for a render: caller-supplied limits verbatim, otherwise
/// the observed grid span and the range of all finite density values
/// (ensemble, observed, and the overlay when it is drawn).
pub fn resolve_ranges(
    densdat: &DensityCurve,
    densrand: &DensityEnsemble,
    overlay: Option<&DensityCurve>,
    config: &PlotConfig,
) -> ((f64, f64), (f64, f64)) {
    let x_range = config.xlim.unwrap_or_else(|| {
        let grid = densdat.x();
        (grid[0], grid[grid.len() - 1])
    });
    let y_range = config
        .ylim
        .unwrap_or_else(|| finite_y_range(densdat, densrand, overlay).unwrap_or((0.0, 1.0)));
    (x_range, y_range)
}

fn finite_y_range(
    densdat: &DensityCurve,
    densrand: &DensityEnsemble,
    overlay: Option<&DensityCurve>,
) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    let ensemble_values = densrand.rows().iter().flatten().copied();
    let observed = densdat.y().iter().copied();
    let avail = overlay.map(DensityCurve::y).unwrap_or(&[]).iter().copied();

    for value in ensemble_values.chain(observed).chain(avail) {
        if !value.is_finite() {
            continue;
        }
        min = min.min(value);
        max = max.max(value);
    }

    (min <= max).then_some((min, max))
}

/// Closed outline of the envelope band: the upper curve left to right,
/// then the lower curve right to left.
fn band_outline(grid: &[f64], envelope: &Envelope) -> Vec<(f64, f64)> {
    let mut outline: Vec<(f64, f64)> = grid
        .iter()
        .copied()
        .zip(envelope.upper.iter().copied())
        .collect();
    outline.extend(
        grid.iter()
            .rev()
            .copied()
            .zip(envelope.lower.iter().rev().copied()),
    );
    outline
}
