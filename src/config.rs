use serde::{Deserialize, Serialize};

use crate::canvas::{LegendEntry, LinePattern, LineStyle, Rgb};
use crate::UhcError;

/// Fill for the simulation envelope band.
pub const BAND_FILL: Rgb = Rgb::GRAY;

/// Observed (used) density series: solid, double width.
pub const USED_LINE: LineStyle = LineStyle {
    color: Rgb::BLACK,
    pattern: LinePattern::Solid,
    width: 2,
};

/// Available (background) density overlay: dashed, contrasting color.
pub const AVAILABLE_LINE: LineStyle = LineStyle {
    color: Rgb::RED,
    pattern: LinePattern::Dashed,
    width: 2,
};

// Legend sample standing in for the filled band.
const PREDICTED_SAMPLE: LineStyle = LineStyle {
    color: Rgb::GRAY,
    pattern: LinePattern::Solid,
    width: 4,
};

const AVAILABLE_ENTRY: LegendEntry = LegendEntry {
    label: "Available",
    style: AVAILABLE_LINE,
};
const USED_ENTRY: LegendEntry = LegendEntry {
    label: "Used",
    style: USED_LINE,
};
const PREDICTED_ENTRY: LegendEntry = LegendEntry {
    label: "Predicted",
    style: PREDICTED_SAMPLE,
};

/// Rendering options for a UHC plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Draw the available-density overlay
    pub include_avail: bool,
    /// Draw the legend
    pub include_legend: bool,
    /// X-axis limits, used verbatim; the observed grid span when absent
    pub xlim: Option<(f64, f64)>,
    /// Y-axis limits, used verbatim; the range of all finite density
    /// values when absent
    pub ylim: Option<(f64, f64)>,
    /// Legend anchor in data coordinates; top-left of the resolved axes
    /// when absent
    pub legend_anchor: Option<(f64, f64)>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            include_avail: false,
            include_legend: true,
            xlim: None,
            ylim: None,
            legend_anchor: None,
        }
    }
}

impl PlotConfig {
    pub fn validate(&self) -> Result<(), UhcError> {
        for (name, limits) in [("xlim", self.xlim), ("ylim", self.ylim)] {
            if let Some((lo, hi)) = limits {
                if !lo.is_finite() || !hi.is_finite() {
                    return Err(UhcError::InvalidConfig(format!("{name} must be finite")));
                }
                if lo >= hi {
                    return Err(UhcError::InvalidConfig(format!(
                        "{name} must satisfy min < max"
                    )));
                }
            }
        }
        if let Some((x, y)) = self.legend_anchor {
            if !x.is_finite() || !y.is_finite() {
                return Err(UhcError::InvalidConfig(
                    "legend_anchor must be finite".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn legend_layout(&self) -> LegendLayout {
        match (self.include_legend, self.include_avail) {
            (false, _) => LegendLayout::Hidden,
            (true, false) => LegendLayout::UsedPredicted,
            (true, true) => LegendLayout::AvailableUsedPredicted,
        }
    }
}

/// Legend content as a fixed table keyed off the overlay and legend flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendLayout {
    Hidden,
    UsedPredicted,
    AvailableUsedPredicted,
}

impl LegendLayout {
    pub fn entries(self) -> &'static [LegendEntry] {
        match self {
            LegendLayout::Hidden => &[],
            LegendLayout::UsedPredicted => &[USED_ENTRY, PREDICTED_ENTRY],
            LegendLayout::AvailableUsedPredicted => {
                &[AVAILABLE_ENTRY, USED_ENTRY, PREDICTED_ENTRY]
            }
        }
    }
}
