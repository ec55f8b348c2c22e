//! Used-habitat calibration (UHC) envelope plotting.
//!
//! Compares the kernel-density estimate of an environmental covariate at
//! observed ("used") locations against a pointwise simulation envelope
//! derived from many simulated density curves on a shared grid, optionally
//! overlaying the density at available (background) locations. The render
//! pass draws onto an abstract [`Canvas`]; a plotters-backed PNG surface
//! and a recording surface for tests are provided.

pub mod canvas;
pub mod config;
pub mod curve;
pub mod demo;
pub mod envelope;
pub mod output;
pub mod plot;

use thiserror::Error;

pub use canvas::{Axes, Canvas, DrawCommand, LegendEntry, LinePattern, LineStyle, RecordingCanvas, Rgb};
pub use config::{LegendLayout, PlotConfig};
pub use curve::{DensityCurve, DensityEnsemble};
pub use envelope::Envelope;
pub use output::{read_curve_csv, read_ensemble_csv, write_envelope_csv, PngCanvas};
pub use plot::{render, resolve_ranges};

#[derive(Debug, Error)]
pub enum UhcError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid numeric field: {0}")]
    InvalidNumber(String),
    #[error("density curve must contain at least one grid point")]
    EmptyCurve,
    #[error("density ensemble must contain at least one simulated curve")]
    EmptyEnsemble,
    #[error("density grid must be strictly increasing")]
    NonIncreasingGrid,
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("available density curve is required when the overlay is enabled")]
    MissingAvailable,
    #[error("invalid plot configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Surface(#[from] anyhow::Error),
}
