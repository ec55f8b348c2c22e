//! Seeded synthetic dataset for the demonstration binary.

use std::f64::consts::PI;

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::curve::{DensityCurve, DensityEnsemble};

/// A complete synthetic UHC scenario on a shared grid: an observed
/// density, an available density, and an ensemble of predicted densities
/// jittered around a model that sits slightly off the observed one.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    pub used: DensityCurve,
    pub avail: DensityCurve,
    pub ensemble: DensityEnsemble,
}

pub fn synthetic_scenario(
    seed: u64,
    simulations: usize,
    grid_len: usize,
) -> Result<SyntheticScenario> {
    anyhow::ensure!(simulations >= 1, "simulations must be >= 1");
    anyhow::ensure!(grid_len >= 2, "grid_len must be >= 2");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let grid: Vec<f64> = (0..grid_len)
        .map(|idx| -4.0 + 8.0 * idx as f64 / (grid_len - 1) as f64)
        .collect();

    let used_y: Vec<f64> = grid.iter().map(|&x| normal_pdf(x, 0.6, 1.0)).collect();
    let avail_y: Vec<f64> = grid.iter().map(|&x| normal_pdf(x, -0.4, 1.35)).collect();

    // Each simulated curve perturbs the predicted model in location and
    // overall mass.
    let rows: Vec<Vec<f64>> = (0..simulations)
        .map(|_| {
            let shift = gaussian(&mut rng, 0.15);
            let scale = 1.0 + gaussian(&mut rng, 0.08);
            grid.iter()
                .map(|&x| (normal_pdf(x - shift, 0.45, 1.05) * scale).max(0.0))
                .collect()
        })
        .collect();

    Ok(SyntheticScenario {
        used: DensityCurve::new(grid.clone(), used_y)?,
        avail: DensityCurve::new(grid, avail_y)?,
        ensemble: DensityEnsemble::new(rows)?,
    })
}

fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * PI).sqrt())
}

fn gaussian(rng: &mut ChaCha8Rng, sigma: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    sigma * z
}
