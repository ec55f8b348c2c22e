//! Density inputs consumed by the render pass.

use crate::UhcError;

/// A kernel density estimate sampled on a grid.
///
/// `x` holds the grid positions, strictly increasing; `y` holds the density
/// value at each position. The grid is shared across every curve and
/// ensemble entering one plot so the envelope is pointwise meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl DensityCurve {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, UhcError> {
        if x.is_empty() {
            return Err(UhcError::EmptyCurve);
        }
        if x.len() != y.len() {
            return Err(UhcError::LengthMismatch {
                context: "density curve",
                expected: x.len(),
                got: y.len(),
            });
        }
        if !x.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(UhcError::NonIncreasingGrid);
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Grid/value pairs in drawing order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }
}

/// Simulated density curves evaluated on a shared grid, one row per
/// simulated dataset.
///
/// Non-finite entries mark simulations with no density estimate at that
/// grid point (failed or data-starved realizations) and are excluded from
/// envelope statistics rather than treated as zero. Tail percentiles
/// stabilize slowly; 200 or more simulations are recommended for a stable
/// 95% envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityEnsemble {
    rows: Vec<Vec<f64>>,
}

impl DensityEnsemble {
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, UhcError> {
        let grid_len = match rows.first() {
            Some(row) => row.len(),
            None => return Err(UhcError::EmptyEnsemble),
        };
        if grid_len == 0 {
            return Err(UhcError::EmptyCurve);
        }
        for row in &rows[1..] {
            if row.len() != grid_len {
                return Err(UhcError::LengthMismatch {
                    context: "ensemble row",
                    expected: grid_len,
                    got: row.len(),
                });
            }
        }
        Ok(Self { rows })
    }

    /// Number of simulated datasets (rows).
    pub fn simulations(&self) -> usize {
        self.rows.len()
    }

    /// Number of shared grid points (columns).
    pub fn grid_len(&self) -> usize {
        self.rows[0].len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Values of one grid column across all simulations, missing included.
    pub fn column(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_rejects_empty_grid() {
        assert!(matches!(
            DensityCurve::new(Vec::new(), Vec::new()),
            Err(UhcError::EmptyCurve)
        ));
    }

    #[test]
    fn curve_rejects_length_mismatch() {
        let err = DensityCurve::new(vec![0.0, 1.0], vec![0.5]).unwrap_err();
        assert!(matches!(
            err,
            UhcError::LengthMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn curve_rejects_non_increasing_grid() {
        let err = DensityCurve::new(vec![0.0, 1.0, 1.0], vec![0.1, 0.2, 0.3]).unwrap_err();
        assert!(matches!(err, UhcError::NonIncreasingGrid));
    }

    #[test]
    fn curve_points_pair_grid_and_values() {
        let curve = DensityCurve::new(vec![0.0, 1.0], vec![0.2, 0.4]).unwrap();
        assert_eq!(curve.points(), vec![(0.0, 0.2), (1.0, 0.4)]);
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn ensemble_rejects_no_rows() {
        assert!(matches!(
            DensityEnsemble::new(Vec::new()),
            Err(UhcError::EmptyEnsemble)
        ));
    }

    #[test]
    fn ensemble_rejects_zero_width_rows() {
        assert!(matches!(
            DensityEnsemble::new(vec![Vec::new()]),
            Err(UhcError::EmptyCurve)
        ));
    }

    #[test]
    fn ensemble_rejects_ragged_rows() {
        let err = DensityEnsemble::new(vec![vec![0.1, 0.2], vec![0.3]]).unwrap_err();
        assert!(matches!(
            err,
            UhcError::LengthMismatch {
                context: "ensemble row",
                expected: 2,
                got: 1,
            }
        ));
    }

    #[test]
    fn ensemble_column_walks_rows_in_order() {
        let ensemble =
            DensityEnsemble::new(vec![vec![0.1, 0.2], vec![0.3, 0.4], vec![0.5, 0.6]]).unwrap();
        assert_eq!(ensemble.simulations(), 3);
        assert_eq!(ensemble.grid_len(), 2);
        let column: Vec<f64> = ensemble.column(1).collect();
        assert_eq!(column, vec![0.2, 0.4, 0.6]);
    }
}
