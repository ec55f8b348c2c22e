//! Pointwise simulation envelope over a density ensemble.

use crate::curve::DensityEnsemble;

/// Column-wise mean and 2.5th/97.5th percentile bands of an ensemble.
///
/// Each series has one entry per grid point. Columns whose simulated values
/// are all missing carry `NAN` in all three series so that missingness
/// propagates to the drawing surface instead of collapsing to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Envelope {
    pub const LOWER_PROB: f64 = 0.025;
    pub const UPPER_PROB: f64 = 0.975;

    /// Computes the envelope column by column, skipping non-finite entries.
    pub fn from_ensemble(ensemble: &DensityEnsemble) -> Self {
        let grid_len = ensemble.grid_len();
        let mut mean = Vec::with_capacity(grid_len);
        let mut lower = Vec::with_capacity(grid_len);
        let mut upper = Vec::with_capacity(grid_len);

        for g in 0..grid_len {
            let mut values: Vec<f64> = ensemble.column(g).filter(|v| v.is_finite()).collect();
            if values.is_empty() {
                mean.push(f64::NAN);
                lower.push(f64::NAN);
                upper.push(f64::NAN);
                continue;
            }

            let sum: f64 = values.iter().sum();
            mean.push(sum / values.len() as f64);

            values.sort_unstable_by(f64::total_cmp);
            lower.push(quantile_sorted(&values, Self::LOWER_PROB));
            upper.push(quantile_sorted(&values, Self::UPPER_PROB));
        }

        Self { mean, lower, upper }
    }

    pub fn grid_len(&self) -> usize {
        self.mean.len()
    }
}

/// Linear-interpolation quantile on pre-sorted data (R-7 rule, the default
/// of common statistical software): `h = (n - 1) * p`, interpolating
/// between the bracketing order statistics. Different quantile conventions
/// produce visibly different envelope widths at small ensemble sizes, so
/// the rule is fixed here.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        return sorted[n - 1];
    }
    sorted[j] + g * (sorted[j + 1] - sorted[j])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn ensemble(rows: &[&[f64]]) -> DensityEnsemble {
        DensityEnsemble::new(rows.iter().map(|row| row.to_vec()).collect()).unwrap()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < TOL, "expected {e}, got {a}");
        }
    }

    #[test]
    fn bands_bracket_the_mean() {
        let env = Envelope::from_ensemble(&ensemble(&[
            &[0.10, 0.55, 0.30],
            &[0.20, 0.55, 0.10],
            &[0.15, 0.45, 0.50],
            &[0.05, 0.65, 0.40],
            &[0.25, 0.35, 0.20],
        ]));
        for g in 0..3 {
            assert!(env.lower[g] <= env.mean[g]);
            assert!(env.mean[g] <= env.upper[g]);
        }
    }

    #[test]
    fn row_order_does_not_matter() {
        let rows: [&[f64]; 4] = [
            &[0.1, 0.9, 0.3],
            &[0.7, 0.2, 0.6],
            &[0.4, 0.5, 0.8],
            &[0.3, 0.6, 0.1],
        ];
        let permuted: [&[f64]; 4] = [rows[2], rows[0], rows[3], rows[1]];

        let a = Envelope::from_ensemble(&ensemble(&rows));
        let b = Envelope::from_ensemble(&ensemble(&permuted));

        assert_close(&a.mean, &b.mean);
        assert_close(&a.lower, &b.lower);
        assert_close(&a.upper, &b.upper);
    }

    #[test]
    fn identical_rows_collapse_the_envelope() {
        let v = [0.1, 0.3, 0.1];
        let env = Envelope::from_ensemble(&ensemble(&[&v, &v, &v]));
        assert_close(&env.mean, &v);
        assert_close(&env.lower, &v);
        assert_close(&env.upper, &v);
    }

    #[test]
    fn missing_entries_are_excluded_per_column() {
        let env = Envelope::from_ensemble(&ensemble(&[
            &[0.2, 0.5],
            &[0.4, f64::NAN],
            &[0.6, 0.7],
        ]));
        let reference = Envelope::from_ensemble(&ensemble(&[&[0.5], &[0.7]]));

        assert_eq!(env.mean[1], reference.mean[0]);
        assert_eq!(env.lower[1], reference.lower[0]);
        assert_eq!(env.upper[1], reference.upper[0]);
        // The neighboring column is untouched by the missing entry.
        assert!((env.mean[0] - 0.4).abs() < TOL);
    }

    #[test]
    fn all_missing_column_propagates_nan() {
        let env = Envelope::from_ensemble(&ensemble(&[
            &[0.2, f64::NAN],
            &[0.4, f64::NAN],
        ]));
        assert!(env.mean[1].is_nan());
        assert!(env.lower[1].is_nan());
        assert!(env.upper[1].is_nan());
        assert!(env.mean[0].is_finite());
    }

    #[test]
    fn two_row_ensemble_interpolates_tail_percentiles() {
        let env = Envelope::from_ensemble(&ensemble(&[&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0]]));
        assert_close(&env.mean, &[0.5, 0.5, 0.5]);
        assert_close(&env.lower, &[0.025, 0.025, 0.025]);
        assert_close(&env.upper, &[0.975, 0.975, 0.975]);
    }

    #[test]
    fn quantile_endpoints_are_min_and_max() {
        let sorted = [1.0, 2.0, 5.0, 9.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 1.0), 9.0);
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile_sorted(&sorted, 0.5) - 2.5).abs() < TOL);
        assert!((quantile_sorted(&sorted, 0.25) - 1.75).abs() < TOL);
    }

    #[test]
    fn quantile_single_value_is_itself() {
        assert_eq!(quantile_sorted(&[0.42], 0.025), 0.42);
        assert_eq!(quantile_sorted(&[0.42], 0.975), 0.42);
    }
}
