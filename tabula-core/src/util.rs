//! Numerical helpers shared by explorers, agents and solvers.
use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};

/// Indices of all maximizers of `values`.
///
/// Comparison is exact. NaN entries are never maximizers.
pub fn best_actions(values: &[f64]) -> Vec<usize> {
    let max = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    values.iter().positions(|&v| v == max).collect()
}

/// A maximizer of `values`, ties broken uniformly at random.
///
/// Returns `0` for an empty or all-NaN slice.
pub fn argmax_random_tie(values: &[f64], rng: &mut impl Rng) -> usize {
    best_actions(values).choose(rng).copied().unwrap_or(0)
}

/// The lowest-index maximizer of `values`.
pub fn argmax_first(values: &[f64]) -> usize {
    best_actions(values).first().copied().unwrap_or(0)
}

/// Softmax of `prefs`.
///
/// The maximum is subtracted before exponentiating, so the result is a
/// valid distribution for any finite input.
pub fn softmax(prefs: &[f64]) -> Vec<f64> {
    let max = prefs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = prefs.iter().map(|p| (p - max).exp()).collect();
    let z: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / z).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_best_actions() {
        assert_eq!(best_actions(&[1.0, 3.0, 2.0, 3.0]), vec![1, 3]);
        assert_eq!(best_actions(&[f64::NAN, -1.0]), vec![1]);
        assert_eq!(argmax_first(&[0.0, 0.0, 0.0]), 0);
    }

    #[test]
    fn test_argmax_random_tie_covers_all_maximizers() {
        let mut rng = SmallRng::seed_from_u64(0);
        let values = [5.0, 1.0, 5.0, 5.0];
        let mut seen = [0usize; 4];
        for _ in 0..300 {
            seen[argmax_random_tie(&values, &mut rng)] += 1;
        }
        assert_eq!(seen[1], 0);
        assert!(seen[0] > 0 && seen[2] > 0 && seen[3] > 0);
    }

    #[test]
    fn test_softmax_large_magnitudes() {
        for prefs in [
            vec![1000.0, 1000.0, 999.0],
            vec![-1e6, 0.0, 1e6],
            vec![0.0, 0.0, 0.0, 0.0],
        ] {
            let p = softmax(&prefs);
            assert!(p.iter().all(|v| v.is_finite() && *v >= 0.0));
            assert_abs_diff_eq!(p.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
        let p = softmax(&[0.0, 0.0]);
        assert_abs_diff_eq!(p[0], 0.5, epsilon = 1e-12);
    }
}
