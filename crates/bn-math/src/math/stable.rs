//! Numerically careful primitives for probability tables.

use serde::{Deserialize, Serialize};

/// Default floor below which a normalising constant is treated as zero.
pub const DEFAULT_ZERO_MASS: f64 = 1e-12;

/// Outcome of dividing a set of weights by their total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Normalization {
    /// Weights were divided by `total`.
    Applied { total: f64 },
    /// Weights were left untouched on request (they already form a distribution).
    Skipped { total: f64 },
    /// `total` was at or below the zero-mass floor; weights were zeroed instead of divided.
    Degenerate { total: f64 },
}

impl Normalization {
    /// The mass the weights summed to before any division.
    pub fn total(&self) -> f64 {
        match *self {
            Normalization::Applied { total }
            | Normalization::Skipped { total }
            | Normalization::Degenerate { total } => total,
        }
    }

    /// True unless the total mass was (numerically) zero.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Normalization::Degenerate { .. })
    }
}

/// Compensated (Neumaier) summation.
///
/// Joint tables can hold millions of tiny products; plain accumulation loses
/// digits once the running sum dwarfs the addends.
pub fn stable_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;
    for v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Divide `weights` by `total` in place.
///
/// A total that is non-finite or `<= zero_mass` cannot be divided by without
/// amplifying noise; the weights are zeroed and `Degenerate` is returned.
pub fn normalize_by(weights: &mut [f64], total: f64, zero_mass: f64) -> Normalization {
    if !total.is_finite() || total <= zero_mass {
        for w in weights.iter_mut() {
            *w = 0.0;
        }
        return Normalization::Degenerate { total };
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    Normalization::Applied { total }
}

/// Normalise `weights` so they sum to one.
pub fn normalize(weights: &mut [f64], zero_mass: f64) -> Normalization {
    let total = stable_sum(weights.iter().copied());
    normalize_by(weights, total, zero_mass)
}

/// Approximate equality with an absolute tolerance.
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol
}

/// Whether `p` is a usable probability (finite and in `[0, 1]` up to `tol`).
pub fn is_probability(p: f64, tol: f64) -> bool {
    p.is_finite() && p >= -tol && p <= 1.0 + tol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_sum_basic() {
        assert_eq!(stable_sum([1.0, 2.0, 3.0]), 6.0);
        assert_eq!(stable_sum(std::iter::empty()), 0.0);
    }

    #[test]
    fn stable_sum_recovers_small_addends() {
        let values = [1e16, 1.0, -1e16];
        assert_eq!(stable_sum(values), 1.0);
    }

    #[test]
    fn normalize_divides_by_total() {
        let mut w = [1.0, 3.0];
        let n = normalize(&mut w, DEFAULT_ZERO_MASS);
        assert_eq!(n, Normalization::Applied { total: 4.0 });
        assert!(approx_eq(w[0], 0.25, 1e-15));
        assert!(approx_eq(w[1], 0.75, 1e-15));
    }

    #[test]
    fn normalize_zero_mass_is_degenerate() {
        let mut w = [0.0, 1e-15];
        let n = normalize(&mut w, DEFAULT_ZERO_MASS);
        assert!(!n.is_defined());
        assert_eq!(w, [0.0, 0.0]);
        assert!(w.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn normalize_by_rejects_nan_total() {
        let mut w = [0.5, 0.5];
        let n = normalize_by(&mut w, f64::NAN, DEFAULT_ZERO_MASS);
        assert!(matches!(n, Normalization::Degenerate { .. }));
        assert_eq!(w, [0.0, 0.0]);
    }

    #[test]
    fn normalization_total_accessor() {
        assert_eq!(Normalization::Skipped { total: 1.0 }.total(), 1.0);
        assert_eq!(Normalization::Degenerate { total: 0.0 }.total(), 0.0);
    }

    #[test]
    fn is_probability_bounds() {
        assert!(is_probability(0.0, 0.0));
        assert!(is_probability(1.0, 0.0));
        assert!(is_probability(1.0 + 1e-13, 1e-12));
        assert!(!is_probability(-0.1, 1e-12));
        assert!(!is_probability(f64::INFINITY, 1e-12));
    }
}
