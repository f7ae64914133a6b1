//! Closed-form real roots of quadratic and cubic polynomials.
//!
//! Degenerate inputs fall through to the next lower degree instead of
//! failing, so callers always get a (possibly empty) list of real roots.

use std::f64::consts::PI;

use super::{REPEATED_ROOT, ZERO_COEFFICIENT};

/// Real cube root that keeps the sign of negative operands.
#[must_use]
pub fn real_cbrt(x: f64) -> f64 {
    let y = x.abs().powf(1.0 / 3.0);
    if x < 0.0 {
        -y
    } else {
        y
    }
}

/// Solves `a*x^2 + b*x + c = 0` for its real roots.
///
/// With a vanishing `a` the equation is solved as linear; a vanishing `b` as
/// well yields no roots.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < ZERO_COEFFICIENT {
        if b.abs() < ZERO_COEFFICIENT {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let disc = b * b - 4.0 * a * c;
    if disc.abs() < REPEATED_ROOT {
        return vec![-b / (2.0 * a)];
    }
    if disc > 0.0 {
        let sq = disc.sqrt();
        return vec![(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)];
    }
    Vec::new()
}

/// Solves `a*x^3 + b*x^2 + c*x + d = 0` for its real roots.
///
/// The cubic is depressed to `t^3 + p*t + q = 0` with `x = t - b/(3a)` and
/// split on `p`, `q` and the discriminant `q^2/4 + p^3/27`. Repeated roots are
/// reported once per distinct value found by the respective branch.
#[must_use]
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < ZERO_COEFFICIENT {
        return solve_quadratic(b, c, d);
    }

    let p = (3.0 * a * c - b * b) / (3.0 * a * a);
    let q = (2.0 * b * b * b - 9.0 * a * b * c + 27.0 * a * a * d) / (27.0 * a * a * a);

    let mut roots = if p.abs() < REPEATED_ROOT {
        vec![real_cbrt(-q)]
    } else if q.abs() < REPEATED_ROOT {
        if p < 0.0 {
            let s = (-p).sqrt();
            vec![0.0, s, -s]
        } else {
            vec![0.0]
        }
    } else {
        let disc = q * q / 4.0 + p * p * p / 27.0;
        if disc.abs() < REPEATED_ROOT {
            vec![-1.5 * q / p, 3.0 * q / p]
        } else if disc > 0.0 {
            // Cardano
            let u = real_cbrt(-q / 2.0 - disc.sqrt());
            vec![u - p / (3.0 * u)]
        } else {
            let u = 2.0 * (-p / 3.0).sqrt();
            let phi = (3.0 * q / p / u).clamp(-1.0, 1.0).acos() / 3.0;
            let k = 2.0 * PI / 3.0;
            vec![u * phi.cos(), u * (phi - k).cos(), u * (phi - 2.0 * k).cos()]
        }
    };

    let shift = b / (3.0 * a);
    for r in &mut roots {
        *r -= shift;
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sorted(mut v: Vec<f64>) -> Vec<f64> {
        v.sort_by(f64::total_cmp);
        v
    }

    #[test]
    fn cbrt_keeps_sign() {
        assert_abs_diff_eq!(real_cbrt(-8.0), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(real_cbrt(27.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(real_cbrt(0.0), 0.0);
    }

    #[test]
    fn quadratic_two_roots() {
        let r = sorted(solve_quadratic(1.0, 0.0, -1.0));
        assert_eq!(r.len(), 2);
        assert_abs_diff_eq!(r[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn quadratic_double_root() {
        let r = solve_quadratic(1.0, -2.0, 1.0);
        assert_eq!(r.len(), 1);
        assert_abs_diff_eq!(r[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn quadratic_no_real_roots() {
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn quadratic_degrades_to_linear() {
        let r = solve_quadratic(0.0, 2.0, -4.0);
        assert_eq!(r, vec![2.0]);
        assert!(solve_quadratic(0.0, 0.0, 3.0).is_empty());
    }

    #[test]
    fn cubic_three_distinct_roots() {
        let r = sorted(solve_cubic(1.0, -6.0, 11.0, -6.0));
        assert_eq!(r.len(), 3);
        for (got, want) in r.iter().zip([1.0, 2.0, 3.0]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-9);
        }
    }

    #[test]
    fn cubic_single_real_root() {
        // x^3 + x + 2 = (x + 1)(x^2 - x + 2)
        let r = solve_cubic(1.0, 0.0, 1.0, 2.0);
        assert_eq!(r.len(), 1);
        assert_abs_diff_eq!(r[0], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn cubic_triple_root() {
        // (x - 2)^3
        let r = solve_cubic(1.0, -6.0, 12.0, -8.0);
        assert_eq!(r.len(), 1);
        assert_abs_diff_eq!(r[0], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn cubic_with_double_root() {
        // (x - 1)^2 (x + 2) = x^3 - 3x + 2
        let r = sorted(solve_cubic(1.0, 0.0, -3.0, 2.0));
        assert_eq!(r.len(), 2);
        assert_abs_diff_eq!(r[0], -2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn cubic_symmetric_roots() {
        // x^3 - 4x
        let r = sorted(solve_cubic(1.0, 0.0, -4.0, 0.0));
        assert_eq!(r.len(), 3);
        assert_abs_diff_eq!(r[0], -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn cubic_degrades_to_quadratic() {
        let r = sorted(solve_cubic(0.0, 1.0, 0.0, -4.0));
        assert_eq!(r.len(), 2);
        assert_abs_diff_eq!(r[0], -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn all_zero_cubic_has_no_roots() {
        assert!(solve_cubic(0.0, 0.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn roots_satisfy_polynomial() {
        let (a, b, c, d) = (2.0, -3.0, -11.0, 6.0);
        for x in solve_cubic(a, b, c, d) {
            let y = ((a * x + b) * x + c) * x + d;
            assert!(y.abs() < 1e-9, "residual {y} at {x}");
        }
    }
}
