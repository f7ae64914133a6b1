pub mod quadrature;
pub mod roots;
pub mod search;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// 2^-42, the base epsilon of the polynomial solver.
const POLY_EPSILON: f64 = 1.0 / 4_398_046_511_104.0;

/// Leading coefficients below this magnitude drop the polynomial one degree.
pub const ZERO_COEFFICIENT: f64 = POLY_EPSILON;

/// Discriminants (and depressed-cubic terms) below this magnitude are zero,
/// i.e. the corresponding roots coincide.
pub const REPEATED_ROOT: f64 = POLY_EPSILON;

/// Slack around `[0, 1]` when accepting segment-local roots.
pub const ROOT_DOMAIN: f64 = POLY_EPSILON;

/// Knot gaps below this magnitude are treated as coincident knots.
pub const COINCIDENT_KNOTS: f64 = 1e-14;

/// Coordinate axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the component index (`0`, `1` or `2`).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Normalizes `v`, returning the zero vector when `v` is (nearly) zero.
#[must_use]
pub fn normalize_or_zero(v: &Vector3) -> Vector3 {
    v.try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_indices() {
        let idx: Vec<usize> = Axis::ALL.iter().map(|a| a.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn polynomial_epsilon_is_two_to_minus_42() {
        assert!((POLY_EPSILON - 2f64.powi(-42)).abs() < f64::EPSILON * POLY_EPSILON);
    }

    #[test]
    fn normalize_zero_vector() {
        assert_eq!(normalize_or_zero(&Vector3::zeros()), Vector3::zeros());
        let n = normalize_or_zero(&Vector3::new(0.0, 3.0, 4.0));
        assert!((n.norm() - 1.0).abs() < TOLERANCE);
    }
}
