use crate::error::Result;
use crate::geometry::curve::SplineCurve;
use crate::mapper::ArcLengthStrategy;
use crate::math::roots::solve_quadratic;
use crate::math::{Axis, Point3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// A box containing only `point`.
    #[must_use]
    pub fn from_point(point: Point3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grows the box to contain `point`.
    pub fn include(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }
}

/// Computes the exact axis-aligned bounding box of a curve section.
///
/// Besides the section end points, every segment contributes its per-axis
/// extrema, found at the roots of the derivative polynomial.
pub struct BoundingBox {
    from: f64,
    to: f64,
}

impl BoundingBox {
    /// Creates a new `BoundingBox` query over the whole curve.
    #[must_use]
    pub fn new() -> Self {
        Self { from: 0.0, to: 1.0 }
    }

    /// Restricts the query to the progress range `[from, to]`.
    #[must_use]
    pub fn with_range(mut self, from: f64, to: f64) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is outside `[0, 1]` or reversed.
    pub fn execute<S: ArcLengthStrategy>(&self, curve: &SplineCurve<S>) -> Result<Aabb> {
        let (from, to) = crate::geometry::curve::check_range(self.from, self.to)?;
        let t0 = curve.time_from_progress(from)?;
        let t1 = curve.time_from_progress(to)?;
        let spline = curve.spline();

        let mut aabb = Aabb::from_point(spline.point(t0));
        aabb.include(&spline.point(t1));

        #[allow(clippy::cast_precision_loss)]
        let n = spline.segment_count() as f64;
        for (index, coefficients) in spline.all_coefficients().iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let offset = index as f64;
            let lo = (t0 * n - offset).max(0.0);
            let hi = (t1 * n - offset).min(1.0);
            if lo > hi {
                continue;
            }
            for axis in Axis::ALL {
                let c = coefficients.axis(axis);
                for t in solve_quadratic(3.0 * c.c3, 2.0 * c.c2, c.c1) {
                    if t > lo && t < hi {
                        aabb.include(&coefficients.point(t));
                    }
                }
            }
        }
        Ok(aabb)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::CurveOptions;
    use crate::operations::query::SamplePoints;
    use approx::assert_abs_diff_eq;

    fn inside(b: &Aabb, p: &Point3) -> bool {
        (0..3).all(|k| p[k] >= b.min[k] - 1e-9 && p[k] <= b.max[k] + 1e-9)
    }

    fn wave() -> SplineCurve {
        SplineCurve::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 3.0, 1.0),
                Point3::new(4.0, -3.0, -1.0),
                Point3::new(6.0, 0.0, 0.0),
            ],
            &CurveOptions::default().with_curviness(1.0),
        )
        .unwrap()
    }

    #[test]
    fn straight_line_box() {
        let curve = SplineCurve::new(
            vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, -2.0, 3.0)],
            &CurveOptions::default(),
        )
        .unwrap();
        let b = BoundingBox::new().execute(&curve).unwrap();
        assert!((b.min - Point3::new(1.0, -2.0, 3.0)).norm() < 1e-12);
        assert!((b.max - Point3::new(4.0, 2.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn contains_every_sample_and_touches_extrema() {
        let curve = wave();
        let b = BoundingBox::new().execute(&curve).unwrap();
        let samples = SamplePoints::new(2000).execute(&curve).unwrap();
        let mut sampled = Aabb::from_point(samples.points[0]);
        for p in &samples.points {
            assert!(inside(&b, p));
            sampled.include(p);
        }
        // The overshoot beyond the control points is captured.
        assert!(b.max.y > 3.0);
        assert!(b.min.y < -3.0);
        for k in 0..3 {
            assert_abs_diff_eq!(b.min[k], sampled.min[k], epsilon = 1e-3);
            assert_abs_diff_eq!(b.max[k], sampled.max[k], epsilon = 1e-3);
        }
    }

    #[test]
    fn sub_range_is_smaller() {
        let curve = wave();
        let whole = BoundingBox::new().execute(&curve).unwrap();
        let part = BoundingBox::new().with_range(0.0, 0.3).execute(&curve).unwrap();
        assert!(part.min.y >= whole.min.y);
        assert!(part.max.x < whole.max.x);
        assert!(BoundingBox::new().with_range(0.6, 0.2).execute(&curve).is_err());
    }
}
