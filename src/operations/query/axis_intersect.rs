use crate::error::Result;
use crate::geometry::curve::SplineCurve;
use crate::geometry::spline::AxisCoefficients;
use crate::mapper::ArcLengthStrategy;
use crate::math::roots::solve_cubic;
use crate::math::{Axis, Point3, ROOT_DOMAIN, TOLERANCE, ZERO_COEFFICIENT};

/// Finds where a curve crosses the plane `axis = value`.
///
/// Only segments whose middle control points, widened by the margin, span
/// the value are solved. A segment that bulges further than the margin
/// beyond its control points can therefore be missed.
///
/// On a closed curve times `0` and `1` are the same point, so a crossing at
/// the seam is reported once.
pub struct AxisIntersect {
    axis: Axis,
    value: f64,
    max: isize,
    margin: Option<f64>,
}

impl AxisIntersect {
    /// Creates a new `AxisIntersect` query returning every intersection.
    #[must_use]
    pub fn new(axis: Axis, value: f64) -> Self {
        Self {
            axis,
            value,
            max: 0,
            margin: None,
        }
    }

    /// Limits the number of intersections returned to `|max|`.
    ///
    /// A negative `max` searches from the end of the curve and returns the
    /// intersections in descending order. Zero means no limit.
    #[must_use]
    pub fn with_max(mut self, max: isize) -> Self {
        self.max = max;
        self
    }

    /// Overrides the curve's intersection margin.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Executes the query, returning curve times.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be evaluated.
    pub fn execute<S: ArcLengthStrategy>(&self, curve: &SplineCurve<S>) -> Result<Vec<f64>> {
        let spline = curve.spline();
        let points = spline.points();
        let margin = self.margin.unwrap_or_else(|| curve.intersection_margin());
        let count = spline.segment_count();
        let limit = self.max.unsigned_abs();
        let backwards = self.max < 0;
        let closed = curve.is_closed();
        let k = self.axis.index();

        let mut times: Vec<f64> = Vec::new();
        for step in 0..count {
            if limit > 0 && times.len() >= limit {
                break;
            }
            let index = if backwards { count - 1 - step } else { step };
            let a = points[index][k];
            let b = points[(index + 1) % points.len()][k];
            if self.value < a.min(b) - margin || self.value > a.max(b) + margin {
                continue;
            }

            let coefficients = spline.coefficients(index)?.axis(self.axis);
            let mut roots: Vec<f64> = segment_roots(coefficients, self.value)
                .into_iter()
                .filter(|t| (-ROOT_DOMAIN..=1.0 + ROOT_DOMAIN).contains(t))
                .map(|t| spline.global_time(index, t.clamp(0.0, 1.0)))
                .collect();
            roots.sort_by(f64::total_cmp);
            if backwards {
                roots.reverse();
            }
            for t in roots {
                // Neighbouring segments share their end points.
                let seen = times.iter().any(|&s| {
                    let gap = (s - t).abs();
                    let gap = if closed { gap.min(1.0 - gap) } else { gap };
                    gap < TOLERANCE
                });
                if seen {
                    continue;
                }
                times.push(t);
            }
        }

        if limit > 0 {
            times.truncate(limit);
        }
        Ok(times)
    }

    /// Executes the query, returning the intersection points.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be evaluated.
    pub fn execute_points<S: ArcLengthStrategy>(&self, curve: &SplineCurve<S>) -> Result<Vec<Point3>> {
        self.execute(curve)?
            .into_iter()
            .map(|t| curve.point_at_time(t))
            .collect()
    }

    /// Executes the query, returning progress values.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be evaluated.
    pub fn execute_progress<S: ArcLengthStrategy>(&self, curve: &SplineCurve<S>) -> Result<Vec<f64>> {
        self.execute(curve)?
            .into_iter()
            .map(|t| curve.progress_from_time(t))
            .collect()
    }
}

/// Local times where one axis polynomial equals `value`.
///
/// A polynomial that is identically `value` matches everywhere; the segment
/// start is reported for it.
fn segment_roots(c: &AxisCoefficients, value: f64) -> Vec<f64> {
    let d = c.c0 - value;
    if [c.c3, c.c2, c.c1, d].iter().all(|x| x.abs() < ZERO_COEFFICIENT) {
        return vec![0.0];
    }
    solve_cubic(c.c3, c.c2, c.c1, d)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::CurveOptions;
    use approx::assert_abs_diff_eq;

    fn straight() -> SplineCurve {
        SplineCurve::new(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)],
            &CurveOptions::default(),
        )
        .unwrap()
    }

    fn zigzag() -> SplineCurve {
        SplineCurve::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 2.0, 0.0),
                Point3::new(2.0, -2.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
            ],
            &CurveOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn straight_line_midpoint() {
        let times = AxisIntersect::new(Axis::X, 5.0).execute(&straight()).unwrap();
        assert_eq!(times.len(), 1);
        assert_abs_diff_eq!(times[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn segment_roots_detect_identity() {
        let c = AxisCoefficients::default();
        assert_eq!(segment_roots(&c, 0.0), vec![0.0]);
        assert!(segment_roots(&c, 1.0).is_empty());
    }

    #[test]
    fn flat_axis_reports_segment_start() {
        // Every point of the straight line has y = 0.
        let times = AxisIntersect::new(Axis::Y, 0.0).execute(&straight()).unwrap();
        assert_eq!(times, vec![0.0]);
    }

    #[test]
    fn miss_returns_nothing() {
        let times = AxisIntersect::new(Axis::X, 20.0).execute(&straight()).unwrap();
        assert!(times.is_empty());
        let times = AxisIntersect::new(Axis::Z, 1.0).execute(&zigzag()).unwrap();
        assert!(times.is_empty());
    }

    #[test]
    fn crossings_are_sorted_and_on_the_plane() {
        let curve = zigzag();
        let times = AxisIntersect::new(Axis::Y, 0.5).execute(&curve).unwrap();
        assert_eq!(times.len(), 4);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        for t in &times {
            assert_abs_diff_eq!(curve.point_at_time(*t).unwrap().y, 0.5, epsilon = 1e-9);
        }
        let points = AxisIntersect::new(Axis::Y, 0.5).execute_points(&curve).unwrap();
        assert!(points.iter().all(|p| (p.y - 0.5).abs() < 1e-9));
    }

    #[test]
    fn shared_endpoints_are_reported_once() {
        let curve = zigzag();
        let times = AxisIntersect::new(Axis::X, 2.0).execute(&curve).unwrap();
        assert_eq!(times.len(), 1);
        assert_abs_diff_eq!(times[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn closed_seam_is_reported_once() {
        let curve = SplineCurve::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &CurveOptions::default().with_closed(true),
        )
        .unwrap();
        let times = AxisIntersect::new(Axis::X, 0.0).execute(&curve).unwrap();
        assert_eq!(times.len(), 2);
        assert_abs_diff_eq!(times[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(times[1], 0.75, epsilon = 1e-12);

        let backwards = AxisIntersect::new(Axis::X, 0.0).with_max(-5).execute(&curve).unwrap();
        assert_eq!(backwards.len(), 2);
    }

    #[test]
    fn max_limits_and_direction() {
        let curve = zigzag();
        let all = AxisIntersect::new(Axis::Y, 0.5).execute(&curve).unwrap();
        let first = AxisIntersect::new(Axis::Y, 0.5).with_max(1).execute(&curve).unwrap();
        assert_eq!(first, vec![all[0]]);
        let last_two = AxisIntersect::new(Axis::Y, 0.5).with_max(-2).execute(&curve).unwrap();
        assert_eq!(last_two, vec![all[3], all[2]]);
    }

    #[test]
    fn progress_matches_time() {
        let curve = zigzag();
        let query = AxisIntersect::new(Axis::Y, 0.5);
        let times = query.execute(&curve).unwrap();
        let progress = query.execute_progress(&curve).unwrap();
        for (t, u) in times.iter().zip(&progress) {
            assert_abs_diff_eq!(curve.progress_from_time(*t).unwrap(), *u);
        }
    }

    #[test]
    fn zero_margin_skips_far_segments() {
        let curve = zigzag();
        let times = AxisIntersect::new(Axis::Y, 1.9)
            .with_margin(0.0)
            .execute(&curve)
            .unwrap();
        assert!(times.len() <= 4);
        for t in &times {
            assert_abs_diff_eq!(curve.point_at_time(*t).unwrap().y, 1.9, epsilon = 1e-9);
        }
    }
}
