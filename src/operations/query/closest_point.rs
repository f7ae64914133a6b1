use tracing::trace;

use crate::error::{QueryError, Result};
use crate::geometry::curve::SplineCurve;
use crate::mapper::ArcLengthStrategy;
use crate::math::Point3;

/// Default convergence threshold of the refinement step.
pub const DEFAULT_THRESHOLD: f64 = 1e-5;

/// Initial refinement step, in progress units.
const INITIAL_STEP: f64 = 1.0 / 200.0;

/// Lookup-table samples per segment when no sample count is given.
const SAMPLES_PER_SEGMENT: usize = 10;

/// Result of a closest point query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestPointResult {
    /// The closest point on the curve.
    pub point: Point3,
    /// Progress at the closest point.
    pub progress: f64,
    /// Time at the closest point.
    pub time: f64,
    /// The distance from the query point to the closest point.
    pub distance: f64,
}

/// Finds the point on a curve closest to a given point.
///
/// A lookup table over progress gives a starting sample, which is refined by
/// probing one step to either side and halving the step when neither probe
/// gets closer. The result is approximate: a lookup table too coarse to
/// separate two nearby branches of the curve can settle on the wrong one.
pub struct ClosestPoint {
    point: Point3,
    threshold: f64,
    samples: Option<usize>,
}

impl ClosestPoint {
    /// Creates a new `ClosestPoint` query.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self {
            point,
            threshold: DEFAULT_THRESHOLD,
            samples: None,
        }
    }

    /// Sets the step size at which refinement stops.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the lookup-table size. Defaults to ten samples per segment of
    /// the open curve.
    #[must_use]
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is not a positive finite number or
    /// the sample count is below 2.
    pub fn execute<S: ArcLengthStrategy>(&self, curve: &SplineCurve<S>) -> Result<ClosestPointResult> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(QueryError::InvalidThreshold(self.threshold).into());
        }
        let samples = self
            .samples
            .unwrap_or_else(|| (curve.points().len() - 1) * SAMPLES_PER_SEGMENT);
        let table = curve.lookup_table(samples, 0.0, 1.0)?;

        let mut progress = 0.0;
        let mut point = self.point;
        let mut distance = f64::INFINITY;
        for sample in table.iter() {
            let d = (sample.point - self.point).norm();
            if d < distance {
                distance = d;
                progress = sample.progress;
                point = sample.point;
            }
        }

        let mut step = INITIAL_STEP;
        let mut probes = 0usize;
        while step >= self.threshold {
            probes += 1;
            if let Some((p, q, d)) = self.probe(curve, progress - step, distance)? {
                (progress, point, distance) = (p, q, d);
            } else if let Some((p, q, d)) = self.probe(curve, progress + step, distance)? {
                (progress, point, distance) = (p, q, d);
            } else {
                step *= 0.5;
            }
        }
        trace!(probes, progress, distance, "closest point converged");

        Ok(ClosestPointResult {
            point,
            progress,
            time: curve.time_from_progress(progress)?,
            distance,
        })
    }

    /// Evaluates `progress` and returns it if it lies on the curve and is
    /// strictly closer than `best`.
    fn probe<S: ArcLengthStrategy>(
        &self,
        curve: &SplineCurve<S>,
        progress: f64,
        best: f64,
    ) -> Result<Option<(f64, Point3, f64)>> {
        if !(0.0..=1.0).contains(&progress) {
            return Ok(None);
        }
        let point = curve.point_at_progress(progress)?;
        let distance = (point - self.point).norm();
        Ok((distance < best).then_some((progress, point, distance)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::CurveOptions;
    use crate::mapper::ArcLengthMethod;
    use approx::assert_abs_diff_eq;

    fn options() -> [CurveOptions; 2] {
        [
            CurveOptions::default(),
            CurveOptions::default().with_arc_length(ArcLengthMethod::Segmented { subdivisions: 300 }),
        ]
    }

    fn straight(options: &CurveOptions) -> SplineCurve {
        SplineCurve::new(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)],
            options,
        )
        .unwrap()
    }

    #[test]
    fn straight_line_projection() {
        for options in options() {
            let curve = straight(&options);
            let r = ClosestPoint::new(Point3::new(5.0, 1.0, 0.0))
                .execute(&curve)
                .unwrap();
            // The minimum lies within the last step that failed to improve,
            // which is below twice the threshold.
            let bound = 2.0 * DEFAULT_THRESHOLD;
            assert_abs_diff_eq!(r.progress, 0.5, epsilon = bound);
            assert_abs_diff_eq!(r.time, 0.5, epsilon = bound);
            assert!((r.point - Point3::new(5.0, 0.0, 0.0)).norm() < bound * curve.length());
            assert_abs_diff_eq!(r.distance, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn beyond_the_end_clamps_to_endpoint() {
        let curve = straight(&CurveOptions::default());
        let r = ClosestPoint::new(Point3::new(14.0, 3.0, 0.0))
            .execute(&curve)
            .unwrap();
        assert_abs_diff_eq!(r.progress, 1.0);
        assert!((r.point - Point3::new(10.0, 0.0, 0.0)).norm() < 1e-12);
        assert_abs_diff_eq!(r.distance, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn point_on_curve_has_zero_distance() {
        let curve = SplineCurve::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(6.0, -1.0, 2.0),
                Point3::new(9.0, 1.0, 0.0),
            ],
            &CurveOptions::default().with_curviness(0.8).with_softness(0.5),
        )
        .unwrap();
        let target = curve.point_at_progress(0.37).unwrap();
        let r = ClosestPoint::new(target).execute(&curve).unwrap();
        assert!(r.distance < 1e-3);
        assert_abs_diff_eq!(r.progress, 0.37, epsilon = 1e-3);
    }

    #[test]
    fn rejects_invalid_settings() {
        let curve = straight(&CurveOptions::default());
        for threshold in [0.0, -1.0, f64::NAN] {
            let r = ClosestPoint::new(Point3::origin())
                .with_threshold(threshold)
                .execute(&curve);
            assert!(r.is_err());
        }
        let r = ClosestPoint::new(Point3::origin()).with_samples(1).execute(&curve);
        assert!(r.is_err());
    }

    #[test]
    fn tighter_threshold_narrows_the_result() {
        let curve = straight(&CurveOptions::default());
        for threshold in [1e-3, 1e-4, 1e-5] {
            let r = ClosestPoint::new(Point3::new(5.0, 1.0, 0.0))
                .with_threshold(threshold)
                .execute(&curve)
                .unwrap();
            assert_abs_diff_eq!(r.progress, 0.5, epsilon = 2.0 * threshold);
        }
    }

    #[test]
    fn coarse_threshold_still_finishes() {
        let curve = straight(&CurveOptions::default());
        let r = ClosestPoint::new(Point3::new(2.5, 1.0, 0.0))
            .with_threshold(0.1)
            .with_samples(3)
            .execute(&curve)
            .unwrap();
        assert!(r.distance >= 1.0 - 1e-12);
        assert!(r.distance.is_finite());
    }
}
