use crate::error::{QueryError, Result};
use crate::geometry::curve::{check_range, SplineCurve};
use crate::mapper::ArcLengthStrategy;
use crate::math::Point3;

/// A polyline approximation of a curve.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
}

/// Samples a curve at evenly spaced progress values.
///
/// Produces `segments + 1` points, so consecutive points are the same
/// distance apart along the curve.
pub struct SamplePoints {
    segments: usize,
    from: f64,
    to: f64,
}

impl SamplePoints {
    /// Creates a new `SamplePoints` query over the whole curve.
    #[must_use]
    pub fn new(segments: usize) -> Self {
        Self {
            segments,
            from: 0.0,
            to: 1.0,
        }
    }

    /// Restricts sampling to the progress range `[from, to]`.
    #[must_use]
    pub fn with_range(mut self, from: f64, to: f64) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Executes the query, returning a polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is zero or the range is invalid.
    pub fn execute<S: ArcLengthStrategy>(&self, curve: &SplineCurve<S>) -> Result<Polyline> {
        if self.segments == 0 {
            return Err(QueryError::EmptySampling { what: "segment" }.into());
        }
        let (from, to) = check_range(self.from, self.to)?;
        #[allow(clippy::cast_precision_loss)]
        let n = self.segments as f64;
        let points = (0..=self.segments)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let progress = from + (to - from) * (i as f64 / n);
                curve.point_at_progress(progress)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Polyline { points })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::CurveOptions;

    fn curve() -> SplineCurve {
        SplineCurve::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 4.0, 0.0),
                Point3::new(5.0, 4.0, 0.0),
                Point3::new(6.0, 0.0, 0.0),
            ],
            &CurveOptions::default().with_softness(0.5),
        )
        .unwrap()
    }

    #[test]
    fn returns_segments_plus_one_points() {
        let c = curve();
        let line = SamplePoints::new(8).execute(&c).unwrap();
        assert_eq!(line.points.len(), 9);
        assert!((line.points[0] - c.points()[0]).norm() < 1e-12);
        assert!((line.points[8] - c.points()[3]).norm() < 1e-12);
    }

    #[test]
    fn points_are_evenly_spaced_along_the_curve() {
        let c = curve();
        let line = SamplePoints::new(10).execute(&c).unwrap();
        let chords: Vec<f64> = line.points.windows(2).map(|w| (w[1] - w[0]).norm()).collect();
        let expected = c.length() / 10.0;
        for chord in chords {
            // Chords are slightly shorter than the arcs they span.
            assert!(chord <= expected + 1e-3);
            assert!(chord > expected * 0.9);
        }
    }

    #[test]
    fn sub_range() {
        let c = curve();
        let line = SamplePoints::new(4).with_range(0.25, 0.75).execute(&c).unwrap();
        assert!((line.points[0] - c.point_at_progress(0.25).unwrap()).norm() < 1e-12);
        assert!((line.points[4] - c.point_at_progress(0.75).unwrap()).norm() < 1e-12);
    }

    #[test]
    fn rejects_empty_sampling() {
        assert!(SamplePoints::new(0).execute(&curve()).is_err());
        assert!(SamplePoints::new(4).with_range(0.5, 0.1).execute(&curve()).is_err());
    }
}
