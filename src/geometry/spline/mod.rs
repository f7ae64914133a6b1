//! Cardinal spline state and its per-segment coefficient cache.

pub mod coefficients;
pub mod segment;

pub use coefficients::{AxisCoefficients, Evaluation, SegmentCoefficients};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

/// Shape parameters of the spline.
///
/// * `curviness` scales the tangents: `0` gives straight chords, `1` a full
///   Catmull-Rom curve.
/// * `softness` selects the knot parameterization: `0` uniform, `0.5`
///   centripetal, `1` chordal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    curviness: f64,
    softness: f64,
}

impl ShapeParams {
    /// Creates validated shape parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] if either value lies
    /// outside `[0, 1]`.
    pub fn new(curviness: f64, softness: f64) -> Result<Self> {
        Ok(Self {
            curviness: GeometryError::check_unit("curviness", curviness)?,
            softness: GeometryError::check_unit("softness", softness)?,
        })
    }

    /// Returns the curviness.
    #[must_use]
    pub fn curviness(&self) -> f64 {
        self.curviness
    }

    /// Returns the softness.
    #[must_use]
    pub fn softness(&self) -> f64 {
        self.softness
    }
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            curviness: 0.5,
            softness: 0.0,
        }
    }
}

/// Control points, shape and the coefficients of every segment.
///
/// A `Spline` is immutable; changing any input builds a new one, so the
/// coefficient cache can never be out of date with respect to the points.
#[derive(Debug, Clone)]
pub struct Spline {
    points: Vec<Point3>,
    closed: bool,
    shape: ShapeParams,
    coefficients: Vec<SegmentCoefficients>,
}

impl Spline {
    /// Builds a spline and computes all segment coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidPointCount`] if fewer than two points
    /// are given.
    pub fn new(points: Vec<Point3>, closed: bool, shape: ShapeParams) -> Result<Self> {
        if points.len() < 2 {
            return Err(GeometryError::InvalidPointCount {
                count: points.len(),
            }
            .into());
        }
        let count = segment::segment_count(points.len(), closed);
        let coefficients = (0..count)
            .map(|i| {
                segment::control_points(i, &points, closed)
                    .map(|cp| coefficients::segment_coefficients(&cp, shape))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            points,
            closed,
            shape,
            coefficients,
        })
    }

    /// Returns the control points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns whether the curve wraps around to its first point.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the shape parameters.
    #[must_use]
    pub fn shape(&self) -> ShapeParams {
        self.shape
    }

    /// Returns the number of cubic segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns the coefficients of segment `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidSegmentIndex`] if the segment does not
    /// exist.
    pub fn coefficients(&self, index: usize) -> Result<&SegmentCoefficients> {
        self.coefficients.get(index).ok_or_else(|| {
            GeometryError::InvalidSegmentIndex {
                index,
                segment_count: self.coefficients.len(),
            }
            .into()
        })
    }

    /// Returns the coefficients of every segment in order.
    #[must_use]
    pub fn all_coefficients(&self) -> &[SegmentCoefficients] {
        &self.coefficients
    }

    /// Evaluates the curve at global `time`.
    ///
    /// `time` is clamped to `[0, 1]`; range checking is the caller's job.
    #[must_use]
    pub fn evaluate(&self, evaluation: Evaluation, time: f64) -> Vector3 {
        let (index, weight) = segment::segment_at(time, self.coefficients.len());
        self.coefficients[index].evaluate(evaluation, weight)
    }

    /// Position at global `time` (clamped to `[0, 1]`).
    #[must_use]
    pub fn point(&self, time: f64) -> Point3 {
        Point3::from(self.evaluate(Evaluation::Value, time))
    }

    /// Converts a segment-local time to global time.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn global_time(&self, index: usize, local: f64) -> f64 {
        (index as f64 + local) / self.coefficients.len() as f64
    }
}
