//! Per-segment cubic coefficients of the cardinal spline.
//!
//! Each segment is a cubic Hermite curve between its two middle control
//! points. The end tangents are estimated from all four control points and
//! scaled by the curviness; softness selects the knot parameterization used
//! for those estimates.

use crate::math::{Axis, Point3, Vector3, COINCIDENT_KNOTS};

use super::ShapeParams;

/// Which quantity to evaluate on a segment polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Position.
    Value,
    /// First derivative with respect to local time.
    Derivative,
    /// Second derivative with respect to local time.
    SecondDerivative,
}

/// Power-basis coefficients of one axis: `c3*t^3 + c2*t^2 + c1*t + c0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisCoefficients {
    pub c3: f64,
    pub c2: f64,
    pub c1: f64,
    pub c0: f64,
}

impl AxisCoefficients {
    /// Converts Hermite data (start/end values, start/end tangents) to the
    /// power basis.
    #[must_use]
    pub fn from_hermite(start: f64, end: f64, start_tangent: f64, end_tangent: f64) -> Self {
        Self {
            c3: 2.0 * start - 2.0 * end + start_tangent + end_tangent,
            c2: -3.0 * start + 3.0 * end - 2.0 * start_tangent - end_tangent,
            c1: start_tangent,
            c0: start,
        }
    }

    /// Value at local time `t`.
    #[must_use]
    pub fn value(&self, t: f64) -> f64 {
        self.c0 + t * (self.c1 + t * (self.c2 + t * self.c3))
    }

    /// First derivative at local time `t`.
    #[must_use]
    pub fn derivative(&self, t: f64) -> f64 {
        self.c1 + t * (2.0 * self.c2 + t * 3.0 * self.c3)
    }

    /// Second derivative at local time `t`.
    #[must_use]
    pub fn second_derivative(&self, t: f64) -> f64 {
        6.0 * self.c3 * t + 2.0 * self.c2
    }

    /// Evaluates the selected quantity at local time `t`.
    #[must_use]
    pub fn evaluate(&self, evaluation: Evaluation, t: f64) -> f64 {
        match evaluation {
            Evaluation::Value => self.value(t),
            Evaluation::Derivative => self.derivative(t),
            Evaluation::SecondDerivative => self.second_derivative(t),
        }
    }
}

/// Coefficients of one segment for all three axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SegmentCoefficients {
    axes: [AxisCoefficients; 3],
}

impl SegmentCoefficients {
    /// Returns the coefficients of `axis`.
    #[must_use]
    pub fn axis(&self, axis: Axis) -> &AxisCoefficients {
        &self.axes[axis.index()]
    }

    /// Evaluates the selected quantity at local time `t` on all axes.
    #[must_use]
    pub fn evaluate(&self, evaluation: Evaluation, t: f64) -> Vector3 {
        Vector3::new(
            self.axes[0].evaluate(evaluation, t),
            self.axes[1].evaluate(evaluation, t),
            self.axes[2].evaluate(evaluation, t),
        )
    }

    /// Position at local time `t`.
    #[must_use]
    pub fn point(&self, t: f64) -> Point3 {
        Point3::from(self.evaluate(Evaluation::Value, t))
    }
}

/// Computes the knot sequence for the given control points.
///
/// Returns `None` for uniform parameterization (`softness = 0`). Otherwise
/// knot gaps are `|P(i+1) - P(i)|^softness`, i.e. the squared distance raised
/// to `softness / 2`.
#[must_use]
pub fn knot_sequence(control_points: &[Point3; 4], softness: f64) -> Option<[f64; 4]> {
    if softness <= 0.0 {
        return None;
    }
    let exponent = 0.5 * softness;
    let gap = |a: &Point3, b: &Point3| (b - a).norm_squared().powf(exponent);

    let t1 = gap(&control_points[0], &control_points[1]);
    let t2 = t1 + gap(&control_points[1], &control_points[2]);
    let t3 = t2 + gap(&control_points[2], &control_points[3]);
    Some([0.0, t1, t2, t3])
}

/// Computes the segment coefficients from its four control points.
#[must_use]
pub fn segment_coefficients(control_points: &[Point3; 4], shape: ShapeParams) -> SegmentCoefficients {
    let knots = knot_sequence(control_points, shape.softness());
    let mut axes = [AxisCoefficients::default(); 3];
    for axis in Axis::ALL {
        let k = axis.index();
        let values = [
            control_points[0][k],
            control_points[1][k],
            control_points[2][k],
            control_points[3][k],
        ];
        let (u, v) = tangents(values, knots, shape.curviness());
        axes[k] = AxisCoefficients::from_hermite(values[1], values[2], u, v);
    }
    SegmentCoefficients { axes }
}

/// Estimates the start and end tangents of one axis.
fn tangents(v: [f64; 4], knots: Option<[f64; 4]>, curviness: f64) -> (f64, f64) {
    let Some(t) = knots else {
        return (
            curviness * (v[2] - v[0]) * 0.5,
            curviness * (v[3] - v[1]) * 0.5,
        );
    };

    let distinct = |a: f64, b: f64| (a - b).abs() > COINCIDENT_KNOTS;
    let mut u = 0.0;
    let mut w = 0.0;
    if distinct(t[1], t[2]) {
        let scale = curviness * (t[2] - t[1]);
        if distinct(t[0], t[1]) && distinct(t[0], t[2]) {
            u = scale
                * ((v[0] - v[1]) / (t[0] - t[1]) - (v[0] - v[2]) / (t[0] - t[2])
                    + (v[1] - v[2]) / (t[1] - t[2]));
        }
        if distinct(t[1], t[3]) && distinct(t[2], t[3]) {
            w = scale
                * ((v[1] - v[2]) / (t[1] - t[2]) - (v[1] - v[3]) / (t[1] - t[3])
                    + (v[2] - v[3]) / (t[2] - t[3]));
        }
    }
    (u, w)
}
