//! Arc length by Gauss-Legendre quadrature.
//!
//! Segment lengths are integrated directly from the derivative magnitude. To
//! go back from a length to a local time, each segment keeps a handful of
//! `(length, time)` samples together with the reciprocal speed at each
//! sample, and inverts through a monotone cubic Hermite interpolant built on
//! them. The interpolated time is then polished by a couple of Newton steps
//! on the exact length, which only integrates over one sample interval.

use tracing::trace;

use crate::error::{MapperError, Result};
use crate::geometry::spline::{Evaluation, SegmentCoefficients, Spline};
use crate::math::quadrature::{self, Node};
use crate::math::search::floor_index;

use super::ArcLengthStrategy;

/// Inverse samples per segment used when none is configured.
pub const DEFAULT_INVERSE_SAMPLES: usize = 21;

/// Below this curviness the reciprocal speed is clamped to `[-1, 1]`; near
/// linear segments otherwise produce huge slopes at the segment ends.
const SLOPE_CLAMP_CURVINESS: f64 = 0.05;

/// Newton steps applied to an interpolated local time.
const REFINE_STEPS: usize = 2;

/// Length-to-time samples of one segment.
#[derive(Debug, Clone, Default)]
pub struct InverseSamples {
    /// Cumulative length at each sample time, starting at `0`.
    pub lengths: Vec<f64>,
    /// `dt/dl` at each sample.
    pub slopes: Vec<f64>,
    /// Degree-2 coefficient of each interval's cubic.
    pub quadratic: Vec<f64>,
    /// Degree-3 coefficient of each interval's cubic.
    pub cubic: Vec<f64>,
}

/// Quadrature-based arc-length strategy.
#[derive(Debug, Clone)]
pub struct Numerical {
    nodes: &'static [Node],
    inverse_samples: usize,
    arc_lengths: Vec<f64>,
    inverses: Vec<InverseSamples>,
}

impl Numerical {
    /// Creates the strategy with the given quadrature order and number of
    /// inverse samples per segment.
    ///
    /// # Errors
    ///
    /// Returns an error if `order` is not a supported Gauss-Legendre order or
    /// `inverse_samples` is below 2.
    pub fn new(order: usize, inverse_samples: usize) -> Result<Self> {
        let nodes = quadrature::rule(order)?;
        if inverse_samples < 2 {
            return Err(MapperError::InvalidSampleCount {
                what: "inverse samples",
                count: inverse_samples,
                min: 2,
            }
            .into());
        }
        Ok(Self {
            nodes,
            inverse_samples,
            arc_lengths: vec![0.0],
            inverses: Vec::new(),
        })
    }

    /// Returns the quadrature order.
    #[must_use]
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the inverse samples of `segment`, if it exists.
    #[must_use]
    pub fn inverse_samples(&self, segment: usize) -> Option<&InverseSamples> {
        self.inverses.get(segment)
    }

    /// Arc length of one segment between local times `t0` and `t1`.
    #[must_use]
    pub fn segment_length(&self, coefficients: &SegmentCoefficients, t0: f64, t1: f64) -> f64 {
        quadrature::integrate(self.nodes, t0, t1, |t| {
            coefficients.evaluate(Evaluation::Derivative, t).norm()
        })
    }

    /// Local time within `segment` at distance `length` from its start.
    ///
    /// Lengths outside the segment clamp to `0` or `1`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    pub fn segment_time_at_length(&self, segment: usize, length: f64) -> f64 {
        let Some(inv) = self.inverses.get(segment) else {
            return 0.0;
        };
        let Some(&segment_length) = inv.lengths.last() else {
            return 0.0;
        };
        if length >= segment_length {
            return 1.0;
        }
        if length <= 0.0 {
            return 0.0;
        }

        let step = 1.0 / (inv.lengths.len() - 1) as f64;
        let i = floor_index(length, &inv.lengths).min(inv.cubic.len().saturating_sub(1));
        let ti = i as f64 * step;
        if inv.lengths[i] == length {
            return ti;
        }
        let ld = length - inv.lengths[i];
        let t = ((inv.cubic[i] * ld + inv.quadratic[i]) * ld + inv.slopes[i]) * ld + ti;
        t.clamp(0.0, 1.0)
    }

    /// Refines `estimate`, a local time for `length` within `segment`, with
    /// Newton steps on the integrated length. Steps that would leave the
    /// sample interval bracketing `length` are rejected.
    #[allow(clippy::cast_precision_loss)]
    fn refine(&self, coefficients: &SegmentCoefficients, segment: usize, length: f64, estimate: f64) -> f64 {
        let Some(inv) = self.inverses.get(segment) else {
            return estimate;
        };
        let Some(&segment_length) = inv.lengths.last() else {
            return estimate;
        };
        if inv.lengths.len() < 2 || length <= 0.0 || length >= segment_length {
            return estimate;
        }
        let step = 1.0 / (inv.lengths.len() - 1) as f64;
        let i = floor_index(length, &inv.lengths).min(inv.lengths.len() - 2);
        let (lo, hi) = (i as f64 * step, (i + 1) as f64 * step);

        let mut t = estimate;
        for _ in 0..REFINE_STEPS {
            let error = inv.lengths[i] + self.segment_length(coefficients, lo, t) - length;
            let speed = coefficients.evaluate(Evaluation::Derivative, t).norm();
            if speed <= 0.0 {
                break;
            }
            let next = t - error / speed;
            if !(lo..=hi).contains(&next) {
                break;
            }
            t = next;
        }
        t
    }

    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn build_inverse(&self, coefficients: &SegmentCoefficients, curviness: f64) -> InverseSamples {
        let n = self.inverse_samples;
        let mut lengths = Vec::with_capacity(n);
        let mut slopes = Vec::with_capacity(n);

        let mut accumulated = 0.0;
        let mut previous = 0.0;
        for i in 0..n {
            let ti = i as f64 / (n - 1) as f64;
            accumulated += self.segment_length(coefficients, previous, ti);
            previous = ti;
            lengths.push(accumulated);

            // A stationary sample has unbounded dt/dl. Under the clamp it
            // takes the clamp bound, otherwise the limiter below caps it.
            let speed = coefficients.evaluate(Evaluation::Derivative, ti).norm();
            let clamped = curviness < SLOPE_CLAMP_CURVINESS;
            let slope = if speed > 0.0 {
                1.0 / speed
            } else if clamped {
                1.0
            } else {
                0.0
            };
            slopes.push(if clamped { slope.clamp(-1.0, 1.0) } else { slope });
        }

        let step = 1.0 / (n - 1) as f64;
        limit_slopes(&lengths, &mut slopes, step);

        let mut quadratic = Vec::with_capacity(n - 1);
        let mut cubic = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let dl = lengths[i + 1] - lengths[i];
            if dl <= 0.0 {
                quadratic.push(0.0);
                cubic.push(0.0);
                continue;
            }
            let secant = step / dl;
            let (m0, m1) = (slopes[i], slopes[i + 1]);
            quadratic.push((3.0 * secant - 2.0 * m0 - m1) / dl);
            cubic.push((m0 + m1 - 2.0 * secant) / (dl * dl));
        }

        InverseSamples {
            lengths,
            slopes,
            quadratic,
            cubic,
        }
    }
}

/// Fritsch-Carlson limiting: rescales neighbouring slopes wherever they
/// would let the cubic on an interval overshoot, so the inverse stays
/// monotone in length.
fn limit_slopes(lengths: &[f64], slopes: &mut [f64], step: f64) {
    for i in 0..slopes.len().saturating_sub(1) {
        let dl = lengths[i + 1] - lengths[i];
        if dl <= 0.0 {
            continue;
        }
        let secant = step / dl;
        slopes[i] = slopes[i].max(0.0);
        slopes[i + 1] = slopes[i + 1].max(0.0);
        let alpha = slopes[i] / secant;
        let beta = slopes[i + 1] / secant;
        let radius = alpha * alpha + beta * beta;
        if radius > 9.0 {
            let tau = 3.0 / radius.sqrt();
            slopes[i] = tau * alpha * secant;
            slopes[i + 1] = tau * beta * secant;
        }
    }
}

impl Default for Numerical {
    fn default() -> Self {
        Self {
            nodes: quadrature::default_rule(),
            inverse_samples: DEFAULT_INVERSE_SAMPLES,
            arc_lengths: vec![0.0],
            inverses: Vec::new(),
        }
    }
}

impl ArcLengthStrategy for Numerical {
    fn rebuild(&mut self, spline: &Spline) {
        let curviness = spline.shape().curviness();
        let mut arc_lengths = Vec::with_capacity(spline.segment_count() + 1);
        let mut inverses = Vec::with_capacity(spline.segment_count());
        let mut total = 0.0;
        arc_lengths.push(0.0);
        for coefficients in spline.all_coefficients() {
            let inverse = self.build_inverse(coefficients, curviness);
            total += inverse.lengths.last().copied().unwrap_or(0.0);
            arc_lengths.push(total);
            inverses.push(inverse);
        }
        trace!(
            order = self.nodes.len(),
            samples = self.inverse_samples,
            length = total,
            "numerical arc lengths"
        );
        self.arc_lengths = arc_lengths;
        self.inverses = inverses;
    }

    fn arc_lengths(&self) -> &[f64] {
        &self.arc_lengths
    }

    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn time_at(&self, spline: &Spline, progress: f64) -> f64 {
        if progress <= 0.0 {
            return 0.0;
        }
        if progress >= 1.0 {
            return 1.0;
        }
        let total = self.total_length();
        if total <= 0.0 {
            return progress;
        }
        let lengths = &self.arc_lengths;
        let segments = lengths.len() - 1;
        let target = progress * total;
        let i = floor_index(target, lengths);
        if lengths[i] == target || i >= segments {
            return i as f64 / segments as f64;
        }
        let length = target - lengths[i];
        let mut local = self.segment_time_at_length(i, length);
        if let Ok(coefficients) = spline.coefficients(i) {
            local = self.refine(coefficients, i, length, local);
        }
        spline.global_time(i, local)
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::float_cmp
    )]
    fn progress_at(&self, spline: &Spline, time: f64) -> f64 {
        if time <= 0.0 {
            return 0.0;
        }
        if time >= 1.0 {
            return 1.0;
        }
        let total = self.total_length();
        if total <= 0.0 {
            return time;
        }
        let segments = self.arc_lengths.len() - 1;
        let scaled = time * segments as f64;
        let sub = (scaled.floor() as usize).min(segments - 1);
        let before = self.arc_lengths[sub];
        if scaled == sub as f64 {
            return before / total;
        }
        let Ok(coefficients) = spline.coefficients(sub) else {
            return before / total;
        };
        let partial = self.segment_length(coefficients, 0.0, scaled - sub as f64);
        ((before + partial) / total).min(1.0)
    }
}
