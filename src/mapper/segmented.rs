use tracing::trace;

use crate::error::{MapperError, Result};
use crate::geometry::spline::Spline;
use crate::math::search::floor_index;

use super::ArcLengthStrategy;

/// Subdivisions used when none is configured.
pub const DEFAULT_SUBDIVISIONS: usize = 300;

/// Arc length by uniform polyline subdivision of the whole curve.
///
/// The curve is sampled at `subdivisions + 1` evenly spaced times and the
/// chord lengths between consecutive samples are accumulated.
#[derive(Debug, Clone)]
pub struct Segmented {
    subdivisions: usize,
    arc_lengths: Vec<f64>,
}

impl Segmented {
    /// Creates the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::InvalidSampleCount`] if `subdivisions` is zero.
    pub fn new(subdivisions: usize) -> Result<Self> {
        if subdivisions == 0 {
            return Err(MapperError::InvalidSampleCount {
                what: "subdivisions",
                count: subdivisions,
                min: 1,
            }
            .into());
        }
        Ok(Self {
            subdivisions,
            arc_lengths: vec![0.0],
        })
    }

    /// Returns the number of subdivisions.
    #[must_use]
    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }
}

impl Default for Segmented {
    fn default() -> Self {
        Self {
            subdivisions: DEFAULT_SUBDIVISIONS,
            arc_lengths: vec![0.0],
        }
    }
}

impl ArcLengthStrategy for Segmented {
    #[allow(clippy::cast_precision_loss)]
    fn rebuild(&mut self, spline: &Spline) {
        let n = self.subdivisions;
        let mut lengths = Vec::with_capacity(n + 1);
        let mut last = spline.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);
        for i in 1..=n {
            let current = spline.point(i as f64 / n as f64);
            sum += (current - last).norm();
            lengths.push(sum);
            last = current;
        }
        trace!(subdivisions = n, length = sum, "segmented arc lengths");
        self.arc_lengths = lengths;
    }

    fn arc_lengths(&self) -> &[f64] {
        &self.arc_lengths
    }

    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn time_at(&self, _spline: &Spline, progress: f64) -> f64 {
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
        let steps = (lengths.len() - 1) as f64;
        let target = progress * total;
        let i = floor_index(target, lengths);
        if lengths[i] == target || i + 1 >= lengths.len() {
            return i as f64 / steps;
        }
        let before = lengths[i];
        let span = lengths[i + 1] - before;
        let fraction = if span > 0.0 {
            (target - before) / span
        } else {
            0.0
        };
        (i as f64 + fraction) / steps
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
        let lengths = &self.arc_lengths;
        let steps = lengths.len() - 1;
        let scaled = time * steps as f64;
        let sub = (scaled.floor() as usize).min(steps);
        let before = lengths[sub];
        if scaled == sub as f64 {
            return before / total;
        }
        let sample = spline.point(sub as f64 / steps as f64);
        let exact = spline.point(time);
        ((before + (exact - sample).norm()) / total).min(1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::spline::ShapeParams;
    use crate::math::Point3;
    use approx::assert_abs_diff_eq;

    fn straight(curviness: f64) -> Spline {
        Spline::new(
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)],
            false,
            ShapeParams::new(curviness, 0.0).unwrap(),
        )
        .unwrap()
    }

    fn built(spline: &Spline, subdivisions: usize) -> Segmented {
        let mut s = Segmented::new(subdivisions).unwrap();
        s.rebuild(spline);
        s
    }

    #[test]
    fn zero_subdivisions_rejected() {
        assert!(Segmented::new(0).is_err());
    }

    #[test]
    fn table_has_one_entry_per_sample() {
        let spline = straight(0.5);
        let s = built(&spline, 50);
        assert_eq!(s.arc_lengths().len(), 51);
        assert!(s.arc_lengths().windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn straight_line_length() {
        let spline = straight(0.0);
        let s = built(&spline, 300);
        assert_abs_diff_eq!(s.total_length(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn progress_inverts_time() {
        let spline = Spline::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(3.0, 4.0, 0.0),
                Point3::new(7.0, 1.0, 2.0),
            ],
            false,
            ShapeParams::new(1.0, 0.5).unwrap(),
        )
        .unwrap();
        let s = built(&spline, 300);
        for i in 1..20 {
            let u = f64::from(i) / 20.0;
            let t = s.time_at(&spline, u);
            assert_abs_diff_eq!(s.progress_at(&spline, t), u, epsilon = 1e-4);
        }
    }

    #[test]
    fn exact_sample_hits_use_table() {
        let spline = straight(0.0);
        let s = built(&spline, 4);
        let expected = s.arc_lengths()[2] / s.total_length();
        assert_abs_diff_eq!(s.progress_at(&spline, 0.5), expected);
    }

    #[test]
    fn degenerate_curve_has_zero_length() {
        let spline = Spline::new(
            vec![Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0)],
            false,
            ShapeParams::default(),
        )
        .unwrap();
        let s = built(&spline, 10);
        assert_abs_diff_eq!(s.total_length(), 0.0);
        assert_abs_diff_eq!(s.time_at(&spline, 0.0), 0.0);
        assert_abs_diff_eq!(s.time_at(&spline, 1.0), 1.0);
        assert_abs_diff_eq!(s.time_at(&spline, 0.4), 0.4);
        assert_abs_diff_eq!(s.progress_at(&spline, 0.4), 0.4);
    }
}
