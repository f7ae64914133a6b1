//! Rotation-minimizing frames along a curve.
//!
//! The first normal is chosen perpendicular to the initial tangent; every
//! later frame is the previous one rotated by the smallest rotation carrying
//! the previous tangent onto the current one (parallel transport). On a
//! closed curve sampled end to end the accumulated twist is spread evenly
//! over all frames so the last frame matches the first.
//!
//! At stationary points the derivative vanishes and the tangent is taken
//! from a short chord around the sample instead.

use nalgebra::{Unit, UnitQuaternion};

use crate::error::{QueryError, Result};
use crate::geometry::curve::{check_range, SplineCurve};
use crate::mapper::ArcLengthStrategy;
use crate::math::{normalize_or_zero, Vector3, TOLERANCE};

/// Progress offset of the chord used where the derivative vanishes.
const CHORD_OFFSET: f64 = 1e-4;

/// An orthonormal frame at one curve location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Progress of the sample.
    pub progress: f64,
    /// Tangent direction (forward along curve).
    pub tangent: Vector3,
    /// Normal direction (perpendicular to tangent).
    pub normal: Vector3,
    /// Binormal direction (`tangent x normal`).
    pub binormal: Vector3,
}

/// Computes parallel-transport frames at evenly spaced progress values.
pub struct FrenetFrames {
    segments: usize,
    from: f64,
    to: f64,
}

impl FrenetFrames {
    /// Creates a new `FrenetFrames` query producing `segments + 1` frames
    /// over the whole curve.
    #[must_use]
    pub fn new(segments: usize) -> Self {
        Self {
            segments,
            from: 0.0,
            to: 1.0,
        }
    }

    /// Restricts the frames to the progress range `[from, to]`.
    #[must_use]
    pub fn with_range(mut self, from: f64, to: f64) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is zero or the range is invalid.
    #[allow(clippy::float_cmp)]
    pub fn execute<S: ArcLengthStrategy>(&self, curve: &SplineCurve<S>) -> Result<Vec<Frame>> {
        if self.segments == 0 {
            return Err(QueryError::EmptySampling { what: "segment" }.into());
        }
        let (from, to) = check_range(self.from, self.to)?;
        #[allow(clippy::cast_precision_loss)]
        let n = self.segments as f64;

        let mut frames: Vec<Frame> = Vec::with_capacity(self.segments + 1);
        for i in 0..=self.segments {
            #[allow(clippy::cast_precision_loss)]
            let progress = from + (to - from) * (i as f64 / n);
            let tangent = direction_at(curve, progress)?;
            let frame = match frames.last() {
                Some(previous) if previous.normal != Vector3::zeros() => {
                    transport(previous, progress, tangent)
                }
                _ => initial_frame(progress, tangent),
            };
            frames.push(frame);
        }

        if curve.is_closed() && from == 0.0 && to == 1.0 {
            close_twist(&mut frames);
        }
        Ok(frames)
    }
}

/// Unit tangent at `progress`, falling back to a chord direction where the
/// curve is stationary.
fn direction_at<S: ArcLengthStrategy>(curve: &SplineCurve<S>, progress: f64) -> Result<Vector3> {
    let tangent = curve.tangent_at_progress(progress)?;
    if tangent != Vector3::zeros() {
        return Ok(tangent);
    }
    let before = curve.point_at_progress((progress - CHORD_OFFSET).max(0.0))?;
    let after = curve.point_at_progress((progress + CHORD_OFFSET).min(1.0))?;
    Ok(normalize_or_zero(&(after - before)))
}

fn initial_frame(progress: f64, tangent: Vector3) -> Frame {
    // Seed the normal from the axis least aligned with the tangent.
    let abs = tangent.abs();
    let axis = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let side = tangent.cross(&axis).try_normalize(TOLERANCE).unwrap_or_else(Vector3::zeros);
    let normal = tangent.cross(&side);
    Frame {
        progress,
        tangent,
        normal,
        binormal: tangent.cross(&normal),
    }
}

fn transport(previous: &Frame, progress: f64, tangent: Vector3) -> Frame {
    let mut normal = previous.normal;
    if let Some(axis) = Unit::try_new(previous.tangent.cross(&tangent), TOLERANCE) {
        let angle = previous.tangent.dot(&tangent).clamp(-1.0, 1.0).acos();
        normal = UnitQuaternion::from_axis_angle(&axis, angle) * normal;
    }
    Frame {
        progress,
        tangent,
        normal,
        binormal: tangent.cross(&normal),
    }
}

fn close_twist(frames: &mut [Frame]) {
    let (Some(first), Some(last)) = (frames.first().copied(), frames.last().copied()) else {
        return;
    };
    #[allow(clippy::cast_precision_loss)]
    let segments = (frames.len() - 1) as f64;
    let mut theta = first.normal.dot(&last.normal).clamp(-1.0, 1.0).acos() / segments;
    if first.tangent.dot(&first.normal.cross(&last.normal)) > 0.0 {
        theta = -theta;
    }
    for (i, frame) in frames.iter_mut().enumerate().skip(1) {
        let Some(axis) = Unit::try_new(frame.tangent, TOLERANCE) else {
            continue;
        };
        #[allow(clippy::cast_precision_loss)]
        let angle = theta * i as f64;
        frame.normal = UnitQuaternion::from_axis_angle(&axis, angle) * frame.normal;
        frame.binormal = frame.tangent.cross(&frame.normal);
    }
}
