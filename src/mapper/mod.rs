//! Arc-length parameterization of a spline.
//!
//! A [`CurveMapper`] owns the [`Spline`] together with an
//! [`ArcLengthStrategy`] that converts between *time* (the per-segment
//! parameter) and *progress* (normalized distance along the curve). Every
//! mutation rebuilds the spline coefficients first and then lets the strategy
//! rebuild its arc-length data.

pub mod numerical;
pub mod segmented;

pub use numerical::Numerical;
pub use segmented::Segmented;

use std::fmt;

use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::spline::{Evaluation, ShapeParams, Spline};
use crate::math::{Point3, Vector3};

/// Converts between time and progress for a spline.
///
/// Implementations keep precomputed arc-length data, which is refreshed by
/// [`rebuild`](Self::rebuild) every time the spline changes. Inputs passed to
/// the conversion methods are already validated to lie in `[0, 1]`.
pub trait ArcLengthStrategy {
    /// Recomputes the arc-length data for `spline`.
    fn rebuild(&mut self, spline: &Spline);

    /// Cumulative arc lengths; the last entry is the total length.
    fn arc_lengths(&self) -> &[f64];

    /// Total curve length.
    fn total_length(&self) -> f64 {
        self.arc_lengths().last().copied().unwrap_or(0.0)
    }

    /// Maps progress to time. On a zero-length curve both are equal.
    fn time_at(&self, spline: &Spline, progress: f64) -> f64;

    /// Maps time to progress.
    fn progress_at(&self, spline: &Spline, time: f64) -> f64;
}

/// Selects and configures an arc-length strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcLengthMethod {
    /// Uniform polyline subdivision of the whole curve.
    Segmented { subdivisions: usize },
    /// Gauss-Legendre quadrature with a cubic inverse per segment.
    Numerical { order: usize, inverse_samples: usize },
}

impl Default for ArcLengthMethod {
    fn default() -> Self {
        Self::Numerical {
            order: crate::math::quadrature::DEFAULT_ORDER,
            inverse_samples: numerical::DEFAULT_INVERSE_SAMPLES,
        }
    }
}

/// Either strategy, chosen at runtime from an [`ArcLengthMethod`].
#[derive(Debug, Clone)]
pub enum Parameterization {
    Segmented(Segmented),
    Numerical(Numerical),
}

impl Parameterization {
    /// Creates the strategy described by `method`.
    ///
    /// # Errors
    ///
    /// Returns an error if the method's settings are invalid.
    pub fn from_method(method: ArcLengthMethod) -> Result<Self> {
        Ok(match method {
            ArcLengthMethod::Segmented { subdivisions } => {
                Self::Segmented(Segmented::new(subdivisions)?)
            }
            ArcLengthMethod::Numerical {
                order,
                inverse_samples,
            } => Self::Numerical(Numerical::new(order, inverse_samples)?),
        })
    }
}

impl ArcLengthStrategy for Parameterization {
    fn rebuild(&mut self, spline: &Spline) {
        match self {
            Self::Segmented(s) => s.rebuild(spline),
            Self::Numerical(s) => s.rebuild(spline),
        }
    }

    fn arc_lengths(&self) -> &[f64] {
        match self {
            Self::Segmented(s) => s.arc_lengths(),
            Self::Numerical(s) => s.arc_lengths(),
        }
    }

    fn time_at(&self, spline: &Spline, progress: f64) -> f64 {
        match self {
            Self::Segmented(s) => s.time_at(spline, progress),
            Self::Numerical(s) => s.time_at(spline, progress),
        }
    }

    fn progress_at(&self, spline: &Spline, time: f64) -> f64 {
        match self {
            Self::Segmented(s) => s.progress_at(spline, time),
            Self::Numerical(s) => s.progress_at(spline, time),
        }
    }
}

type Listener = Box<dyn FnMut()>;

/// Spline state plus its arc-length strategy.
pub struct CurveMapper<S = Parameterization> {
    spline: Spline,
    strategy: S,
    revision: u64,
    listener: Option<Listener>,
}

impl<S: ArcLengthStrategy> CurveMapper<S> {
    /// Creates a mapper and builds all caches.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given.
    pub fn new(points: Vec<Point3>, shape: ShapeParams, closed: bool, mut strategy: S) -> Result<Self> {
        let spline = Spline::new(points, closed, shape)?;
        strategy.rebuild(&spline);
        debug!(
            segments = spline.segment_count(),
            length = strategy.total_length(),
            "built curve mapper"
        );
        Ok(Self {
            spline,
            strategy,
            revision: 0,
            listener: None,
        })
    }

    /// Returns the spline.
    #[must_use]
    pub fn spline(&self) -> &Spline {
        &self.spline
    }

    /// Returns the arc-length strategy.
    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Number of cache rebuilds since construction.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers a callback run after every successful rebuild, replacing any
    /// previous one.
    pub fn set_listener(&mut self, listener: impl FnMut() + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Replaces the control points.
    ///
    /// Returns `Ok(false)` without rebuilding if the points are unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given.
    pub fn set_points(&mut self, points: Vec<Point3>) -> Result<bool> {
        if points.len() < 2 {
            return Err(GeometryError::InvalidPointCount {
                count: points.len(),
            }
            .into());
        }
        if points == self.spline.points() {
            return Ok(false);
        }
        let spline = Spline::new(points, self.spline.is_closed(), self.spline.shape())?;
        self.commit(spline);
        Ok(true)
    }

    /// Sets the curviness.
    ///
    /// # Errors
    ///
    /// Returns an error if `curviness` is outside `[0, 1]`.
    pub fn set_curviness(&mut self, curviness: f64) -> Result<bool> {
        let current = self.spline.shape();
        let shape = ShapeParams::new(curviness, current.softness())?;
        self.reshape(shape)
    }

    /// Sets the softness.
    ///
    /// # Errors
    ///
    /// Returns an error if `softness` is outside `[0, 1]`.
    pub fn set_softness(&mut self, softness: f64) -> Result<bool> {
        let current = self.spline.shape();
        let shape = ShapeParams::new(current.curviness(), softness)?;
        self.reshape(shape)
    }

    /// Opens or closes the curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the spline cannot be rebuilt.
    pub fn set_closed(&mut self, closed: bool) -> Result<bool> {
        if closed == self.spline.is_closed() {
            return Ok(false);
        }
        let spline = Spline::new(self.spline.points().to_vec(), closed, self.spline.shape())?;
        self.commit(spline);
        Ok(true)
    }

    fn reshape(&mut self, shape: ShapeParams) -> Result<bool> {
        if shape == self.spline.shape() {
            return Ok(false);
        }
        let spline = Spline::new(self.spline.points().to_vec(), self.spline.is_closed(), shape)?;
        self.commit(spline);
        Ok(true)
    }

    /// Installs a freshly built spline, refreshes the strategy and notifies.
    fn commit(&mut self, spline: Spline) {
        self.spline = spline;
        self.strategy.rebuild(&self.spline);
        self.revision += 1;
        debug!(
            revision = self.revision,
            segments = self.spline.segment_count(),
            length = self.strategy.total_length(),
            "rebuilt curve caches"
        );
        if let Some(listener) = self.listener.as_mut() {
            listener();
        }
    }

    /// Evaluates the curve at `time`.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    pub fn evaluate_at(&self, evaluation: Evaluation, time: f64) -> Result<Vector3> {
        let time = GeometryError::check_unit("time", time)?;
        Ok(self.spline.evaluate(evaluation, time))
    }

    /// Total curve length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.strategy.total_length()
    }

    /// Distance along the curve at `progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if `progress` is outside `[0, 1]`.
    pub fn length_at(&self, progress: f64) -> Result<f64> {
        let progress = GeometryError::check_unit("progress", progress)?;
        Ok(progress * self.length())
    }

    /// Converts a distance along the curve to progress.
    ///
    /// A zero-length curve maps every valid length to progress `0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `length` is negative or exceeds the curve length.
    pub fn progress_from_length(&self, length: f64) -> Result<f64> {
        let total = self.length();
        if !(0.0..=total).contains(&length) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "length",
                value: length,
                min: 0.0,
                max: total,
            }
            .into());
        }
        if total <= 0.0 {
            return Ok(0.0);
        }
        Ok(length / total)
    }

    /// Converts progress to time.
    ///
    /// # Errors
    ///
    /// Returns an error if `progress` is outside `[0, 1]`.
    pub fn time_from_progress(&self, progress: f64) -> Result<f64> {
        let progress = GeometryError::check_unit("progress", progress)?;
        Ok(self.strategy.time_at(&self.spline, progress))
    }

    /// Converts time to progress.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    pub fn progress_from_time(&self, time: f64) -> Result<f64> {
        let time = GeometryError::check_unit("time", time)?;
        Ok(self.strategy.progress_at(&self.spline, time))
    }
}

impl<S: fmt::Debug> fmt::Debug for CurveMapper<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveMapper")
            .field("spline", &self.spline)
            .field("strategy", &self.strategy)
            .field("revision", &self.revision)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
