use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::{GeometryError, QueryError, Result};
use crate::geometry::spline::{Evaluation, ShapeParams, Spline};
use crate::mapper::{ArcLengthStrategy, CurveMapper, Parameterization};
use crate::math::{normalize_or_zero, Point3, Vector3};

use super::CurveOptions;

/// One entry of a lookup table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupSample {
    /// Progress of the sample.
    pub progress: f64,
    /// Curve position at that progress.
    pub point: Point3,
}

/// Curvature of the curve at a single location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curvature {
    /// `|d x d2| / |d|^3`, or `0` where the curve is stationary.
    pub curvature: f64,
    /// `1 / curvature`, or `0` where the curvature is zero.
    pub radius: f64,
    /// Unit tangent.
    pub tangent: Vector3,
    /// Unit principal normal, zero on straight runs.
    pub normal: Vector3,
}

/// `(samples, from bits, to bits)`
type LookupKey = (usize, u64, u64);

type Listener = Box<dyn FnMut()>;

/// A cardinal spline curve with arc-length parameterization.
///
/// Positions can be queried either by *time*, which advances uniformly per
/// segment, or by *progress*, which advances uniformly with distance along
/// the curve.
pub struct SplineCurve<S = Parameterization> {
    mapper: CurveMapper<S>,
    intersection_margin: Option<f64>,
    lookup_cache: RefCell<HashMap<LookupKey, Rc<[LookupSample]>>>,
    listener: Option<Listener>,
}

impl SplineCurve {
    /// Builds a curve through `points` using the arc-length strategy named in
    /// `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given, a shape parameter
    /// is outside `[0, 1]`, the strategy settings are invalid or the
    /// intersection margin is negative.
    pub fn new(points: Vec<Point3>, options: &CurveOptions) -> Result<Self> {
        let shape = ShapeParams::new(options.curviness, options.softness)?;
        let strategy = Parameterization::from_method(options.arc_length)?;
        let mut curve = Self::with_strategy(points, shape, options.closed, strategy)?;
        if let Some(margin) = options.intersection_margin {
            curve.intersection_margin = Some(check_margin(margin)?);
        }
        Ok(curve)
    }
}

impl<S: ArcLengthStrategy> SplineCurve<S> {
    /// Builds a curve with an explicit strategy value.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given.
    pub fn with_strategy(points: Vec<Point3>, shape: ShapeParams, closed: bool, strategy: S) -> Result<Self> {
        Ok(Self {
            mapper: CurveMapper::new(points, shape, closed, strategy)?,
            intersection_margin: None,
            lookup_cache: RefCell::new(HashMap::new()),
            listener: None,
        })
    }

    /// Returns the underlying mapper.
    #[must_use]
    pub fn mapper(&self) -> &CurveMapper<S> {
        &self.mapper
    }

    /// Returns the spline and its coefficients.
    #[must_use]
    pub fn spline(&self) -> &Spline {
        self.mapper.spline()
    }

    /// Returns the control points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        self.spline().points()
    }

    /// Returns the curviness.
    #[must_use]
    pub fn curviness(&self) -> f64 {
        self.spline().shape().curviness()
    }

    /// Returns the softness.
    #[must_use]
    pub fn softness(&self) -> f64 {
        self.spline().shape().softness()
    }

    /// Returns whether the curve is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.spline().is_closed()
    }

    /// Margin used by axis-intersection searches.
    #[must_use]
    pub fn intersection_margin(&self) -> f64 {
        self.intersection_margin.unwrap_or_else(|| self.curviness())
    }

    /// Registers a callback run after every change, once the arc-length data
    /// is rebuilt and the lookup tables are dropped. Replaces any previous
    /// callback.
    pub fn on_change(&mut self, listener: impl FnMut() + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Replaces the control points. See [`CurveMapper::set_points`].
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given.
    pub fn set_points(&mut self, points: Vec<Point3>) -> Result<bool> {
        let changed = self.mapper.set_points(points)?;
        self.invalidate(changed);
        Ok(changed)
    }

    /// Sets the curviness.
    ///
    /// # Errors
    ///
    /// Returns an error if `curviness` is outside `[0, 1]`.
    pub fn set_curviness(&mut self, curviness: f64) -> Result<bool> {
        let changed = self.mapper.set_curviness(curviness)?;
        self.invalidate(changed);
        Ok(changed)
    }

    /// Sets the softness.
    ///
    /// # Errors
    ///
    /// Returns an error if `softness` is outside `[0, 1]`.
    pub fn set_softness(&mut self, softness: f64) -> Result<bool> {
        let changed = self.mapper.set_softness(softness)?;
        self.invalidate(changed);
        Ok(changed)
    }

    /// Opens or closes the curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the spline cannot be rebuilt.
    pub fn set_closed(&mut self, closed: bool) -> Result<bool> {
        let changed = self.mapper.set_closed(closed)?;
        self.invalidate(changed);
        Ok(changed)
    }

    fn invalidate(&mut self, changed: bool) {
        if !changed {
            return;
        }
        self.lookup_cache.get_mut().clear();
        if let Some(listener) = self.listener.as_mut() {
            listener();
        }
    }

    /// Total length of the curve.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.mapper.length()
    }

    /// Distance along the curve at `progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if `progress` is outside `[0, 1]`.
    pub fn length_at(&self, progress: f64) -> Result<f64> {
        self.mapper.length_at(progress)
    }

    /// Progress at distance `length` from the start.
    ///
    /// # Errors
    ///
    /// Returns an error if `length` is negative or longer than the curve.
    pub fn progress_from_length(&self, length: f64) -> Result<f64> {
        self.mapper.progress_from_length(length)
    }

    /// Time at `progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if `progress` is outside `[0, 1]`.
    pub fn time_from_progress(&self, progress: f64) -> Result<f64> {
        self.mapper.time_from_progress(progress)
    }

    /// Progress at `time`.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    pub fn progress_from_time(&self, time: f64) -> Result<f64> {
        self.mapper.progress_from_time(time)
    }

    /// Position at `time`.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    pub fn point_at_time(&self, time: f64) -> Result<Point3> {
        self.mapper.evaluate_at(Evaluation::Value, time).map(Point3::from)
    }

    /// First derivative with respect to segment-local time.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    pub fn derivative_at_time(&self, time: f64) -> Result<Vector3> {
        self.mapper.evaluate_at(Evaluation::Derivative, time)
    }

    /// Second derivative with respect to segment-local time.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    pub fn second_derivative_at_time(&self, time: f64) -> Result<Vector3> {
        self.mapper.evaluate_at(Evaluation::SecondDerivative, time)
    }

    /// Unit tangent at `time`; zero at stationary points.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    pub fn tangent_at_time(&self, time: f64) -> Result<Vector3> {
        Ok(normalize_or_zero(&self.derivative_at_time(time)?))
    }

    /// Unit principal normal at `time`; zero where the curve is straight.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    pub fn normal_at_time(&self, time: f64) -> Result<Vector3> {
        let d = self.derivative_at_time(time)?;
        let d2 = self.second_derivative_at_time(time)?;
        Ok(principal_normal(&d, &d2))
    }

    /// Curvature, radius, tangent and normal at `time`.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is outside `[0, 1]`.
    #[allow(clippy::float_cmp)]
    pub fn curvature_at_time(&self, time: f64) -> Result<Curvature> {
        let d = self.derivative_at_time(time)?;
        let d2 = self.second_derivative_at_time(time)?;
        let speed = d.norm();
        let curvature = if speed == 0.0 {
            0.0
        } else {
            d.cross(&d2).norm() / speed.powi(3)
        };
        let radius = if curvature == 0.0 { 0.0 } else { 1.0 / curvature };
        Ok(Curvature {
            curvature,
            radius,
            tangent: normalize_or_zero(&d),
            normal: principal_normal(&d, &d2),
        })
    }

    /// # Errors
    ///
    /// Returns an error if `progress` is outside `[0, 1]`.
    pub fn point_at_progress(&self, progress: f64) -> Result<Point3> {
        self.point_at_time(self.time_from_progress(progress)?)
    }

    /// # Errors
    ///
    /// Returns an error if `progress` is outside `[0, 1]`.
    pub fn tangent_at_progress(&self, progress: f64) -> Result<Vector3> {
        self.tangent_at_time(self.time_from_progress(progress)?)
    }

    /// # Errors
    ///
    /// Returns an error if `progress` is outside `[0, 1]`.
    pub fn normal_at_progress(&self, progress: f64) -> Result<Vector3> {
        self.normal_at_time(self.time_from_progress(progress)?)
    }

    /// # Errors
    ///
    /// Returns an error if `progress` is outside `[0, 1]`.
    pub fn curvature_at_progress(&self, progress: f64) -> Result<Curvature> {
        self.curvature_at_time(self.time_from_progress(progress)?)
    }

    /// Points at `samples` evenly spaced progress values over `[from, to]`.
    ///
    /// Tables are memoized per `(samples, from, to)` until the curve changes.
    ///
    /// # Errors
    ///
    /// Returns an error if `samples < 2`, either bound is outside `[0, 1]` or
    /// `from > to`.
    pub fn lookup_table(&self, samples: usize, from: f64, to: f64) -> Result<Rc<[LookupSample]>> {
        if samples < 2 {
            return Err(QueryError::DegenerateLookupTable { samples }.into());
        }
        let (from, to) = check_range(from, to)?;
        let key = (samples, from.to_bits(), to.to_bits());
        if let Some(table) = self.lookup_cache.borrow().get(&key) {
            return Ok(Rc::clone(table));
        }

        #[allow(clippy::cast_precision_loss)]
        let last = (samples - 1) as f64;
        let table = (0..samples)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let progress = from + (to - from) * (i as f64 / last);
                self.point_at_progress(progress)
                    .map(|point| LookupSample { progress, point })
            })
            .collect::<Result<Rc<[_]>>>()?;
        debug!(samples, from, to, "built lookup table");
        self.lookup_cache
            .borrow_mut()
            .insert(key, Rc::clone(&table));
        Ok(table)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for SplineCurve<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplineCurve")
            .field("mapper", &self.mapper)
            .field("intersection_margin", &self.intersection_margin)
            .field("cached_tables", &self.lookup_cache.borrow().len())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

/// `((d x d2) x d)` normalized: the part of `d2` orthogonal to `d`.
fn principal_normal(d: &Vector3, d2: &Vector3) -> Vector3 {
    normalize_or_zero(&d.cross(d2).cross(d))
}

/// Validates a progress range.
pub(crate) fn check_range(from: f64, to: f64) -> Result<(f64, f64)> {
    let from = GeometryError::check_unit("from", from)?;
    let to = GeometryError::check_unit("to", to)?;
    if from > to {
        return Err(QueryError::InvalidRange { from, to }.into());
    }
    Ok((from, to))
}

fn check_margin(margin: f64) -> Result<f64> {
    if margin.is_finite() && margin >= 0.0 {
        Ok(margin)
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter: "intersection margin",
            value: margin,
            min: 0.0,
            max: f64::INFINITY,
        }
        .into())
    }
}
