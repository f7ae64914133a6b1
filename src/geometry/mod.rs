pub mod curve;
pub mod spline;

pub use curve::{Curvature, CurveOptions, LookupSample, SplineCurve};
pub use spline::{Evaluation, ShapeParams, Spline};
