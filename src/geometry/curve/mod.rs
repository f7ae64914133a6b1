mod options;
mod spline_curve;

pub use options::CurveOptions;
pub use spline_curve::{Curvature, LookupSample, SplineCurve};
pub(crate) use spline_curve::check_range;
