pub mod error;
pub mod geometry;
pub mod mapper;
pub mod math;
pub mod operations;

pub use error::{CurveError, Result};
pub use geometry::{CurveOptions, SplineCurve};
