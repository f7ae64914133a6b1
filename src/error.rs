use thiserror::Error;

/// Top-level error type for spline paths.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Mapper(#[from] MapperError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Errors related to curve state and parameters.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("at least 2 control points are required, got {count}")]
    InvalidPointCount { count: usize },

    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("no spline segment at index {index} (curve has {segment_count} segments)")]
    InvalidSegmentIndex { index: usize, segment_count: usize },
}

/// Errors related to arc-length strategies.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("Gauss-Legendre order {order} is out of range [{min}, {max}]")]
    QuadratureOrderOutOfRange { order: usize, min: usize, max: usize },

    #[error("{what} must be at least {min}, got {count}")]
    InvalidSampleCount {
        what: &'static str,
        count: usize,
        min: usize,
    },
}

/// Errors related to curve queries.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("lookup table needs at least 2 samples, got {samples}")]
    DegenerateLookupTable { samples: usize },

    #[error("threshold must be a finite number greater than zero, got {0}")]
    InvalidThreshold(f64),

    #[error("invalid progress range [{from}, {to}]")]
    InvalidRange { from: f64, to: f64 },

    #[error("at least one {what} is required")]
    EmptySampling { what: &'static str },
}

impl GeometryError {
    /// Checks that `value` lies in the closed unit interval.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] if `value` is outside
    /// `[0, 1]` or not a number.
    pub fn check_unit(parameter: &'static str, value: f64) -> std::result::Result<f64, Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(Self::ParameterOutOfRange {
                parameter,
                value,
                min: 0.0,
                max: 1.0,
            })
        }
    }
}

/// Convenience type alias for results using [`CurveError`].
pub type Result<T> = std::result::Result<T, CurveError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unit_check_accepts_bounds() {
        assert!(GeometryError::check_unit("time", 0.0).is_ok());
        assert!(GeometryError::check_unit("time", 1.0).is_ok());
    }

    #[test]
    fn unit_check_rejects_nan_and_outside() {
        assert!(GeometryError::check_unit("time", f64::NAN).is_err());
        assert!(GeometryError::check_unit("time", -0.1).is_err());
        assert!(GeometryError::check_unit("time", 1.1).is_err());
    }

    #[test]
    fn messages_name_the_parameter() {
        let err: CurveError = GeometryError::check_unit("curviness", 2.0).unwrap_err().into();
        assert_eq!(
            err.to_string(),
            "parameter curviness = 2 is out of range [0, 1]"
        );
    }
}
