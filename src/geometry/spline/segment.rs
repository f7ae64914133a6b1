use crate::error::{GeometryError, Result};
use crate::math::Point3;

/// Number of segments for `point_count` control points.
#[must_use]
pub fn segment_count(point_count: usize, closed: bool) -> usize {
    if closed {
        point_count
    } else {
        point_count.saturating_sub(1)
    }
}

/// Selects the four control points governing segment `index`.
///
/// The segment runs from the second to the third returned point. Closed
/// curves wrap around the point list; open curves synthesize a virtual
/// neighbour by linear reflection at either end.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidSegmentIndex`] if `index` does not name a
/// segment of the curve.
pub fn control_points(index: usize, points: &[Point3], closed: bool) -> Result<[Point3; 4]> {
    let n = points.len();
    let count = segment_count(n, closed);
    if index >= count {
        return Err(GeometryError::InvalidSegmentIndex {
            index,
            segment_count: count,
        }
        .into());
    }

    if closed {
        return Ok([
            points[(index + n - 1) % n],
            points[index],
            points[(index + 1) % n],
            points[(index + 2) % n],
        ]);
    }

    let p2 = points[index];
    let p3 = points[index + 1];
    let p1 = if index > 0 {
        points[index - 1]
    } else {
        reflect(&p3, &p2)
    };
    let p4 = if index + 2 < n {
        points[index + 2]
    } else {
        reflect(&p2, &p3)
    };
    Ok([p1, p2, p3, p4])
}

/// Mirrors `from` through `pivot`: `2 * pivot - from`.
fn reflect(from: &Point3, pivot: &Point3) -> Point3 {
    pivot + (pivot - from)
}

/// Maps global `time` in `[0, 1]` to a segment index and the local weight
/// within that segment.
///
/// `time = 1` lands on the last segment at weight `1`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn segment_at(time: f64, segment_count: usize) -> (usize, f64) {
    let last = segment_count.saturating_sub(1);
    if time >= 1.0 {
        return (last, 1.0);
    }
    let scaled = segment_count as f64 * time.max(0.0);
    let index = scaled.floor();
    let index_usize = (index as usize).min(last);
    (index_usize, scaled - index_usize as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pts() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn segment_counts() {
        assert_eq!(segment_count(4, false), 3);
        assert_eq!(segment_count(4, true), 4);
    }

    #[test]
    fn open_first_segment_extrapolates_predecessor() {
        let p = pts();
        let cp = control_points(0, &p, false).unwrap();
        assert_eq!(cp[0], Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(cp[1], p[0]);
        assert_eq!(cp[2], p[1]);
        assert_eq!(cp[3], p[2]);
    }

    #[test]
    fn open_last_segment_extrapolates_successor() {
        let p = pts();
        let cp = control_points(2, &p, false).unwrap();
        assert_eq!(cp[0], p[1]);
        assert_eq!(cp[1], p[2]);
        assert_eq!(cp[2], p[3]);
        assert_eq!(cp[3], Point3::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn open_curve_has_no_final_wrap_segment() {
        let p = pts();
        assert!(control_points(3, &p, false).is_err());
    }

    #[test]
    fn closed_curve_wraps() {
        let p = pts();
        let first = control_points(0, &p, true).unwrap();
        assert_eq!(first, [p[3], p[0], p[1], p[2]]);
        let last = control_points(3, &p, true).unwrap();
        assert_eq!(last, [p[2], p[3], p[0], p[1]]);
        assert!(control_points(4, &p, true).is_err());
    }

    #[test]
    fn two_point_open_curve_extrapolates_both_ends() {
        let p = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let cp = control_points(0, &p, false).unwrap();
        assert_eq!(cp[0], Point3::new(-2.0, 0.0, 0.0));
        assert_eq!(cp[3], Point3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn segment_at_boundaries() {
        assert_eq!(segment_at(0.0, 4), (0, 0.0));
        assert_eq!(segment_at(1.0, 4), (3, 1.0));
        let (i, w) = segment_at(0.5, 4);
        assert_eq!(i, 2);
        assert!(w.abs() < 1e-12);
        let (i, w) = segment_at(0.3, 2);
        assert_eq!(i, 0);
        assert!((w - 0.6).abs() < 1e-12);
    }
}
