mod axis_intersect;
mod bounding_box;
mod closest_point;
mod frenet_frames;
mod sample_points;

pub use axis_intersect::AxisIntersect;
pub use bounding_box::{Aabb, BoundingBox};
pub use closest_point::{ClosestPoint, ClosestPointResult, DEFAULT_THRESHOLD};
pub use frenet_frames::{Frame, FrenetFrames};
pub use sample_points::{Polyline, SamplePoints};
