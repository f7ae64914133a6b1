use crate::mapper::ArcLengthMethod;

/// Construction options of a [`SplineCurve`](super::SplineCurve).
///
/// Values are validated when the curve is built, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveOptions {
    /// Tangent scale in `[0, 1]`: `0` straight chords, `1` Catmull-Rom.
    pub curviness: f64,
    /// Knot parameterization in `[0, 1]`: `0` uniform, `0.5` centripetal,
    /// `1` chordal.
    pub softness: f64,
    /// Whether the last point connects back to the first.
    pub closed: bool,
    /// Arc-length strategy and its settings.
    pub arc_length: ArcLengthMethod,
    /// Slack added around each segment's coordinate range when searching for
    /// axis intersections. `None` uses the curviness.
    pub intersection_margin: Option<f64>,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            curviness: 0.5,
            softness: 0.0,
            closed: false,
            arc_length: ArcLengthMethod::default(),
            intersection_margin: None,
        }
    }
}

impl CurveOptions {
    /// Sets the curviness.
    #[must_use]
    pub fn with_curviness(mut self, curviness: f64) -> Self {
        self.curviness = curviness;
        self
    }

    /// Sets the softness.
    #[must_use]
    pub fn with_softness(mut self, softness: f64) -> Self {
        self.softness = softness;
        self
    }

    /// Sets whether the curve is closed.
    #[must_use]
    pub fn with_closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Sets the arc-length strategy.
    #[must_use]
    pub fn with_arc_length(mut self, arc_length: ArcLengthMethod) -> Self {
        self.arc_length = arc_length;
        self
    }

    /// Sets the axis-intersection margin.
    #[must_use]
    pub fn with_intersection_margin(mut self, margin: f64) -> Self {
        self.intersection_margin = Some(margin);
        self
    }
}
