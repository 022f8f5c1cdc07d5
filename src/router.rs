//! Connector routing.
//!
//! Connectors are drawn as cubic bezier curves. The first control point
//! leaves the start slot horizontally or vertically depending on the slot;
//! the second always arrives horizontally from the left, which is what the
//! arrow marker at the end expects.

use slint::LogicalPosition;

/// Offset of the first control point from the start slot.
pub const START_CONTROL_OFFSET: f32 = 50.0;
/// Horizontal offset of the second control point before the end slot.
pub const END_CONTROL_OFFSET: f32 = 60.0;

/// Cubic bezier curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    pub p0: LogicalPosition, // Start point
    pub p1: LogicalPosition, // Control point 1
    pub p2: LogicalPosition, // Control point 2
    pub p3: LogicalPosition, // End point
}

/// Route a connector from `start` to `end`.
///
/// `end_vertical` is accepted for symmetry with the slot model but does not
/// change the arrival direction.
pub fn route(
    start: LogicalPosition,
    start_vertical: bool,
    end: LogicalPosition,
    _end_vertical: bool,
) -> CubicCurve {
    let p1 = if start_vertical {
        LogicalPosition::new(start.x, start.y + START_CONTROL_OFFSET)
    } else {
        LogicalPosition::new(start.x + START_CONTROL_OFFSET, start.y)
    };
    CubicCurve {
        p0: start,
        p1,
        p2: LogicalPosition::new(end.x - END_CONTROL_OFFSET, end.y),
        p3: end,
    }
}

impl CubicCurve {
    /// Evaluate the curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> LogicalPosition {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.x + 3.0 * mt2 * t * self.p1.x + 3.0 * mt * t2 * self.p2.x + t3 * self.p3.x;
        let y = mt3 * self.p0.y + 3.0 * mt2 * t * self.p1.y + 3.0 * mt * t2 * self.p2.y + t3 * self.p3.y;

        LogicalPosition::new(x, y)
    }

    /// Same curve with its end point pulled back `inset` units to the left,
    /// leaving room for an arrow head whose tip sits on the original end.
    pub fn inset_end(&self, inset: f32) -> CubicCurve {
        CubicCurve {
            p3: LogicalPosition::new(self.p3.x - inset, self.p3.y),
            ..*self
        }
    }

    /// SVG path command (e.g. "M 10 20 C 60 20 90 80 140 80")
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y
        )
    }
}

/// Triangle marking the direction of a connector at its end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowMarker {
    pub tip: LogicalPosition,
    pub left: LogicalPosition,
    pub right: LogicalPosition,
}

impl ArrowMarker {
    /// Arrow of `length` x `width` pointing at `tip`, oriented along the
    /// curve's final tangent.
    pub fn at_end(curve: &CubicCurve, tip: LogicalPosition, length: f32, width: f32) -> Self {
        let (mut dx, mut dy) = (curve.p3.x - curve.p2.x, curve.p3.y - curve.p2.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len < f32::EPSILON {
            // Degenerate tangent: point right, like the control layout does
            dx = 1.0;
            dy = 0.0;
        } else {
            dx /= len;
            dy /= len;
        }
        let base = LogicalPosition::new(tip.x - dx * length, tip.y - dy * length);
        let (nx, ny) = (-dy * width / 2.0, dx * width / 2.0);
        Self {
            tip,
            left: LogicalPosition::new(base.x + nx, base.y + ny),
            right: LogicalPosition::new(base.x - nx, base.y - ny),
        }
    }

    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} L {} {} L {} {} Z",
            self.left.x, self.left.y, self.tip.x, self.tip.y, self.right.x, self.right.y
        )
    }
}

/// Calculate squared distance from a point to a line segment
fn distance_to_line_segment_sq(point: LogicalPosition, a: LogicalPosition, b: LogicalPosition) -> f32 {
    let ab = (b.x - a.x, b.y - a.y);
    let ap = (point.x - a.x, point.y - a.y);

    let ab_len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    if ab_len_sq < f32::EPSILON {
        // Degenerate segment (a == b)
        return ap.0 * ap.0 + ap.1 * ap.1;
    }

    // Project point onto line, clamped to segment
    let t = ((ap.0 * ab.0 + ap.1 * ab.1) / ab_len_sq).clamp(0.0, 1.0);

    let closest = (a.x + t * ab.0, a.y + t * ab.1);
    let dx = point.x - closest.0;
    let dy = point.y - closest.1;
    dx * dx + dy * dy
}

/// Minimum distance from a point to the curve, by sampling `num_samples`
/// segments (20 when zero is passed).
pub fn distance_to_curve(point: LogicalPosition, curve: &CubicCurve, num_samples: usize) -> f32 {
    let num_samples = if num_samples == 0 { 20 } else { num_samples };

    let mut min_dist_sq = f32::MAX;
    let mut prev_point = curve.eval(0.0);

    for i in 1..=num_samples {
        let t = i as f32 / num_samples as f32;
        let curr_point = curve.eval(t);
        min_dist_sq = min_dist_sq.min(distance_to_line_segment_sq(point, prev_point, curr_point));
        prev_point = curr_point;
    }

    min_dist_sq.sqrt()
}
