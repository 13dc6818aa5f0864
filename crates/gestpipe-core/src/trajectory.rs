use crate::landmarks::Point2;
use crate::sample::MotionFeatures;
use strum_macros::Display;

/// 3-point moving average. Endpoints are kept as-is so the gesture's start
/// and end anchors do not drift; buffers of length <= 2 are returned unchanged.
pub fn smooth(points: &[Point2]) -> Vec<Point2> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(n);
    out.push(points[0]);
    out.extend(points.windows(3).map(|w| {
        Point2::new(
            (w[0].x + w[1].x + w[2].x) / 3.0,
            (w[0].y + w[1].y + w[2].y) / 3.0,
        )
    }));
    out.push(points[n - 1]);
    out
}

/// Start / middle (`floor(n/2)`) / end anchors and the signed displacement of
/// an already smoothed path. `None` for an empty path.
pub fn extract_features(smoothed: &[Point2]) -> Option<MotionFeatures> {
    let first = *smoothed.first()?;
    let middle = smoothed[smoothed.len() / 2];
    let last = *smoothed.last()?;

    // Flip x for the mirrored camera feed.
    let delta_x = -(last.x - first.x);
    let delta_y = last.y - first.y;
    let horizontal = delta_x.abs() >= delta_y.abs();

    Some(MotionFeatures {
        x_start: first.x,
        y_start: first.y,
        x_mid: middle.x,
        y_mid: middle.y,
        x_end: last.x,
        y_end: last.y,
        main_axis_x: u8::from(horizontal),
        main_axis_y: u8::from(!horizontal),
        delta_x,
        delta_y,
    })
}

/// Coarse direction of a displacement, in the operator's frame of reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MotionDirection {
    Static,
    Left,
    Right,
    Up,
    Down,
}

impl MotionDirection {
    pub fn classify(dx: f32, dy: f32, threshold: f32) -> Self {
        let (ax, ay) = (dx.abs(), dy.abs());
        if ax < threshold && ay < threshold {
            MotionDirection::Static
        } else if ax > ay {
            if dx > 0.0 {
                MotionDirection::Right
            } else {
                MotionDirection::Left
            }
        } else if dy > 0.0 {
            MotionDirection::Down
        } else {
            MotionDirection::Up
        }
    }

    pub fn of(features: &MotionFeatures, threshold: f32) -> Self {
        Self::classify(features.delta_x, features.delta_y, threshold)
    }
}
