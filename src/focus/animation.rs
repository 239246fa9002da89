use serde::Serialize;

use crate::graph::Point;

pub const ANIMATION_SECONDS: f64 = 0.5;
pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 6.0;

/// Half extent, in world units, added around every fitted node so a single
/// node still has a non-empty bounding box.
const NODE_EXTENT: f64 = 30.0;
/// Share of each viewport axis that stays usable however large the padding.
const MIN_USABLE_FRACTION: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// World point shown at the viewport centre, and the scale applied to it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CameraPose {
    pub center: Point,
    pub zoom: f64,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            center: Point::ORIGIN,
            zoom: 1.0,
        }
    }
}

impl CameraPose {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            center: Point::new(
                self.center.x + (to.center.x - self.center.x) * t,
                self.center.y + (to.center.y - self.center.y) * t,
            ),
            zoom: self.zoom + (to.zoom - self.zoom) * t,
        }
    }
}

fn ease_out_quad(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(2)
}

/// Pose that fits every point in `points` into `viewport`, keeping `padding`
/// screen pixels free on each side. `None` for an empty selection.
pub fn fit_pose(points: &[Point], viewport: Viewport, padding: f64) -> Option<CameraPose> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for point in &points[1..] {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    let box_width = max_x - min_x + 2.0 * NODE_EXTENT;
    let box_height = max_y - min_y + 2.0 * NODE_EXTENT;
    let usable_width = (viewport.width - 2.0 * padding).max(viewport.width * MIN_USABLE_FRACTION);
    let usable_height =
        (viewport.height - 2.0 * padding).max(viewport.height * MIN_USABLE_FRACTION);

    let zoom = (usable_width / box_width)
        .min(usable_height / box_height)
        .clamp(MIN_ZOOM, MAX_ZOOM);

    Some(CameraPose {
        center: Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
        zoom,
    })
}

/// One run of the camera from `from` to `to`. Times are seconds on the
/// caller's clock.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraAnimation {
    from: CameraPose,
    to: CameraPose,
    started_at: f64,
    duration: f64,
}

impl CameraAnimation {
    pub fn new(from: CameraPose, to: CameraPose, started_at: f64) -> Self {
        Self {
            from,
            to,
            started_at,
            duration: ANIMATION_SECONDS,
        }
    }

    pub fn target(&self) -> CameraPose {
        self.to
    }

    pub fn progress(&self, now: f64) -> f64 {
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn pose_at(&self, now: f64) -> CameraPose {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }

        self.from.lerp(self.to, ease_out_quad(t))
    }
}
