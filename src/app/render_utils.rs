use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};

use crate::focus::CameraPose;
use crate::graph::Point;
use crate::taxonomy::Rgb;

pub(super) fn to_vec2(point: Point) -> Vec2 {
    vec2(point.x as f32, point.y as f32)
}

pub(super) fn rgb_color(rgb: Rgb) -> Color32 {
    let Rgb(r, g, b) = rgb;
    Color32::from_rgb(r, g, b)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgb(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
    )
}

/// Linear map of `value` from `[from_start, from_end]` onto
/// `[to_start, to_end]`, clamped to the target range.
pub(super) fn map_data(
    value: f32,
    from_start: f32,
    from_end: f32,
    to_start: f32,
    to_end: f32,
) -> f32 {
    if (from_end - from_start).abs() <= f32::EPSILON {
        return to_start;
    }

    let t = ((value - from_start) / (from_end - from_start)).clamp(0.0, 1.0);
    to_start + (to_end - to_start) * t
}

/// World-space diameter of a node: shorter ids sit higher in the tree and
/// draw larger.
pub(super) fn node_diameter(id: &str) -> f32 {
    map_data(id.chars().count() as f32, 4.0, 2.0, 20.0, 50.0)
}

pub(super) fn label_size(id: &str) -> f32 {
    map_data(id.chars().count() as f32, 4.0, 2.0, 8.0, 16.0)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(24, 27, 33));

    let step = (240.0 * zoom).clamp(24.0, 96.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(70, 78, 90, 60));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Camera pose currently shown by `pan` and `zoom`.
pub(super) fn pose_from_view(pan: Vec2, zoom: f32) -> CameraPose {
    let center = -pan / zoom;
    CameraPose {
        center: Point::new(f64::from(center.x), f64::from(center.y)),
        zoom: f64::from(zoom),
    }
}

/// Pan and zoom that put `pose.center` in the middle of the viewport.
pub(super) fn view_from_pose(pose: CameraPose) -> (Vec2, f32) {
    let zoom = pose.zoom as f32;
    (-to_vec2(pose.center) * zoom, zoom)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn id_length_maps_to_node_size() {
        assert_relative_eq!(node_diameter("01"), 50.0);
        assert_relative_eq!(node_diameter("011"), 35.0);
        assert_relative_eq!(node_diameter("0111"), 20.0);
        assert_relative_eq!(node_diameter("r"), 50.0);
        assert_relative_eq!(node_diameter("0111-rust-0"), 20.0);
    }

    #[test]
    fn pose_and_view_agree() {
        let pose = CameraPose {
            center: Point::new(120.0, -40.0),
            zoom: 0.5,
        };
        let (pan, zoom) = view_from_pose(pose);
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));

        let centre = world_to_screen(rect, pan, zoom, to_vec2(pose.center));
        assert_relative_eq!(centre.x, 400.0);
        assert_relative_eq!(centre.y, 300.0);
        assert_eq!(pose_from_view(pan, zoom), pose);
    }
}
