use std::f64::consts::{PI, TAU};

use super::types::Point;

pub const BROAD_RING_RADIUS: f64 = 2200.0;

pub const NARROW_FAN_RADIUS: f64 = 900.0;
pub const NARROW_FAN_SPREAD: f64 = PI * 1.2;

pub const DETAILED_FAN_RADIUS: f64 = 250.0;
pub const DETAILED_FAN_SPREAD: f64 = PI * 1.6;
/// Used when the level-1 grandparent is missing and the fan points away from
/// the root instead.
pub const DETAILED_FALLBACK_SPREAD: f64 = PI * 0.5;

pub const LEAF_FAN_RADIUS: f64 = 120.0;
pub const LEAF_FAN_SPREAD: f64 = PI * 1.2;

/// Angle of child `index` of `total` in a fan centred on the ray from
/// `direction_source` through `parent`. The first and last children sit on
/// the edges of the spread.
pub fn fan_angle(
    parent: Point,
    direction_source: Point,
    index: usize,
    total: usize,
    spread: f64,
) -> f64 {
    let base_angle = parent.angle_from(direction_source);
    if total <= 1 {
        return base_angle;
    }

    base_angle - spread / 2.0 + spread * index as f64 / (total - 1) as f64
}

pub fn fan_position(
    parent: Point,
    direction_source: Point,
    index: usize,
    total: usize,
    radius: f64,
    spread: f64,
) -> Point {
    let angle = fan_angle(parent, direction_source, index, total, spread);
    Point::new(
        parent.x + radius * angle.cos(),
        parent.y + radius * angle.sin(),
    )
}

/// Position of broad field `index` of `total` on the ring around the root.
/// Odd indices sit on an outer ring to keep neighbouring labels apart.
pub fn ring_position(index: usize, total: usize, radius: f64) -> Point {
    let angle = TAU * index as f64 / total.max(1) as f64;
    let ring_radius = radius * ((index % 2) as f64 + 1.5);
    Point::new(ring_radius * angle.cos(), ring_radius * angle.sin())
}
