use std::f32::consts::TAU;

use nova_engine::coords::Vec2;

/// Moves a point that left the playfield back in from the opposite edge.
pub fn wrap(position: Vec2, bounds: Vec2) -> Vec2 {
    Vec2::new(wrap_axis(position.x, bounds.x), wrap_axis(position.y, bounds.y))
}

fn wrap_axis(value: f32, extent: f32) -> f32 {
    if value >= extent {
        value - extent
    } else if value < 0.0 {
        value + extent
    } else {
        value
    }
}

/// Circle overlap test on squared distances.
#[inline]
pub fn collides(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let radii = a_radius + b_radius;
    a.distance_squared(b) <= radii * radii
}

/// Closed outline with one vertex per side; the first point is repeated at the end.
pub fn polygon(sides: usize, mut radius: impl FnMut(usize) -> f32) -> Vec<Vec2> {
    let step = TAU / sides as f32;
    let mut points: Vec<Vec2> = (0..sides)
        .map(|i| Vec2::from_angle(i as f32 * step) * radius(i))
        .collect();
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    // ── wrap ──────────────────────────────────────────────────────────────

    #[test]
    fn inside_points_stay_put() {
        assert_eq!(wrap(Vec2::new(10.0, 599.0), BOUNDS), Vec2::new(10.0, 599.0));
    }

    #[test]
    fn leaving_one_edge_enters_the_other() {
        assert_eq!(wrap(Vec2::new(805.0, -3.0), BOUNDS), Vec2::new(5.0, 597.0));
        assert_eq!(wrap(Vec2::new(-1.0, 600.0), BOUNDS), Vec2::new(799.0, 0.0));
    }

    // ── collision ─────────────────────────────────────────────────────────

    #[test]
    fn touching_circles_collide() {
        assert!(collides(Vec2::ZERO, 15.0, Vec2::new(42.0, 0.0), 27.0));
        assert!(!collides(Vec2::ZERO, 15.0, Vec2::new(42.1, 0.0), 27.0));
    }

    // ── polygon ───────────────────────────────────────────────────────────

    #[test]
    fn polygon_is_closed() {
        let points = polygon(8, |_| 3.0);
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], points[8]);
        assert!((points[2] - Vec2::new(0.0, 3.0)).length() < 1e-5);
    }
}
