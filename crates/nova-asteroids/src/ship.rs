use nova_engine::coords::Vec2;
use nova_engine::math::{NodeId, TransformTree};
use nova_engine::paint::Color;
use nova_engine::render::Batch;

use crate::body;

pub const SHIP_RADIUS: f32 = 15.0;
/// Radians per second (about 120 degrees).
const TURN_SPEED: f32 = 2.0944;
const THRUST: f32 = 200.0;
const MAX_SPEED: f32 = 350.0;
const OUTLINE: [Vec2; 5] = [
    Vec2::new(-15.0, 10.0),
    Vec2::new(15.0, 0.0),
    Vec2::new(-15.0, -10.0),
    Vec2::new(-10.0, 0.0),
    Vec2::new(-15.0, 10.0),
];
const NOSE: f32 = 15.0;
const LINE_WIDTH: f32 = 2.0;

/// What the player is asking the ship to do this frame.
#[derive(Debug, Copy, Clone, Default)]
pub struct Controls {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub fire: bool,
}

/// A laser the ship wants spawned.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Shot {
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Debug)]
pub struct Ship {
    node: NodeId,
    velocity: Vec2,
}

impl Ship {
    pub fn new(transforms: &mut TransformTree, position: Vec2) -> Self {
        Self {
            node: transforms.create_at(position),
            velocity: Vec2::ZERO,
        }
    }

    pub fn position(&self, transforms: &TransformTree) -> Vec2 {
        transforms.position(self.node)
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Turns, accelerates and moves the ship, wrapping at `bounds`.
    ///
    /// Returns the laser to fire when `controls.fire` is set.
    pub fn update(&mut self, transforms: &mut TransformTree, controls: Controls, dt: f32, bounds: Vec2) -> Option<Shot> {
        let mut radians = transforms.rotation_radians(self.node);
        if controls.turn_left {
            radians += TURN_SPEED * dt;
        }
        if controls.turn_right {
            radians -= TURN_SPEED * dt;
        }
        transforms.set_rotation_radians(self.node, radians);

        let heading = Vec2::from_angle(radians);
        if controls.thrust {
            self.velocity += heading * THRUST * dt;
        }
        self.velocity = self.velocity.clamp_length_max(MAX_SPEED);

        let position = body::wrap(transforms.position(self.node) + self.velocity * dt, bounds);
        transforms.set_position(self.node, position);

        controls.fire.then(|| Shot {
            position: position + heading * NOSE,
            velocity: heading * crate::laser::LASER_SPEED,
        })
    }

    /// Back to `position` at rest.
    pub fn respawn(&mut self, transforms: &mut TransformTree, position: Vec2) {
        transforms.set_position(self.node, position);
        self.velocity = Vec2::ZERO;
    }

    pub fn render(&self, batch: &mut Batch<'_>, transforms: &TransformTree) {
        batch.render_line_strip(
            &OUTLINE,
            Color::WHITE,
            LINE_WIDTH,
            transforms.position(self.node),
            transforms.rotation_radians(self.node),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    fn ship(transforms: &mut TransformTree) -> Ship {
        Ship::new(transforms, Vec2::new(400.0, 300.0))
    }

    // ── movement ──────────────────────────────────────────────────────────

    #[test]
    fn thrust_accelerates_along_heading() {
        let mut tree = TransformTree::new();
        let mut s = ship(&mut tree);
        let thrust = Controls { thrust: true, ..Controls::default() };

        s.update(&mut tree, thrust, 0.5, BOUNDS);
        assert_eq!(s.velocity(), Vec2::new(100.0, 0.0));
        assert_eq!(s.position(&tree), Vec2::new(450.0, 300.0));
    }

    #[test]
    fn speed_is_capped() {
        let mut tree = TransformTree::new();
        let mut s = ship(&mut tree);
        let thrust = Controls { thrust: true, ..Controls::default() };
        for _ in 0..40 {
            s.update(&mut tree, thrust, 0.25, BOUNDS);
        }
        assert!((s.velocity().length() - MAX_SPEED).abs() < 1e-3);
    }

    #[test]
    fn turning_left_is_counter_clockwise() {
        let mut tree = TransformTree::new();
        let mut s = ship(&mut tree);
        let left = Controls { turn_left: true, ..Controls::default() };
        s.update(&mut tree, left, 0.5, BOUNDS);
        assert!((tree.rotation_radians(s.node) - TURN_SPEED * 0.5).abs() < 1e-6);
    }

    #[test]
    fn ship_wraps_at_edges() {
        let mut tree = TransformTree::new();
        let mut s = Ship::new(&mut tree, Vec2::new(799.0, 300.0));
        s.velocity = Vec2::new(100.0, 0.0);
        s.update(&mut tree, Controls::default(), 0.1, BOUNDS);
        assert!((s.position(&tree).x - 9.0).abs() < 1e-3);
    }

    // ── firing ────────────────────────────────────────────────────────────

    #[test]
    fn shot_leaves_the_nose() {
        let mut tree = TransformTree::new();
        let mut s = ship(&mut tree);
        let fire = Controls { fire: true, ..Controls::default() };
        let shot = s.update(&mut tree, fire, 0.0, BOUNDS).unwrap();
        assert_eq!(shot.position, Vec2::new(415.0, 300.0));
        assert_eq!(shot.velocity, Vec2::new(crate::laser::LASER_SPEED, 0.0));

        assert!(s.update(&mut tree, Controls::default(), 0.0, BOUNDS).is_none());
    }

    #[test]
    fn respawn_stops_the_ship() {
        let mut tree = TransformTree::new();
        let mut s = ship(&mut tree);
        s.velocity = Vec2::new(50.0, 50.0);
        s.respawn(&mut tree, Vec2::new(1.0, 2.0));
        assert_eq!(s.velocity(), Vec2::ZERO);
        assert_eq!(s.position(&tree), Vec2::new(1.0, 2.0));
    }
}
