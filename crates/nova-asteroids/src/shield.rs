use std::f32::consts::TAU;

use nova_engine::coords::Vec2;
use nova_engine::math::{NodeId, TransformTree};
use nova_engine::paint::Color;
use nova_engine::render::Batch;

pub const SHIELD_POOL_SIZE: usize = 10;
/// Pickup radius of the diamond.
pub const PICKUP_RADIUS: f32 = 12.5;
const PICKUP_LIFETIME: f32 = 20.0;
const ORBIT_RADIUS: f32 = 30.0;
/// Radians per second.
const ORBIT_SPEED: f32 = 2.0944;
const DOT_RADIUS: f32 = 3.0;
const DIAMOND: [Vec2; 5] = [
    Vec2::new(0.0, 12.5),
    Vec2::new(12.5, 0.0),
    Vec2::new(0.0, -12.5),
    Vec2::new(-12.5, 0.0),
    Vec2::new(0.0, 12.5),
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ShieldState {
    Idle,
    /// Diamond waiting to be collected.
    Pickup { age: f32 },
    /// Orbiting the ship.
    Active,
}

/// A shield: dropped as a diamond, then three dots circling the ship.
///
/// The dots are child nodes of a pivot that follows the ship and spins.
#[derive(Debug)]
pub struct Shield {
    state: ShieldState,
    pivot: NodeId,
    dots: [NodeId; 3],
}

impl Shield {
    fn new(transforms: &mut TransformTree) -> Result<Self, nova_engine::math::TransformError> {
        let pivot = transforms.create();
        let mut dots = [pivot; 3];
        for (i, dot) in dots.iter_mut().enumerate() {
            let offset = Vec2::from_angle(i as f32 * TAU / 3.0) * ORBIT_RADIUS;
            *dot = transforms.create_at(offset);
            transforms.attach_to(*dot, Some(pivot))?;
        }
        Ok(Self {
            state: ShieldState::Idle,
            pivot,
            dots,
        })
    }

    #[inline]
    pub fn state(&self) -> ShieldState {
        self.state
    }

    pub fn position(&self, transforms: &TransformTree) -> Vec2 {
        transforms.position(self.pivot)
    }

    fn update(&mut self, transforms: &mut TransformTree, dt: f32, ship: Vec2) {
        match &mut self.state {
            ShieldState::Idle => {}
            ShieldState::Pickup { age } => {
                *age += dt;
                if *age > PICKUP_LIFETIME {
                    self.state = ShieldState::Idle;
                }
            }
            ShieldState::Active => {
                transforms.set_position(self.pivot, ship);
                transforms.rotate_radians(self.pivot, ORBIT_SPEED * dt);
            }
        }
    }

    fn render(&self, batch: &mut Batch<'_>, transforms: &mut TransformTree) {
        match self.state {
            ShieldState::Idle => {}
            ShieldState::Pickup { .. } => {
                batch.render_line_strip(&DIAMOND, Color::WHITE, 2.0, transforms.position(self.pivot), 0.0);
            }
            ShieldState::Active => {
                for dot in self.dots {
                    let center = transforms.world_position(dot);
                    batch.render_circle(center, DOT_RADIUS, Color::BLUE);
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct ShieldPool {
    shields: Vec<Shield>,
}

impl ShieldPool {
    pub fn new(transforms: &mut TransformTree) -> Result<Self, nova_engine::math::TransformError> {
        let shields = (0..SHIELD_POOL_SIZE)
            .map(|_| Shield::new(transforms))
            .collect::<Result<_, _>>()?;
        Ok(Self { shields })
    }

    /// Drops a diamond at `position`. Returns false when every shield is in use.
    pub fn drop_pickup(&mut self, transforms: &mut TransformTree, position: Vec2) -> bool {
        let Some(shield) = self.shields.iter_mut().find(|s| s.state == ShieldState::Idle) else {
            return false;
        };
        transforms.set_position(shield.pivot, position);
        shield.state = ShieldState::Pickup { age: 0.0 };
        true
    }

    pub fn update(&mut self, transforms: &mut TransformTree, dt: f32, ship: Vec2) {
        for shield in &mut self.shields {
            shield.update(transforms, dt, ship);
        }
    }

    /// Activates every diamond within reach of the ship. Returns how many.
    pub fn collect(&mut self, transforms: &TransformTree, ship: Vec2, ship_radius: f32) -> usize {
        let mut collected = 0;
        for shield in &mut self.shields {
            if matches!(shield.state, ShieldState::Pickup { .. })
                && crate::body::collides(ship, ship_radius, shield.position(transforms), PICKUP_RADIUS)
            {
                shield.state = ShieldState::Active;
                collected += 1;
            }
        }
        collected
    }

    /// Spends one active shield. Returns false when none was up.
    pub fn absorb_hit(&mut self) -> bool {
        match self.shields.iter_mut().find(|s| s.state == ShieldState::Active) {
            Some(shield) => {
                shield.state = ShieldState::Idle;
                true
            }
            None => false,
        }
    }

    pub fn active_count(&self) -> usize {
        self.count(|s| s == ShieldState::Active)
    }

    pub fn pickup_count(&self) -> usize {
        self.count(|s| matches!(s, ShieldState::Pickup { .. }))
    }

    fn count(&self, pred: impl Fn(ShieldState) -> bool) -> usize {
        self.shields.iter().filter(|s| pred(s.state)).count()
    }

    pub fn render(&self, batch: &mut Batch<'_>, transforms: &mut TransformTree) {
        for shield in &self.shields {
            shield.render(batch, transforms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(tree: &mut TransformTree) -> ShieldPool {
        ShieldPool::new(tree).unwrap()
    }

    // ── pickups ───────────────────────────────────────────────────────────

    #[test]
    fn pickup_expires() {
        let mut tree = TransformTree::new();
        let mut shields = pool(&mut tree);
        assert!(shields.drop_pickup(&mut tree, Vec2::new(50.0, 50.0)));
        shields.update(&mut tree, PICKUP_LIFETIME - 1.0, Vec2::ZERO);
        assert_eq!(shields.pickup_count(), 1);
        shields.update(&mut tree, 2.0, Vec2::ZERO);
        assert_eq!(shields.pickup_count(), 0);
    }

    #[test]
    fn pool_has_fixed_size() {
        let mut tree = TransformTree::new();
        let mut shields = pool(&mut tree);
        for _ in 0..SHIELD_POOL_SIZE {
            assert!(shields.drop_pickup(&mut tree, Vec2::ZERO));
        }
        assert!(!shields.drop_pickup(&mut tree, Vec2::ZERO));
    }

    #[test]
    fn touching_a_diamond_raises_the_shield() {
        let mut tree = TransformTree::new();
        let mut shields = pool(&mut tree);
        shields.drop_pickup(&mut tree, Vec2::new(100.0, 100.0));

        assert_eq!(shields.collect(&tree, Vec2::new(200.0, 100.0), 15.0), 0);
        assert_eq!(shields.collect(&tree, Vec2::new(120.0, 100.0), 15.0), 1);
        assert_eq!(shields.active_count(), 1);
    }

    // ── orbit ─────────────────────────────────────────────────────────────

    #[test]
    fn dots_orbit_the_ship() {
        let mut tree = TransformTree::new();
        let mut shields = pool(&mut tree);
        shields.drop_pickup(&mut tree, Vec2::ZERO);
        shields.collect(&tree, Vec2::ZERO, 15.0);

        let ship = Vec2::new(300.0, 200.0);
        shields.update(&mut tree, 0.5, ship);
        let shield = &shields.shields[0];
        for dot in shield.dots {
            let distance = tree.world_position(dot).distance(ship);
            assert!((distance - ORBIT_RADIUS).abs() < 1e-3);
        }
        let first = tree.world_position(shield.dots[0]) - ship;
        assert!((first.to_angle() - ORBIT_SPEED * 0.5).abs() < 1e-4);
    }

    #[test]
    fn hit_spends_one_shield() {
        let mut tree = TransformTree::new();
        let mut shields = pool(&mut tree);
        assert!(!shields.absorb_hit());

        shields.drop_pickup(&mut tree, Vec2::ZERO);
        shields.drop_pickup(&mut tree, Vec2::ZERO);
        shields.collect(&tree, Vec2::ZERO, 15.0);
        assert!(shields.absorb_hit());
        assert_eq!(shields.active_count(), 1);
    }
}
