use std::f32::consts::TAU;

use nova_engine::coords::Vec2;
use nova_engine::paint::Color;
use nova_engine::render::Batch;
use rand::Rng;

use crate::body;

pub const ASTEROID_COUNT: usize = 20;
/// Collision radius; the outline never reaches past it.
pub const ASTEROID_RADIUS: f32 = 27.0;
const MIN_SIDES: usize = 7;
const MAX_SIDES: usize = 17;
const MIN_POINT_RADIUS: f32 = 15.0;
const MIN_SPEED: f32 = 30.0;
const MAX_SPEED: f32 = 100.0;
/// Degrees per second.
const MIN_SPIN: f32 = 50.0;
const MAX_SPIN: f32 = 150.0;

#[derive(Debug, Clone)]
pub struct Asteroid {
    outline: Vec<Vec2>,
    position: Vec2,
    velocity: Vec2,
    radians: f32,
    /// Radians per second.
    spin: f32,
    active: bool,
}

impl Asteroid {
    /// A jagged rock entering from the left or bottom edge of `bounds`.
    pub fn spawn(rng: &mut impl Rng, bounds: Vec2) -> Self {
        let sides = rng.gen_range(MIN_SIDES..=MAX_SIDES);
        let outline = body::polygon(sides, |_| rng.gen_range(MIN_POINT_RADIUS..ASTEROID_RADIUS));

        let position = if rng.gen_bool(0.5) {
            Vec2::new(rng.gen_range(0.0..bounds.x), 0.0)
        } else {
            Vec2::new(0.0, rng.gen_range(0.0..bounds.y))
        };
        let heading = Vec2::from_angle(rng.gen_range(0.0..TAU));

        Self {
            outline,
            position,
            velocity: heading * rng.gen_range(MIN_SPEED..MAX_SPEED),
            radians: rng.gen_range(0.0..TAU),
            spin: rng.gen_range(MIN_SPIN..MAX_SPIN).to_radians(),
            active: true,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn sides(&self) -> usize {
        self.outline.len() - 1
    }

    pub fn destroy(&mut self) {
        self.active = false;
    }

    pub fn update(&mut self, dt: f32, bounds: Vec2) {
        if !self.active {
            return;
        }
        self.radians = (self.radians + self.spin * dt) % TAU;
        self.position = body::wrap(self.position + self.velocity * dt, bounds);
    }

    pub fn render(&self, batch: &mut Batch<'_>) {
        if self.active {
            batch.render_line_strip(&self.outline, Color::WHITE, 2.0, self.position, self.radians);
        }
    }
}
