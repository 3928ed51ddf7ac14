use nova_engine::coords::Vec2;
use nova_engine::paint::Color;
use nova_engine::render::Batch;

use crate::body;
use crate::ship::Shot;

pub const LASER_SPEED: f32 = 600.0;
pub const LASER_RADIUS: f32 = 5.0;
pub const LASER_POOL_SIZE: usize = 20;
const LIFETIME: f32 = 2.0;
const SIDES: usize = 8;
const SIZE: f32 = 3.0;

#[derive(Debug, Clone)]
pub struct Laser {
    outline: Vec<Vec2>,
    position: Vec2,
    velocity: Vec2,
    age: f32,
    active: bool,
}

impl Laser {
    fn new() -> Self {
        Self {
            outline: body::polygon(SIDES, |_| SIZE),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            age: 0.0,
            active: false,
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

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    fn fire(&mut self, shot: Shot) {
        self.position = shot.position;
        self.velocity = shot.velocity;
        self.age = 0.0;
        self.active = true;
    }

    fn update(&mut self, dt: f32, bounds: Vec2) {
        if !self.active {
            return;
        }
        self.age += dt;
        if self.age > LIFETIME {
            self.active = false;
            return;
        }
        self.position = body::wrap(self.position + self.velocity * dt, bounds);
    }

    fn render(&self, batch: &mut Batch<'_>) {
        if self.active {
            batch.render_line_strip(&self.outline, Color::WHITE, 2.0, self.position, 0.0);
        }
    }
}

/// Fixed set of lasers reused as they expire.
#[derive(Debug, Clone)]
pub struct LaserPool {
    lasers: Vec<Laser>,
}

impl LaserPool {
    pub fn new() -> Self {
        Self {
            lasers: (0..LASER_POOL_SIZE).map(|_| Laser::new()).collect(),
        }
    }

    /// Activates an idle laser. Returns false when all are in flight.
    pub fn fire(&mut self, shot: Shot) -> bool {
        match self.lasers.iter_mut().find(|l| !l.active) {
            Some(laser) => {
                laser.fire(shot);
                true
            }
            None => {
                log::debug!("laser pool exhausted");
                false
            }
        }
    }

    pub fn update(&mut self, dt: f32, bounds: Vec2) {
        for laser in &mut self.lasers {
            laser.update(dt, bounds);
        }
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut Laser> {
        self.lasers.iter_mut().filter(|l| l.active)
    }

    pub fn active_count(&self) -> usize {
        self.lasers.iter().filter(|l| l.active).count()
    }

    pub fn render(&self, batch: &mut Batch<'_>) {
        for laser in &self.lasers {
            laser.render(batch);
        }
    }
}
