use anyhow::Context;
use nova_engine::audio::{Audio, AudioEngine};
use nova_engine::coords::{Vec2, Viewport};
use nova_engine::input::Key;
use nova_engine::math::TransformTree;
use nova_engine::paint::Color;
use nova_engine::render::{Batch, Camera};
use nova_engine::resources::ResourceManager;
use nova_engine::text::SpriteFont;
use nova_engine::{AppControl, Game, StartCtx, UpdateCtx};
use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::asteroid::{ASTEROID_COUNT, ASTEROID_RADIUS, Asteroid};
use crate::body;
use crate::laser::{LASER_RADIUS, LaserPool};
use crate::ship::{Controls, SHIP_RADIUS, Ship};
use crate::shield::ShieldPool;

const SCORE_FONT: &str = "OpenSans-CondBold";
const SCORE_FONT_PX: u32 = 32;
const SCORE_MARGIN: f32 = 10.0;
/// Chance that a destroyed asteroid drops a shield pickup.
const SHIELD_DROP_CHANCE: f64 = 1.0 / 7.0;
const HIT_SHAKE: (f32, f32) = (6.0, 0.25);
const CRASH_SHAKE: (f32, f32) = (14.0, 0.5);
const LASER_SOUND: &str = "laser";
const EXPLOSION_SOUND: &str = "explosion";

/// Things that happened during one simulation step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepEvents {
    pub shots_fired: u32,
    pub asteroids_destroyed: u32,
    pub shields_spent: u32,
    pub crashes: u32,
}

/// Everything that moves; kept apart from the window-facing `Game` so it can
/// be stepped without a device.
#[derive(Debug)]
pub struct World {
    bounds: Vec2,
    transforms: TransformTree,
    ship: Ship,
    asteroids: Vec<Asteroid>,
    lasers: LaserPool,
    shields: ShieldPool,
    destroyed: u32,
}

impl World {
    pub fn new(rng: &mut impl Rng, bounds: Vec2) -> anyhow::Result<Self> {
        let mut transforms = TransformTree::new();
        let ship = Ship::new(&mut transforms, bounds * 0.5);
        let shields = ShieldPool::new(&mut transforms).context("failed to build shield nodes")?;
        let asteroids = (0..ASTEROID_COUNT).map(|_| Asteroid::spawn(rng, bounds)).collect();

        Ok(Self {
            bounds,
            transforms,
            ship,
            asteroids,
            lasers: LaserPool::new(),
            shields,
            destroyed: 0,
        })
    }

    pub fn destroyed(&self) -> u32 {
        self.destroyed
    }

    pub fn remaining(&self) -> usize {
        self.asteroids.iter().filter(|a| a.is_active()).count()
    }

    pub fn set_bounds(&mut self, bounds: Vec2) {
        self.bounds = bounds;
    }

    pub fn step(&mut self, rng: &mut impl Rng, controls: Controls, dt: f32) -> StepEvents {
        let mut events = StepEvents::default();

        if let Some(shot) = self.ship.update(&mut self.transforms, controls, dt, self.bounds) {
            if self.lasers.fire(shot) {
                events.shots_fired += 1;
            }
        }
        for asteroid in &mut self.asteroids {
            asteroid.update(dt, self.bounds);
        }
        self.lasers.update(dt, self.bounds);

        let ship = self.ship.position(&self.transforms);
        self.shields.update(&mut self.transforms, dt, ship);

        for asteroid in self.asteroids.iter_mut().filter(|a| a.is_active()) {
            if !body::collides(ship, SHIP_RADIUS, asteroid.position(), ASTEROID_RADIUS) {
                continue;
            }
            if self.shields.absorb_hit() {
                asteroid.destroy();
                self.destroyed += 1;
                events.asteroids_destroyed += 1;
                events.shields_spent += 1;
            } else {
                let center = self.bounds * 0.5;
                self.ship.respawn(&mut self.transforms, center);
                events.crashes += 1;
                log::info!("ship destroyed; respawning at {center}");
                break;
            }
        }

        for laser in self.lasers.active_mut() {
            let Some(asteroid) = self
                .asteroids
                .iter_mut()
                .filter(|a| a.is_active())
                .find(|a| body::collides(laser.position(), LASER_RADIUS, a.position(), ASTEROID_RADIUS))
            else {
                continue;
            };
            laser.deactivate();
            asteroid.destroy();
            self.destroyed += 1;
            events.asteroids_destroyed += 1;
            if rng.gen_bool(SHIELD_DROP_CHANCE) {
                self.shields.drop_pickup(&mut self.transforms, asteroid.position());
            }
        }

        let ship = self.ship.position(&self.transforms);
        if self.shields.collect(&self.transforms, ship, SHIP_RADIUS) > 0 {
            log::debug!("shield collected ({} active)", self.shields.active_count());
        }

        self.transforms.drain_events();
        events
    }

    pub fn render(&mut self, batch: &mut Batch<'_>) {
        self.ship.render(batch, &self.transforms);
        for asteroid in &self.asteroids {
            asteroid.render(batch);
        }
        self.lasers.render(batch);
        self.shields.render(batch, &mut self.transforms);
    }
}

/// Score readout in the top-left corner.
#[derive(Debug)]
struct Score {
    transforms: TransformTree,
    text: SpriteFont,
    shown: Option<u32>,
}

impl Score {
    fn set(&mut self, destroyed: u32) {
        if self.shown != Some(destroyed) {
            self.text.set_text(format!("Asteroids destroyed: {destroyed}"));
            self.shown = Some(destroyed);
        }
    }

    fn place(&mut self, viewport: Viewport) {
        let top_left = Vec2::new(SCORE_MARGIN, viewport.height - SCORE_MARGIN);
        self.transforms.set_position(self.text.node(), top_left);
    }
}

/// Optional sound effects; a file that fails to load just stays quiet.
#[derive(Debug, Default)]
struct Sounds {
    laser: Option<Audio>,
    explosion: Option<Audio>,
}

impl Sounds {
    fn load(resources: &mut ResourceManager, audio: &AudioEngine) -> Self {
        let mut voice = |key: &str| match resources.load_audio(key) {
            Ok(wave) => Some(audio.voice(wave)),
            Err(err) => {
                log::warn!("sound {key:?} disabled: {err}");
                None
            }
        };
        Self {
            laser: voice(LASER_SOUND),
            explosion: voice(EXPLOSION_SOUND),
        }
    }

    fn play(&mut self, events: StepEvents) {
        if let Some(laser) = self.laser.as_mut().filter(|_| events.shots_fired > 0) {
            laser.restart();
        }
        let boom = events.asteroids_destroyed + events.crashes > 0;
        if let Some(explosion) = self.explosion.as_mut().filter(|_| boom) {
            explosion.restart();
        }
    }

    fn update(&mut self, dt: f32) {
        for voice in [&mut self.laser, &mut self.explosion].into_iter().flatten() {
            voice.update(dt);
        }
    }
}

pub struct AsteroidsGame {
    rng: StdRng,
    camera: Camera,
    world: Option<World>,
    score: Option<Score>,
    sounds: Sounds,
}

impl AsteroidsGame {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            camera: Camera::new(Viewport::from_size(1.0, 1.0)),
            world: None,
            score: None,
            sounds: Sounds::default(),
        }
    }

    fn load_score(ctx: &mut StartCtx<'_>) -> Option<Score> {
        let font = match ctx.resources.load_font(&mut *ctx.device, SCORE_FONT, SCORE_FONT_PX) {
            Ok(font) => font,
            Err(err) => {
                log::warn!("score text disabled: {err}");
                return None;
            }
        };
        let mut transforms = TransformTree::new();
        let mut text = SpriteFont::new(&mut transforms, font);
        text.set_anchor(Vec2::new(0.0, 1.0));
        text.set_color(Color::WHITE);
        Some(Score {
            transforms,
            text,
            shown: None,
        })
    }
}

impl Default for AsteroidsGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for AsteroidsGame {
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> anyhow::Result<()> {
        self.camera = Camera::new(ctx.viewport);
        self.world = Some(World::new(&mut self.rng, ctx.viewport.size())?);
        self.score = Self::load_score(ctx);
        if let Some(score) = &mut self.score {
            score.place(ctx.viewport);
        }
        self.sounds = Sounds::load(ctx.resources, ctx.audio);
        log::info!("{ASTEROID_COUNT} asteroids spawned");
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut UpdateCtx<'_>) -> AppControl {
        if ctx.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }
        let Some(world) = self.world.as_mut() else {
            return AppControl::Continue;
        };

        let controls = Controls {
            turn_left: ctx.key_down(Key::A),
            turn_right: ctx.key_down(Key::D),
            thrust: ctx.key_down(Key::W),
            fire: ctx.key_pressed(Key::Space),
        };
        let events = world.step(&mut self.rng, controls, ctx.dt());
        self.sounds.update(ctx.dt());
        self.sounds.play(events);

        if events.crashes > 0 {
            self.camera.shake(CRASH_SHAKE.0, CRASH_SHAKE.1);
        } else if events.shields_spent > 0 {
            self.camera.shake(HIT_SHAKE.0, HIT_SHAKE.1);
        }
        self.camera.update(ctx.dt());

        if events.asteroids_destroyed > 0 && world.remaining() == 0 {
            log::info!("all asteroids destroyed after {:.1}s", ctx.time.elapsed);
        }
        if let Some(score) = &mut self.score {
            score.set(world.destroyed());
        }
        AppControl::Continue
    }

    fn on_render(&mut self, batch: &mut Batch<'_>) {
        batch.begin_scene(&self.camera);
        if let Some(world) = self.world.as_mut() {
            world.render(batch);
        }
        if let Some(score) = &mut self.score {
            batch.render_sprite_font(&score.text, &mut score.transforms);
        }
        batch.end_scene();
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.camera.on_resize(width, height);
        let viewport = self.camera.viewport();
        if let Some(world) = self.world.as_mut() {
            world.set_bounds(viewport.size());
        }
        if let Some(score) = &mut self.score {
            score.place(viewport);
        }
    }
}
