use crate::audio::AudioEngine;
use crate::config::EngineConfig;
use crate::coords::Viewport;
use crate::input::{InputFrame, InputState, Key};
use crate::render::GraphicsDevice;
use crate::resources::ResourceManager;
use crate::time::FrameTime;

/// Handed to [`Game::on_start`](super::Game::on_start).
pub struct StartCtx<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub resources: &'a mut ResourceManager,
    pub audio: &'a mut AudioEngine,
    pub config: &'a EngineConfig,
    /// Window viewport in pixels.
    pub viewport: Viewport,
}

/// Per-frame context for [`Game::on_update`](super::Game::on_update).
pub struct UpdateCtx<'a> {
    pub time: FrameTime,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub resources: &'a mut ResourceManager,
    pub audio: &'a mut AudioEngine,
    pub viewport: Viewport,
}

impl UpdateCtx<'_> {
    #[inline]
    pub fn dt(&self) -> f32 {
        self.time.dt
    }

    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.input.key_down(key)
    }

    #[inline]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.input_frame.was_pressed(key)
    }
}
