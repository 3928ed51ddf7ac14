use std::rc::Rc;

use glam::Vec2;

use crate::config::DebugConfig;
use crate::coords::Viewport;
use crate::math::TransformTree;
use crate::paint::Color;
use crate::render::{Batch, Camera};
use crate::text::{Font, SpriteFont};
use crate::time::FpsCounter;

const MARGIN: f32 = 10.0;

/// Renderer counters shown by the overlay.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct OverlayStats {
    pub total_draw_calls: u64,
    pub frame_draw_calls: u32,
}

/// FPS and draw-call readout in the top-left corner, drawn over the game.
#[derive(Debug)]
pub(crate) struct DebugOverlay {
    draw_fps: bool,
    draw_total: bool,
    draw_frame: bool,
    fps: FpsCounter,
    camera: Camera,
    transforms: TransformTree,
    text: Option<SpriteFont>,
}

impl DebugOverlay {
    /// `font` is `None` when the overlay font could not be loaded; counters
    /// are still kept but nothing is drawn.
    pub fn new(config: &DebugConfig, font: Option<Rc<Font>>, viewport: Viewport) -> Self {
        let mut transforms = TransformTree::new();
        let text = font.map(|font| {
            let mut text = SpriteFont::new(&mut transforms, font);
            text.set_anchor(Vec2::new(0.0, 1.0));
            text.set_color(Color::WHITE);
            text
        });
        let mut overlay = Self {
            draw_fps: config.draw_fps,
            draw_total: config.draw_total_draw_calls,
            draw_frame: config.draw_frame_draw_calls,
            fps: FpsCounter::new(),
            camera: Camera::new(viewport),
            transforms,
            text,
        };
        overlay.place_text();
        overlay
    }

    pub fn is_enabled(&self) -> bool {
        self.draw_fps || self.draw_total || self.draw_frame
    }

    pub fn record_frame(&mut self, dt: f32) {
        self.fps.record(dt);
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.camera.on_resize(width, height);
        self.place_text();
    }

    pub fn render(&mut self, batch: &mut Batch<'_>, stats: OverlayStats) {
        if !self.is_enabled() {
            return;
        }
        let content = self.content(stats);
        let Some(text) = self.text.as_mut() else {
            return;
        };
        text.set_text(content);

        batch.begin_scene(&self.camera);
        batch.render_sprite_font(text, &mut self.transforms);
        batch.end_scene();
    }

    fn content(&self, stats: OverlayStats) -> String {
        let mut lines = Vec::with_capacity(3);
        if self.draw_fps {
            lines.push(format!("FPS: {:.0}", self.fps.fps()));
        }
        if self.draw_total {
            lines.push(format!("Total draw calls: {}", stats.total_draw_calls));
        }
        if self.draw_frame {
            lines.push(format!("Frame draw calls: {}", stats.frame_draw_calls));
        }
        lines.join("\n")
    }

    fn place_text(&mut self) {
        if let Some(text) = &self.text {
            let top_left = Vec2::new(MARGIN, self.camera.viewport().height - MARGIN);
            self.transforms.set_position(text.node(), top_left);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(fps: bool, total: bool, frame: bool) -> DebugConfig {
        DebugConfig {
            draw_fps: fps,
            draw_total_draw_calls: total,
            draw_frame_draw_calls: frame,
            ..DebugConfig::default()
        }
    }

    #[test]
    fn content_lists_enabled_counters() {
        let overlay = DebugOverlay::new(&config(true, false, true), None, Viewport::from_size(800.0, 600.0));
        let stats = OverlayStats { total_draw_calls: 120, frame_draw_calls: 4 };
        assert_eq!(overlay.content(stats), "FPS: 0\nFrame draw calls: 4");
    }

    #[test]
    fn all_flags_off_disables_overlay() {
        let overlay = DebugOverlay::new(&config(false, false, false), None, Viewport::from_size(800.0, 600.0));
        assert!(!overlay.is_enabled());
        assert_eq!(overlay.content(OverlayStats::default()), "");
    }
}
