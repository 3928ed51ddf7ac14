//! Batching renderers and the dispatcher that switches between them.
//!
//! `BatchRenderer` is the long-lived owner of the four sub-renderers.
//! Each frame it is bound to the device as a [`Batch`], which exposes the
//! drawing API and switches the active renderer whenever the primitive
//! kind changes. A switch ends the previous renderer's scene (one flush)
//! and reopens the new one with the same camera, so callers see a single
//! continuous scene.

mod circle;
mod common;
mod line;
mod point;
mod sprite;

pub use circle::{CircleRenderer, CircleVertex, MAX_CIRCLES};
pub use common::{DrawStats, RendererKind, SceneRenderer, SceneView};
pub use line::{LineRenderer, LineVertex, MAX_LINE_VERTICES};
pub use point::{PointRenderer, PointVertex, MAX_POINTS};
pub use sprite::{
    Outline, QuadVertex, RendererSettings, SpriteRenderer, TexturedQuad, MAX_QUADS,
    MAX_TEXTURE_SLOTS, UNIT_UVS,
};

use glam::Vec2;

use crate::math::TransformTree;
use crate::paint::Color;
use crate::scene::Sprite;
use crate::text::SpriteFont;

use super::camera::Camera;
use super::device::{DeviceError, GraphicsDevice};
use super::shader::BuiltinShaders;

/// Arena sizes of the four sub-renderers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BatchCapacities {
    pub quads: usize,
    pub line_vertices: usize,
    pub points: usize,
    pub circles: usize,
}

impl Default for BatchCapacities {
    fn default() -> Self {
        Self {
            quads: MAX_QUADS,
            line_vertices: MAX_LINE_VERTICES,
            points: MAX_POINTS,
            circles: MAX_CIRCLES,
        }
    }
}

#[derive(Debug)]
pub struct BatchRenderer {
    sprite: SpriteRenderer,
    line: LineRenderer,
    point: PointRenderer,
    circle: CircleRenderer,
    active: RendererKind,
    scene: Option<SceneView>,
}

impl BatchRenderer {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        shaders: &BuiltinShaders,
        settings: RendererSettings,
    ) -> Result<Self, DeviceError> {
        Self::with_capacities(device, shaders, settings, BatchCapacities::default())
    }

    pub fn with_capacities(
        device: &mut dyn GraphicsDevice,
        shaders: &BuiltinShaders,
        settings: RendererSettings,
        capacities: BatchCapacities,
    ) -> Result<Self, DeviceError> {
        let renderer = Self {
            sprite: SpriteRenderer::with_capacity(device, shaders.sprite, settings, capacities.quads)?,
            line: LineRenderer::with_capacity(device, shaders.line, capacities.line_vertices),
            point: PointRenderer::with_capacity(device, shaders.point, capacities.points),
            circle: CircleRenderer::with_capacity(device, shaders.circle, capacities.circles),
            active: RendererKind::Sprite,
            scene: None,
        };
        log::debug!("batch renderer ready: {capacities:?}");
        Ok(renderer)
    }

    /// Binds the renderer to `device` for the duration of a frame.
    pub fn bind<'a>(&'a mut self, device: &'a mut dyn GraphicsDevice) -> Batch<'a> {
        Batch { renderer: self, device }
    }

    /// Rolls every sub-renderer's per-frame counter. Call once per frame
    /// before the first scene.
    pub fn new_frame(&mut self) {
        for r in self.renderers_mut() {
            r.new_frame();
        }
    }

    #[inline]
    pub fn active(&self) -> RendererKind {
        self.active
    }

    pub fn is_scene_open(&self) -> bool {
        self.scene.is_some()
    }

    pub fn settings(&self) -> RendererSettings {
        self.sprite.settings()
    }

    pub fn set_settings(&mut self, settings: RendererSettings) {
        self.sprite.set_settings(settings);
    }

    /// Counters summed over the four sub-renderers.
    pub fn stats(&self) -> DrawStats {
        self.sprite.stats() + self.line.stats() + self.point.stats() + self.circle.stats()
    }

    pub fn stats_for(&self, kind: RendererKind) -> DrawStats {
        match kind {
            RendererKind::Sprite => self.sprite.stats(),
            RendererKind::Line => self.line.stats(),
            RendererKind::Point => self.point.stats(),
            RendererKind::Circle => self.circle.stats(),
        }
    }

    pub fn total_draw_calls(&self) -> u64 {
        self.stats().total
    }

    pub fn frame_draw_calls(&self) -> u32 {
        self.stats().frame
    }

    pub fn last_frame_draw_calls(&self) -> u32 {
        self.stats().last_frame
    }

    /// Frees every GPU object the sub-renderers own.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.scene = None;
        for r in self.renderers_mut() {
            r.release(device);
        }
    }

    fn renderers_mut(&mut self) -> [&mut dyn SceneRenderer; 4] {
        [&mut self.sprite, &mut self.line, &mut self.point, &mut self.circle]
    }

    fn current_mut(&mut self) -> &mut dyn SceneRenderer {
        match self.active {
            RendererKind::Sprite => &mut self.sprite,
            RendererKind::Line => &mut self.line,
            RendererKind::Point => &mut self.point,
            RendererKind::Circle => &mut self.circle,
        }
    }
}

/// Frame-scoped drawing API over a [`BatchRenderer`].
pub struct Batch<'a> {
    renderer: &'a mut BatchRenderer,
    device: &'a mut dyn GraphicsDevice,
}

impl Batch<'_> {
    pub fn begin_scene(&mut self, camera: &Camera) {
        self.begin_scene_view(camera.scene_view());
    }

    /// Opens a scene from a captured view. An open scene is ended first.
    pub fn begin_scene_view(&mut self, view: SceneView) {
        if self.renderer.scene.is_some() {
            log::debug!("begin_scene while a scene is open; ending it first");
            self.end_scene();
        }
        self.renderer.scene = Some(view);
        self.renderer.current_mut().begin_scene(self.device, &view);
    }

    pub fn end_scene(&mut self) {
        self.renderer.current_mut().end_scene(self.device);
        self.renderer.scene = None;
    }

    /// Ends the active renderer's scene and makes `kind` active, reopening
    /// the scene on it when one is in progress.
    pub fn switch_renderer(&mut self, kind: RendererKind) {
        let renderer = &mut *self.renderer;
        renderer.current_mut().end_scene(self.device);
        renderer.active = kind;
        if let Some(view) = renderer.scene {
            renderer.current_mut().begin_scene(self.device, &view);
        }
    }

    fn ensure(&mut self, kind: RendererKind) {
        if self.renderer.active != kind {
            self.switch_renderer(kind);
        }
    }

    pub fn render_quad(&mut self, position: Vec2, size: Vec2, anchor: Vec2, color: Color) {
        self.ensure(RendererKind::Sprite);
        self.renderer.sprite.render_quad(self.device, position, size, anchor, color);
    }

    pub fn render_quad_outlined(&mut self, position: Vec2, size: Vec2, anchor: Vec2, color: Color, outline: Outline) {
        self.ensure(RendererKind::Sprite);
        self.renderer
            .sprite
            .render_quad_outlined(self.device, position, size, anchor, color, outline);
    }

    pub fn render_rotated_quad(&mut self, position: Vec2, size: Vec2, radians: f32, anchor: Vec2, color: Color) {
        self.ensure(RendererKind::Sprite);
        self.renderer
            .sprite
            .render_rotated_quad(self.device, position, size, radians, anchor, color);
    }

    pub fn render_rotated_quad_outlined(
        &mut self,
        position: Vec2,
        size: Vec2,
        radians: f32,
        anchor: Vec2,
        color: Color,
        outline: Outline,
    ) {
        self.ensure(RendererKind::Sprite);
        self.renderer
            .sprite
            .render_rotated_quad_outlined(self.device, position, size, radians, anchor, color, outline);
    }

    pub fn render_textured_quad(&mut self, quad: &TexturedQuad<'_>) {
        self.ensure(RendererKind::Sprite);
        self.renderer.sprite.render_textured_quad(self.device, quad);
    }

    pub fn render_sprite(&mut self, sprite: &Sprite, transforms: &mut TransformTree) {
        self.ensure(RendererKind::Sprite);
        let world = transforms.world_transform(sprite.node());
        self.renderer.sprite.render_sprite(self.device, sprite, &world);
    }

    pub fn render_sprite_font(&mut self, text: &SpriteFont, transforms: &mut TransformTree) {
        self.ensure(RendererKind::Sprite);
        let world = transforms.world_transform(text.node());
        self.renderer.sprite.render_sprite_font(self.device, text, &world);
    }

    pub fn render_line(&mut self, start: Vec2, end: Vec2, color: Color, width: f32) {
        self.ensure(RendererKind::Line);
        self.renderer.line.render_line(self.device, start, end, color, width);
    }

    /// Draws `points` rotated by `radians`, then offset by `position`.
    pub fn render_line_strip(&mut self, points: &[Vec2], color: Color, width: f32, position: Vec2, radians: f32) {
        self.ensure(RendererKind::Line);
        self.renderer
            .line
            .render_line_strip(self.device, points, color, width, position, radians);
    }

    /// A single pixel, or a filled circle of radius `size` for any other size.
    pub fn render_point(&mut self, position: Vec2, color: Color, size: f32) {
        if size == 1.0 {
            self.ensure(RendererKind::Point);
            self.renderer.point.render_point(self.device, position, color);
        } else {
            self.render_circle(position, size, color);
        }
    }

    pub fn render_circle(&mut self, center: Vec2, radius: f32, fill: Color) {
        self.render_circle_outlined(center, radius, fill, Color::CLEAR, 0.0);
    }

    pub fn render_circle_outlined(&mut self, center: Vec2, radius: f32, fill: Color, outline_color: Color, outline: f32) {
        self.ensure(RendererKind::Circle);
        self.renderer
            .circle
            .render_circle(self.device, center, radius, fill, outline_color, outline);
    }

    pub fn active(&self) -> RendererKind {
        self.renderer.active
    }

    pub fn stats(&self) -> DrawStats {
        self.renderer.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::render::device::Topology;
    use crate::render::headless::HeadlessDevice;

    fn setup(device: &mut HeadlessDevice) -> BatchRenderer {
        let shaders = BuiltinShaders::compile(device).unwrap();
        let settings = RendererSettings { sprite_outline: false };
        let capacities = BatchCapacities {
            quads: 64,
            line_vertices: 64,
            points: 64,
            circles: 64,
        };
        BatchRenderer::with_capacities(device, &shaders, settings, capacities).unwrap()
    }

    fn camera() -> Camera {
        Camera::new(Viewport::from_size(640.0, 480.0))
    }

    fn shaders_of(device: &HeadlessDevice) -> Vec<&'static str> {
        device.draws().iter().filter_map(|d| d.shader).collect()
    }

    // ── switching ─────────────────────────────────────────────────────────

    #[test]
    fn starts_on_sprite_renderer() {
        let mut device = HeadlessDevice::new();
        let renderer = setup(&mut device);
        assert_eq!(renderer.active(), RendererKind::Sprite);
        assert!(!renderer.is_scene_open());
    }

    #[test]
    fn kind_change_flushes_previous_batch() {
        let mut device = HeadlessDevice::new();
        let mut renderer = setup(&mut device);
        let cam = camera();

        let mut batch = renderer.bind(&mut device);
        batch.begin_scene(&cam);
        batch.render_quad(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Color::WHITE);
        batch.render_quad(Vec2::ONE, Vec2::ONE, Vec2::ZERO, Color::WHITE);
        batch.render_line(Vec2::ZERO, Vec2::ONE, Color::RED, 1.0);
        batch.render_circle(Vec2::ZERO, 5.0, Color::BLUE);
        batch.render_quad(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Color::WHITE);
        batch.end_scene();

        assert_eq!(shaders_of(&device), vec!["sprite", "line", "circle", "sprite"]);
        let counts: Vec<u32> = device.draws().iter().map(|d| d.index_count).collect();
        assert_eq!(counts, vec![12, 4, 6, 6]);
        assert_eq!(renderer.frame_draw_calls(), 4);
    }

    #[test]
    fn same_kind_does_not_flush() {
        let mut device = HeadlessDevice::new();
        let mut renderer = setup(&mut device);
        let cam = camera();

        let mut batch = renderer.bind(&mut device);
        batch.begin_scene(&cam);
        for i in 0..10 {
            batch.render_line(Vec2::ZERO, Vec2::splat(i as f32 + 1.0), Color::RED, 1.0);
        }
        assert_eq!(batch.active(), RendererKind::Line);
        batch.end_scene();

        assert_eq!(device.draws().len(), 1);
        assert_eq!(device.draws()[0].topology, Topology::LineStripAdjacency);
    }

    #[test]
    fn switch_reopens_with_scene_camera() {
        let mut device = HeadlessDevice::new();
        let mut renderer = setup(&mut device);
        let cam = camera();
        let expected = cam.scene_view().uniforms();

        let mut batch = renderer.bind(&mut device);
        batch.begin_scene(&cam);
        batch.render_point(Vec2::ONE, Color::WHITE, 1.0);
        batch.end_scene();

        assert_eq!(device.draws()[0].uniforms, Some(expected));
    }

    #[test]
    fn switch_without_scene_does_not_begin() {
        let mut device = HeadlessDevice::new();
        let mut renderer = setup(&mut device);

        let mut batch = renderer.bind(&mut device);
        batch.switch_renderer(RendererKind::Circle);
        batch.render_circle(Vec2::ZERO, 3.0, Color::WHITE);
        batch.end_scene();

        assert!(device.draws().is_empty());
        assert_eq!(renderer.active(), RendererKind::Circle);
    }

    // ── points ────────────────────────────────────────────────────────────

    #[test]
    fn unit_points_use_point_renderer() {
        let mut device = HeadlessDevice::new();
        let mut renderer = setup(&mut device);
        let cam = camera();

        let mut batch = renderer.bind(&mut device);
        batch.begin_scene(&cam);
        batch.render_point(Vec2::ONE, Color::WHITE, 1.0);
        batch.render_point(Vec2::ONE, Color::WHITE, 4.0);
        batch.end_scene();

        assert_eq!(shaders_of(&device), vec!["point", "circle"]);
        let circle = device.draws()[1].vertices::<CircleVertex>();
        assert_eq!(circle[0].radius, 4.0);
        assert_eq!(circle[0].outline_color, Color::CLEAR.to_array());
    }

    // ── counters ──────────────────────────────────────────────────────────

    #[test]
    fn new_frame_rolls_counters() {
        let mut device = HeadlessDevice::new();
        let mut renderer = setup(&mut device);
        let cam = camera();

        for frame in 0..2 {
            renderer.new_frame();
            let mut batch = renderer.bind(&mut device);
            batch.begin_scene(&cam);
            batch.render_quad(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Color::WHITE);
            if frame == 1 {
                batch.render_line(Vec2::ZERO, Vec2::ONE, Color::WHITE, 1.0);
            }
            batch.end_scene();
        }
        assert_eq!(renderer.last_frame_draw_calls(), 1);
        assert_eq!(renderer.frame_draw_calls(), 2);
        assert_eq!(renderer.total_draw_calls(), 3);

        renderer.new_frame();
        assert_eq!(renderer.last_frame_draw_calls(), 2);
        assert_eq!(renderer.frame_draw_calls(), 0);
        assert_eq!(renderer.stats_for(RendererKind::Line).total, 1);
    }

    #[test]
    fn overflow_within_dispatcher_keeps_order() {
        let mut device = HeadlessDevice::new();
        let mut renderer = setup(&mut device);
        let cam = camera();

        let mut batch = renderer.bind(&mut device);
        batch.begin_scene(&cam);
        for i in 0..65 {
            batch.render_quad(Vec2::new(i as f32, 0.0), Vec2::ONE, Vec2::ZERO, Color::WHITE);
        }
        batch.end_scene();

        let draws = device.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].index_count, 64 * 6);
        assert_eq!(draws[1].index_count, 6);
        assert_eq!(draws[1].vertices::<QuadVertex>()[0].position, [64.0, 0.0]);
    }

    #[test]
    fn release_frees_device_objects() {
        let mut device = HeadlessDevice::new();
        let mut renderer = setup(&mut device);
        assert_eq!(device.live_textures(), 1);
        renderer.release(&mut device);
        assert_eq!(device.live_textures(), 0);
    }
}
