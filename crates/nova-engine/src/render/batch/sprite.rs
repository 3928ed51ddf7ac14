//! Textured and flat quads, batched across up to 32 texture slots.

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};

use crate::paint::Color;
use crate::render::device::{DeviceError, GraphicsDevice, ImageData, ShaderId, TextureId, Topology};
use crate::render::layout::{BufferElement, BufferLayout, ShaderDataType, Vertex};
use crate::render::texture::Texture;
use crate::scene::Sprite;
use crate::text::SpriteFont;

use super::common::{
    quad_indices, BatchCore, DrawStats, RendererKind, SceneRenderer, SceneView, QUAD_CORNERS,
    QUAD_INDEX_COUNT, QUAD_VERTEX_COUNT,
};

pub const MAX_QUADS: usize = 20_000;

/// Upper bound of the slot table, slot 0 included.
pub const MAX_TEXTURE_SLOTS: u32 = 32;

const WHITE_SLOT: f32 = 0.0;

const DEBUG_OUTLINE: Outline = Outline { color: Color::BLUE, width: 2.0 };
const ANCHOR_CROSS_SIZE: Vec2 = Vec2::new(12.0, 2.0);
const ANCHOR_CROSS_COLOR: Color = Color::GREEN;

/// UVs of an untextured quad, in [`QUAD_CORNERS`] order.
pub const UNIT_UVS: [Vec2; 4] = QUAD_CORNERS;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub tex_index: f32,
    pub tiling: f32,
}

impl Vertex for QuadVertex {
    fn layout() -> BufferLayout {
        BufferLayout::new([
            BufferElement::new(ShaderDataType::Float2, "a_position"),
            BufferElement::new(ShaderDataType::Float2, "a_tex_coord"),
            BufferElement::new(ShaderDataType::Float4, "a_color"),
            BufferElement::new(ShaderDataType::Float, "a_tex_index"),
            BufferElement::new(ShaderDataType::Float, "a_tiling"),
        ])
    }
}

/// Runtime switches for the sprite path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RendererSettings {
    /// Draw each sprite's bounds and anchor.
    pub sprite_outline: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            sprite_outline: cfg!(debug_assertions),
        }
    }
}

/// Rectangle border drawn around a quad as four thin bars.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Outline {
    pub color: Color,
    pub width: f32,
}

/// A quad sampling `texture`.
///
/// `uv` is given per corner in [`QUAD_CORNERS`] order (bottom-left first).
#[derive(Debug, Copy, Clone)]
pub struct TexturedQuad<'t> {
    pub texture: &'t Texture,
    pub transform: Affine2,
    pub size: Vec2,
    pub anchor: Vec2,
    pub uv: [Vec2; 4],
    pub tint: Color,
    pub tiling: f32,
}

impl<'t> TexturedQuad<'t> {
    /// The whole texture at its pixel size, placed by `transform`.
    pub fn new(texture: &'t Texture, transform: Affine2) -> Self {
        Self {
            texture,
            transform,
            size: texture.size(),
            anchor: Vec2::ZERO,
            uv: UNIT_UVS,
            tint: Color::WHITE,
            tiling: 1.0,
        }
    }
}

struct QuadGeometry<'a> {
    transform: &'a Affine2,
    size: Vec2,
    anchor: Vec2,
    uv: &'a [Vec2; 4],
    color: Color,
    tiling: f32,
}

#[derive(Debug)]
pub struct SpriteRenderer {
    core: BatchCore<QuadVertex>,
    white: Texture,
    /// Bound textures for the current window; index 0 is always `white`.
    slots: Vec<TextureId>,
    max_slots: usize,
    settings: RendererSettings,
}

impl SpriteRenderer {
    pub fn new(
        device: &mut dyn GraphicsDevice,
        shader: ShaderId,
        settings: RendererSettings,
    ) -> Result<Self, DeviceError> {
        Self::with_capacity(device, shader, settings, MAX_QUADS)
    }

    pub fn with_capacity(
        device: &mut dyn GraphicsDevice,
        shader: ShaderId,
        settings: RendererSettings,
        quads: usize,
    ) -> Result<Self, DeviceError> {
        let quads = quads.max(1);
        let white = Texture::create(device, "nova white texture", &ImageData::white())?;
        let max_slots = MAX_TEXTURE_SLOTS.min(device.max_texture_slots()).max(1) as usize;

        let core = BatchCore::new(
            device,
            "nova sprite batch",
            shader,
            Topology::Triangles,
            quads * QUAD_VERTEX_COUNT,
            &quad_indices(quads),
        );

        let mut slots = Vec::with_capacity(max_slots);
        slots.push(white.id());

        Ok(Self {
            core,
            white,
            slots,
            max_slots,
            settings,
        })
    }

    pub fn settings(&self) -> RendererSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: RendererSettings) {
        self.settings = settings;
    }

    /// Number of occupied slots, the white slot included.
    pub fn texture_slots_in_use(&self) -> usize {
        self.slots.len()
    }

    /// Axis-aligned quad, lower-left corner offset by `size * anchor`.
    pub fn render_quad(
        &mut self,
        device: &mut dyn GraphicsDevice,
        position: Vec2,
        size: Vec2,
        anchor: Vec2,
        color: Color,
    ) {
        let transform = Affine2::from_translation(position);
        self.render_flat(device, &transform, size, anchor, color);
    }

    pub fn render_quad_outlined(
        &mut self,
        device: &mut dyn GraphicsDevice,
        position: Vec2,
        size: Vec2,
        anchor: Vec2,
        color: Color,
        outline: Outline,
    ) {
        let transform = Affine2::from_translation(position);
        self.render_flat(device, &transform, size, anchor, color);
        self.render_outline(device, &transform, size, anchor, outline);
    }

    pub fn render_rotated_quad(
        &mut self,
        device: &mut dyn GraphicsDevice,
        position: Vec2,
        size: Vec2,
        radians: f32,
        anchor: Vec2,
        color: Color,
    ) {
        let transform = Affine2::from_angle_translation(radians, position);
        self.render_flat(device, &transform, size, anchor, color);
    }

    pub fn render_rotated_quad_outlined(
        &mut self,
        device: &mut dyn GraphicsDevice,
        position: Vec2,
        size: Vec2,
        radians: f32,
        anchor: Vec2,
        color: Color,
        outline: Outline,
    ) {
        let transform = Affine2::from_angle_translation(radians, position);
        self.render_flat(device, &transform, size, anchor, color);
        self.render_outline(device, &transform, size, anchor, outline);
    }

    pub fn render_textured_quad(&mut self, device: &mut dyn GraphicsDevice, quad: &TexturedQuad<'_>) {
        if !self.core.accepting() {
            return;
        }
        self.push_textured(
            device,
            quad.texture.id(),
            QuadGeometry {
                transform: &quad.transform,
                size: quad.size,
                anchor: quad.anchor,
                uv: &quad.uv,
                color: quad.tint,
                tiling: quad.tiling,
            },
        );
    }

    /// Draws `sprite` with its node's world transform `world`.
    pub fn render_sprite(&mut self, device: &mut dyn GraphicsDevice, sprite: &Sprite, world: &Affine2) {
        if !self.core.accepting() {
            return;
        }
        let uv = sprite.uv_corners();
        self.push_textured(
            device,
            sprite.texture().id(),
            QuadGeometry {
                transform: world,
                size: sprite.size(),
                anchor: sprite.anchor(),
                uv: &uv,
                color: sprite.color(),
                tiling: 1.0,
            },
        );

        if self.settings.sprite_outline {
            self.render_outline(device, world, sprite.size(), sprite.anchor(), DEBUG_OUTLINE);
            self.render_anchor(device, world);
        }
    }

    /// Draws every visible glyph of `text`, placed under `world`.
    pub fn render_sprite_font(&mut self, device: &mut dyn GraphicsDevice, text: &SpriteFont, world: &Affine2) {
        if text.text().is_empty() || !self.core.accepting() {
            return;
        }
        let texture = text.font().texture().id();
        for glyph in text.glyph_quads() {
            let transform = *world * glyph.local;
            self.push_textured(
                device,
                texture,
                QuadGeometry {
                    transform: &transform,
                    size: glyph.size,
                    anchor: glyph.anchor,
                    uv: &glyph.uv,
                    color: glyph.color,
                    tiling: 1.0,
                },
            );
        }

        if self.settings.sprite_outline {
            self.render_outline(device, world, text.size(), text.anchor(), DEBUG_OUTLINE);
            self.render_anchor(device, world);
        }
    }

    fn render_flat(
        &mut self,
        device: &mut dyn GraphicsDevice,
        transform: &Affine2,
        size: Vec2,
        anchor: Vec2,
        color: Color,
    ) {
        if !self.core.accepting() {
            return;
        }
        self.ensure_room(device);
        self.push(
            QuadGeometry {
                transform,
                size,
                anchor,
                uv: &UNIT_UVS,
                color,
                tiling: 1.0,
            },
            WHITE_SLOT,
        );
    }

    fn push_textured(&mut self, device: &mut dyn GraphicsDevice, texture: TextureId, quad: QuadGeometry<'_>) {
        // Room first: a flush after the slot is assigned would drop the slot.
        self.ensure_room(device);
        let slot = self.texture_slot(device, texture);
        self.push(quad, slot);
    }

    fn ensure_room(&mut self, device: &mut dyn GraphicsDevice) {
        if !self.core.fits(QUAD_VERTEX_COUNT, QUAD_INDEX_COUNT) {
            self.flush_and_reset(device);
        }
    }

    /// Slot holding `texture`, binding it to the next free slot if needed.
    fn texture_slot(&mut self, device: &mut dyn GraphicsDevice, texture: TextureId) -> f32 {
        if texture == self.white.id() {
            return WHITE_SLOT;
        }
        if let Some(i) = self.slots[1..].iter().position(|&t| t == texture) {
            return (i + 1) as f32;
        }
        if self.slots.len() >= self.max_slots {
            self.flush_and_reset(device);
        }
        self.slots.push(texture);
        (self.slots.len() - 1) as f32
    }

    fn push(&mut self, quad: QuadGeometry<'_>, tex_index: f32) {
        let offset = quad.size * quad.anchor;
        let color = quad.color.to_array();
        let vertices: [QuadVertex; QUAD_VERTEX_COUNT] = std::array::from_fn(|i| QuadVertex {
            position: quad
                .transform
                .transform_point2(QUAD_CORNERS[i] * quad.size - offset)
                .to_array(),
            uv: quad.uv[i].to_array(),
            color,
            tex_index,
            tiling: quad.tiling,
        });
        self.core.push(&vertices, QUAD_INDEX_COUNT);
    }

    /// Four bars hugging the quad's edges, rotated with it.
    fn render_outline(
        &mut self,
        device: &mut dyn GraphicsDevice,
        transform: &Affine2,
        size: Vec2,
        anchor: Vec2,
        outline: Outline,
    ) {
        let (scale, angle, translation) = transform.to_scale_angle_translation();
        let frame = Affine2::from_angle_translation(angle, translation);

        let size = size * scale;
        let min = -size * anchor;
        let max = min + size;
        let mid = (min + max) * 0.5;
        let half = outline.width * 0.5;

        let vertical = Vec2::new(outline.width, size.y);
        let horizontal = Vec2::new(size.x + outline.width * 2.0, outline.width);
        let bars = [
            (Vec2::new(min.x - half, mid.y), vertical),
            (Vec2::new(max.x + half, mid.y), vertical),
            (Vec2::new(mid.x, min.y - half), horizontal),
            (Vec2::new(mid.x, max.y + half), horizontal),
        ];

        for (center, bar) in bars {
            let bar_transform = frame * Affine2::from_translation(center);
            self.render_flat(device, &bar_transform, bar, Vec2::splat(0.5), outline.color);
        }
    }

    /// Cross centred on the transform's origin, unaffected by scale.
    fn render_anchor(&mut self, device: &mut dyn GraphicsDevice, transform: &Affine2) {
        let (_, angle, translation) = transform.to_scale_angle_translation();
        let frame = Affine2::from_angle_translation(angle, translation);
        let center = Vec2::splat(0.5);
        self.render_flat(device, &frame, ANCHOR_CROSS_SIZE, center, ANCHOR_CROSS_COLOR);
        self.render_flat(device, &frame, Vec2::new(ANCHOR_CROSS_SIZE.y, ANCHOR_CROSS_SIZE.x), center, ANCHOR_CROSS_COLOR);
    }

    fn reset_slots(&mut self) {
        self.slots.truncate(1);
    }
}

impl SceneRenderer for SpriteRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Sprite
    }

    fn begin_scene(&mut self, device: &mut dyn GraphicsDevice, view: &SceneView) {
        self.core.begin(device, view);
        self.reset_slots();
    }

    fn end_scene(&mut self, device: &mut dyn GraphicsDevice) {
        if self.core.scene.is_none() {
            return;
        }
        self.core.upload(device);
        self.flush(device);
        self.core.reset();
        self.reset_slots();
        self.core.scene = None;
    }

    fn flush(&mut self, device: &mut dyn GraphicsDevice) {
        if self.core.index_count() == 0 {
            return;
        }
        for (slot, &texture) in self.slots.iter().enumerate() {
            device.bind_texture(slot as u32, texture);
        }
        self.core.draw(device);
    }

    fn flush_and_reset(&mut self, device: &mut dyn GraphicsDevice) {
        self.core.upload(device);
        self.flush(device);
        self.core.reset();
        self.reset_slots();
    }

    fn stats(&self) -> DrawStats {
        self.core.stats()
    }

    fn new_frame(&mut self) {
        self.core.new_frame();
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.core.release(device);
        device.delete_texture(self.white.id());
        self.reset_slots();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::render::headless::{DrawRecord, HeadlessDevice};
    use crate::render::shader::BuiltinShaders;
    use glam::Mat4;

    fn view() -> SceneView {
        SceneView {
            view_projection: Mat4::IDENTITY,
            viewport: Viewport::from_size(800.0, 600.0),
        }
    }

    fn renderer(device: &mut HeadlessDevice, quads: usize) -> SpriteRenderer {
        let shaders = BuiltinShaders::compile(device).unwrap();
        let settings = RendererSettings { sprite_outline: false };
        SpriteRenderer::with_capacity(device, shaders.sprite, settings, quads).unwrap()
    }

    fn texture(device: &mut HeadlessDevice, name: &str) -> Texture {
        Texture::create(device, name, &ImageData::white()).unwrap()
    }

    fn unit_quad(r: &mut SpriteRenderer, device: &mut HeadlessDevice, x: f32) {
        r.render_quad(device, Vec2::new(x, 0.0), Vec2::ONE, Vec2::ZERO, Color::WHITE);
    }

    fn draws_of(device: &mut HeadlessDevice) -> Vec<DrawRecord> {
        device.take_draws()
    }

    // ── flush policy ──────────────────────────────────────────────────────

    #[test]
    fn quads_within_capacity_flush_once() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 100);
        r.begin_scene(&mut device, &view());
        for i in 0..40 {
            unit_quad(&mut r, &mut device, i as f32);
        }
        r.end_scene(&mut device);

        let draws = draws_of(&mut device);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].index_count, 40 * 6);
        assert_eq!(draws[0].topology, Topology::Triangles);
        assert_eq!(draws[0].vertices::<QuadVertex>().len(), 160);
        assert_eq!(r.stats().frame, 1);
    }

    #[test]
    fn full_capacity_scene_overflows_by_one() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, MAX_QUADS);
        r.begin_scene(&mut device, &view());
        for i in 0..=MAX_QUADS {
            unit_quad(&mut r, &mut device, i as f32);
        }
        r.end_scene(&mut device);

        let draws = draws_of(&mut device);
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].index_count, MAX_QUADS as u32 * 6);
        assert_eq!(draws[1].index_count, 6);

        // Submission order survives the split.
        let last_of_first = draws[0].vertices::<QuadVertex>()[MAX_QUADS * 4 - 4];
        let only_of_second = draws[1].vertices::<QuadVertex>()[0];
        assert_eq!(last_of_first.position, [(MAX_QUADS - 1) as f32, 0.0]);
        assert_eq!(only_of_second.position, [MAX_QUADS as f32, 0.0]);
    }

    #[test]
    fn draw_count_is_ceil_of_capacity() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 8);
        r.begin_scene(&mut device, &view());
        for i in 0..20 {
            unit_quad(&mut r, &mut device, i as f32);
        }
        r.end_scene(&mut device);

        let counts: Vec<u32> = draws_of(&mut device).iter().map(|d| d.index_count).collect();
        assert_eq!(counts, vec![48, 48, 24]);
    }

    #[test]
    fn empty_scene_issues_no_draw() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 8);
        r.begin_scene(&mut device, &view());
        r.end_scene(&mut device);
        assert!(device.draws().is_empty());
        assert_eq!(r.stats(), DrawStats::default());
    }

    #[test]
    fn second_end_scene_does_not_resubmit() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 8);
        r.begin_scene(&mut device, &view());
        unit_quad(&mut r, &mut device, 0.0);
        r.end_scene(&mut device);
        r.end_scene(&mut device);
        assert_eq!(device.draws().len(), 1);
    }

    #[test]
    fn draws_outside_scene_are_ignored() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 8);
        unit_quad(&mut r, &mut device, 0.0);
        r.begin_scene(&mut device, &view());
        r.end_scene(&mut device);
        assert!(device.draws().is_empty());
    }

    #[test]
    fn zero_capacity_holds_one_quad() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 0);
        r.begin_scene(&mut device, &view());
        unit_quad(&mut r, &mut device, 0.0);
        unit_quad(&mut r, &mut device, 1.0);
        r.end_scene(&mut device);

        let counts: Vec<u32> = draws_of(&mut device).iter().map(|d| d.index_count).collect();
        assert_eq!(counts, vec![6, 6]);
    }

    // ── texture slots ─────────────────────────────────────────────────────

    #[test]
    fn repeated_texture_reuses_its_slot() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 100);
        let (t1, t2, t3) = (
            texture(&mut device, "t1"),
            texture(&mut device, "t2"),
            texture(&mut device, "t3"),
        );

        r.begin_scene(&mut device, &view());
        for t in [&t1, &t2, &t1, &t3] {
            r.render_textured_quad(&mut device, &TexturedQuad::new(t, Affine2::IDENTITY));
        }
        assert_eq!(r.texture_slots_in_use(), 4);
        r.end_scene(&mut device);

        let draws = draws_of(&mut device);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].extra_textures(), vec![t1.id(), t2.id(), t3.id()]);

        let slots: Vec<f32> = draws[0]
            .vertices::<QuadVertex>()
            .chunks(4)
            .map(|q| q[0].tex_index)
            .collect();
        assert_eq!(slots, vec![1.0, 2.0, 1.0, 3.0]);
    }

    #[test]
    fn thirty_one_textures_fit_thirty_second_flushes() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 100);
        let textures: Vec<Texture> = (0..32).map(|i| texture(&mut device, &format!("t{i}"))).collect();

        r.begin_scene(&mut device, &view());
        for t in &textures[..31] {
            r.render_textured_quad(&mut device, &TexturedQuad::new(t, Affine2::IDENTITY));
        }
        assert!(device.draws().is_empty());

        r.render_textured_quad(&mut device, &TexturedQuad::new(&textures[31], Affine2::IDENTITY));
        assert_eq!(device.draws().len(), 1);
        assert_eq!(device.draws()[0].index_count, 31 * 6);
        assert_eq!(r.texture_slots_in_use(), 2);

        r.end_scene(&mut device);
        let draws = draws_of(&mut device);
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].index_count, 6);
        assert_eq!(draws[1].vertices::<QuadVertex>()[0].tex_index, 1.0);
    }

    #[test]
    fn slot_table_follows_device_limit() {
        let mut device = HeadlessDevice::with_texture_slots(4);
        let shaders = BuiltinShaders::compile(&mut device).unwrap();
        let mut r = SpriteRenderer::with_capacity(&mut device, shaders.sprite, RendererSettings::default(), 100).unwrap();
        let textures: Vec<Texture> = (0..4).map(|i| texture(&mut device, &format!("t{i}"))).collect();

        r.begin_scene(&mut device, &view());
        for t in &textures {
            r.render_textured_quad(&mut device, &TexturedQuad::new(t, Affine2::IDENTITY));
        }
        r.end_scene(&mut device);
        assert_eq!(device.draws().len(), 2);
    }

    #[test]
    fn flat_quads_sample_white_slot() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 8);
        r.begin_scene(&mut device, &view());
        unit_quad(&mut r, &mut device, 0.0);
        r.end_scene(&mut device);

        let draw = &device.draws()[0];
        assert_eq!(draw.vertices::<QuadVertex>()[0].tex_index, 0.0);
        assert_eq!(draw.textures.len(), 1);
        assert!(draw.extra_textures().is_empty());
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn anchor_offsets_corners() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 8);
        r.begin_scene(&mut device, &view());
        r.render_quad(&mut device, Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0), Vec2::splat(0.5), Color::RED);
        r.end_scene(&mut device);

        let positions: Vec<[f32; 2]> = device.draws()[0]
            .vertices::<QuadVertex>()
            .iter()
            .map(|v| v.position)
            .collect();
        assert_eq!(positions, vec![[90.0, 45.0], [110.0, 45.0], [110.0, 55.0], [90.0, 55.0]]);
    }

    #[test]
    fn rotated_quad_turns_about_position() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 8);
        r.begin_scene(&mut device, &view());
        r.render_rotated_quad(
            &mut device,
            Vec2::ZERO,
            Vec2::new(10.0, 2.0),
            std::f32::consts::FRAC_PI_2,
            Vec2::ZERO,
            Color::WHITE,
        );
        r.end_scene(&mut device);

        let v = device.draws()[0].vertices::<QuadVertex>();
        assert!((v[1].position[0]).abs() < 1e-4);
        assert!((v[1].position[1] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn outlined_quad_adds_four_bars() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 16);
        r.begin_scene(&mut device, &view());
        r.render_quad_outlined(
            &mut device,
            Vec2::ZERO,
            Vec2::new(10.0, 10.0),
            Vec2::ZERO,
            Color::WHITE,
            Outline { color: Color::RED, width: 2.0 },
        );
        r.end_scene(&mut device);

        let v = device.draws()[0].vertices::<QuadVertex>();
        assert_eq!(v.len(), 5 * 4);
        // Left bar spans x in [-2, 0].
        assert_eq!(v[4].position, [-2.0, 0.0]);
        assert_eq!(v[5].position, [0.0, 0.0]);
        // Bottom bar is widened to cover the corners.
        assert_eq!(v[12].position, [-2.0, -2.0]);
        assert_eq!(v[13].position, [12.0, -2.0]);
        assert_eq!(v[4].color, Color::RED.to_array());
    }

    #[test]
    fn sprite_outline_adds_bars_and_cross() {
        use crate::coords::Rect;
        use crate::math::TransformTree;
        use std::rc::Rc;

        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 16);
        r.set_settings(RendererSettings { sprite_outline: true });

        let tex = Rc::new(texture(&mut device, "ship"));
        let mut tree = TransformTree::new();
        let sprite = Sprite::with_frame(&mut tree, tex, Rect::new(0.0, 0.0, 1.0, 1.0));
        let world = tree.world_transform(sprite.node());

        r.begin_scene(&mut device, &view());
        r.render_sprite(&mut device, &sprite, &world);
        r.end_scene(&mut device);

        let v = device.draws()[0].vertices::<QuadVertex>();
        assert_eq!(v.len(), (1 + 4 + 2) * 4);
        assert_eq!(v[4].color, Color::BLUE.to_array());
        assert_eq!(v[20].color, Color::GREEN.to_array());
    }
}
