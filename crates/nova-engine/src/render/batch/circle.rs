//! Circles as single quads, shaded by a signed-distance test.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::paint::Color;
use crate::render::device::{GraphicsDevice, ShaderId, Topology};
use crate::render::layout::{BufferElement, BufferLayout, ShaderDataType, Vertex};

use super::common::{
    quad_indices, BatchCore, DrawStats, RendererKind, SceneRenderer, SceneView, QUAD_CORNERS,
    QUAD_INDEX_COUNT, QUAD_VERTEX_COUNT,
};

pub const MAX_CIRCLES: usize = 20_000;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CircleVertex {
    pub position: [f32; 2],
    pub center: [f32; 2],
    pub radius: f32,
    pub outline: f32,
    pub fill: [f32; 4],
    pub outline_color: [f32; 4],
}

impl Vertex for CircleVertex {
    fn layout() -> BufferLayout {
        BufferLayout::new([
            BufferElement::new(ShaderDataType::Float2, "a_position"),
            BufferElement::new(ShaderDataType::Float2, "a_center"),
            BufferElement::new(ShaderDataType::Float, "a_radius"),
            BufferElement::new(ShaderDataType::Float, "a_outline_size"),
            BufferElement::new(ShaderDataType::Float4, "a_fill_color"),
            BufferElement::new(ShaderDataType::Float4, "a_outline_color"),
        ])
    }
}

#[derive(Debug)]
pub struct CircleRenderer {
    core: BatchCore<CircleVertex>,
}

impl CircleRenderer {
    pub fn new(device: &mut dyn GraphicsDevice, shader: ShaderId) -> Self {
        Self::with_capacity(device, shader, MAX_CIRCLES)
    }

    pub fn with_capacity(device: &mut dyn GraphicsDevice, shader: ShaderId, circles: usize) -> Self {
        let circles = circles.max(1);
        Self {
            core: BatchCore::new(
                device,
                "nova circle batch",
                shader,
                Topology::Triangles,
                circles * QUAD_VERTEX_COUNT,
                &quad_indices(circles),
            ),
        }
    }

    /// Filled circle with an outline ring of `outline` pixels drawn outside `radius`.
    pub fn render_circle(
        &mut self,
        device: &mut dyn GraphicsDevice,
        center: Vec2,
        radius: f32,
        fill: Color,
        outline_color: Color,
        outline: f32,
    ) {
        if !self.core.accepting() {
            return;
        }
        if !self.core.fits(QUAD_VERTEX_COUNT, QUAD_INDEX_COUNT) {
            self.flush_and_reset(device);
        }

        let size = Vec2::splat((radius + outline) * 2.0);
        let origin = center - size * 0.5;
        let (fill, outline_color) = (fill.to_array(), outline_color.to_array());
        let vertices: [CircleVertex; QUAD_VERTEX_COUNT] = std::array::from_fn(|i| CircleVertex {
            position: (origin + QUAD_CORNERS[i] * size).to_array(),
            center: center.to_array(),
            radius,
            outline,
            fill,
            outline_color,
        });
        self.core.push(&vertices, QUAD_INDEX_COUNT);
    }
}

impl SceneRenderer for CircleRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Circle
    }

    fn begin_scene(&mut self, device: &mut dyn GraphicsDevice, view: &SceneView) {
        self.core.begin(device, view);
    }

    fn end_scene(&mut self, device: &mut dyn GraphicsDevice) {
        if self.core.scene.is_none() {
            return;
        }
        self.core.upload(device);
        self.flush(device);
        self.core.reset();
        self.core.scene = None;
    }

    fn flush(&mut self, device: &mut dyn GraphicsDevice) {
        self.core.draw(device);
    }

    fn flush_and_reset(&mut self, device: &mut dyn GraphicsDevice) {
        self.core.upload(device);
        self.flush(device);
        self.core.reset();
    }

    fn stats(&self) -> DrawStats {
        self.core.stats()
    }

    fn new_frame(&mut self) {
        self.core.new_frame();
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        self.core.release(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::render::headless::HeadlessDevice;
    use crate::render::shader::BuiltinShaders;
    use glam::Mat4;

    fn view() -> SceneView {
        SceneView {
            view_projection: Mat4::IDENTITY,
            viewport: Viewport::from_size(10.0, 10.0),
        }
    }

    #[test]
    fn quad_covers_radius_plus_outline() {
        let mut device = HeadlessDevice::new();
        let shaders = BuiltinShaders::compile(&mut device).unwrap();
        let mut r = CircleRenderer::with_capacity(&mut device, shaders.circle, 4);

        r.begin_scene(&mut device, &view());
        r.render_circle(&mut device, Vec2::new(10.0, 10.0), 4.0, Color::RED, Color::WHITE, 1.0);
        r.end_scene(&mut device);

        let v = device.draws()[0].vertices::<CircleVertex>();
        assert_eq!(v[0].position, [5.0, 5.0]);
        assert_eq!(v[2].position, [15.0, 15.0]);
        assert!(v.iter().all(|v| v.center == [10.0, 10.0] && v.radius == 4.0 && v.outline == 1.0));
        assert_eq!(device.draws()[0].index_count, 6);
    }

    #[test]
    fn circles_share_quad_overflow_rules() {
        let mut device = HeadlessDevice::new();
        let shaders = BuiltinShaders::compile(&mut device).unwrap();
        let mut r = CircleRenderer::with_capacity(&mut device, shaders.circle, 2);

        r.begin_scene(&mut device, &view());
        for _ in 0..5 {
            r.render_circle(&mut device, Vec2::ZERO, 1.0, Color::WHITE, Color::CLEAR, 0.0);
        }
        r.end_scene(&mut device);

        let counts: Vec<u32> = device.draws().iter().map(|d| d.index_count).collect();
        assert_eq!(counts, vec![12, 12, 6]);
    }

    #[test]
    fn zero_capacity_holds_one_circle() {
        let mut device = HeadlessDevice::new();
        let shaders = BuiltinShaders::compile(&mut device).unwrap();
        let mut r = CircleRenderer::with_capacity(&mut device, shaders.circle, 0);

        r.begin_scene(&mut device, &view());
        r.render_circle(&mut device, Vec2::ZERO, 1.0, Color::WHITE, Color::CLEAR, 0.0);
        r.end_scene(&mut device);

        assert_eq!(device.draws().len(), 1);
        assert_eq!(device.draws()[0].index_count, 6);
    }
}
