use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::paint::Color;
use crate::render::device::{GraphicsDevice, ShaderId, Topology};
use crate::render::layout::{BufferElement, BufferLayout, ShaderDataType, Vertex};

use super::common::{identity_indices, BatchCore, DrawStats, RendererKind, SceneRenderer, SceneView};

pub const MAX_POINTS: usize = 10_000;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex for PointVertex {
    fn layout() -> BufferLayout {
        BufferLayout::new([
            BufferElement::new(ShaderDataType::Float2, "a_position"),
            BufferElement::new(ShaderDataType::Float4, "a_color"),
        ])
    }
}

/// One-pixel points, one vertex each.
#[derive(Debug)]
pub struct PointRenderer {
    core: BatchCore<PointVertex>,
}

impl PointRenderer {
    pub fn new(device: &mut dyn GraphicsDevice, shader: ShaderId) -> Self {
        Self::with_capacity(device, shader, MAX_POINTS)
    }

    pub fn with_capacity(device: &mut dyn GraphicsDevice, shader: ShaderId, points: usize) -> Self {
        let points = points.max(1);
        Self {
            core: BatchCore::new(
                device,
                "nova point batch",
                shader,
                Topology::Points,
                points,
                &identity_indices(points),
            ),
        }
    }

    pub fn render_point(&mut self, device: &mut dyn GraphicsDevice, position: Vec2, color: Color) {
        if !self.core.accepting() {
            return;
        }
        if !self.core.fits(1, 1) {
            self.flush_and_reset(device);
        }
        self.core.push(
            &[PointVertex {
                position: position.to_array(),
                color: color.to_array(),
            }],
            1,
        );
    }
}

impl SceneRenderer for PointRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Point
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

    #[test]
    fn points_flush_on_count() {
        let mut device = HeadlessDevice::new();
        let shaders = BuiltinShaders::compile(&mut device).unwrap();
        let mut r = PointRenderer::with_capacity(&mut device, shaders.point, 3);
        let view = SceneView {
            view_projection: Mat4::IDENTITY,
            viewport: Viewport::from_size(10.0, 10.0),
        };

        r.begin_scene(&mut device, &view);
        for i in 0..7 {
            r.render_point(&mut device, Vec2::splat(i as f32), Color::RED);
        }
        r.end_scene(&mut device);

        let draws = device.draws();
        let counts: Vec<u32> = draws.iter().map(|d| d.index_count).collect();
        assert_eq!(counts, vec![3, 3, 1]);
        assert!(draws.iter().all(|d| d.topology == Topology::Points));
        assert_eq!(draws[2].vertices::<PointVertex>()[0].position, [6.0, 6.0]);
        assert_eq!(r.stats().total, 3);
    }
}
