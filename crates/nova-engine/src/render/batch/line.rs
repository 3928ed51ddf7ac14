//! Wide line strips with adjacency vertices for screen-space joins.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::paint::Color;
use crate::render::device::{GraphicsDevice, ShaderId, Topology};
use crate::render::layout::{BufferElement, BufferLayout, ShaderDataType, Vertex};

use super::common::{identity_indices, BatchCore, DrawStats, RendererKind, SceneRenderer, SceneView};

pub const MAX_LINE_VERTICES: usize = 40_000;

/// How far past the viewport adjacency vertices are pushed, in viewport sizes.
const ADJACENCY_REACH: f32 = 10.0;

/// Smallest arena that still holds one segment plus its adjacency.
const MIN_LINE_VERTICES: usize = 4;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub width: f32,
    /// 1.0 for the extrapolated first/last vertex of a strip.
    pub adjacency: f32,
}

impl Vertex for LineVertex {
    fn layout() -> BufferLayout {
        BufferLayout::new([
            BufferElement::new(ShaderDataType::Float2, "a_position"),
            BufferElement::new(ShaderDataType::Float4, "a_color"),
            BufferElement::new(ShaderDataType::Float, "a_width"),
            BufferElement::new(ShaderDataType::Float, "a_adjacency"),
        ])
    }
}

#[derive(Debug)]
pub struct LineRenderer {
    core: BatchCore<LineVertex>,
    scratch: Vec<LineVertex>,
}

impl LineRenderer {
    pub fn new(device: &mut dyn GraphicsDevice, shader: ShaderId) -> Self {
        Self::with_capacity(device, shader, MAX_LINE_VERTICES)
    }

    pub fn with_capacity(device: &mut dyn GraphicsDevice, shader: ShaderId, vertices: usize) -> Self {
        let vertices = vertices.max(MIN_LINE_VERTICES);
        Self {
            core: BatchCore::new(
                device,
                "nova line batch",
                shader,
                Topology::LineStripAdjacency,
                vertices,
                &identity_indices(vertices),
            ),
            scratch: Vec::new(),
        }
    }

    pub fn render_line(&mut self, device: &mut dyn GraphicsDevice, start: Vec2, end: Vec2, color: Color, width: f32) {
        self.render_line_strip(device, &[start, end], color, width, Vec2::ZERO, 0.0);
    }

    /// Draws `points` rotated by `radians` about the origin, then moved to `position`.
    ///
    /// Strips with fewer than two points draw nothing. A strip longer than the
    /// arena is drawn in pieces that share their boundary point.
    pub fn render_line_strip(
        &mut self,
        device: &mut dyn GraphicsDevice,
        points: &[Vec2],
        color: Color,
        width: f32,
        position: Vec2,
        radians: f32,
    ) {
        if points.len() < 2 || !self.core.accepting() {
            return;
        }

        let rotation = Vec2::from_angle(radians);
        let placed: Vec<Vec2> = points.iter().map(|p| position + rotation.rotate(*p)).collect();

        let max_points = self.core.arena.capacity() - 2;
        let mut start = 0;
        loop {
            let end = (start + max_points).min(placed.len());
            self.push_strip(device, &placed[start..end], color, width);
            if end == placed.len() {
                break;
            }
            start = end - 1;
        }
    }

    fn push_strip(&mut self, device: &mut dyn GraphicsDevice, points: &[Vec2], color: Color, width: f32) {
        let count = points.len() + 2;
        if !self.core.fits(count, count as u32) {
            self.flush_and_reset(device);
        }

        let reach = self
            .core
            .scene
            .map_or(Vec2::ZERO, |view| view.viewport.size() * ADJACENCY_REACH);
        let n = points.len();
        let lead = extrapolate(points[0], points[1], reach);
        let trail = extrapolate(points[n - 1], points[n - 2], reach);

        let color = color.to_array();
        let vertex = |p: Vec2, adjacency: f32| LineVertex {
            position: p.to_array(),
            color,
            width,
            adjacency,
        };

        self.scratch.clear();
        self.scratch.push(vertex(lead, 1.0));
        self.scratch.extend(points.iter().map(|&p| vertex(p, 0.0)));
        self.scratch.push(vertex(trail, 1.0));

        self.core.push(&self.scratch, count as u32);
    }
}

/// Point far beyond `from`, continuing the direction `toward -> from`.
fn extrapolate(from: Vec2, toward: Vec2, reach: Vec2) -> Vec2 {
    from + (from - toward).normalize_or_zero() * reach
}

impl SceneRenderer for LineRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Line
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
            viewport: Viewport::from_size(100.0, 50.0),
        }
    }

    fn renderer(device: &mut HeadlessDevice, vertices: usize) -> LineRenderer {
        let shaders = BuiltinShaders::compile(device).unwrap();
        LineRenderer::with_capacity(device, shaders.line, vertices)
    }

    fn positions(device: &HeadlessDevice, draw: usize) -> Vec<Vec2> {
        device.draws()[draw]
            .vertices::<LineVertex>()
            .iter()
            .map(|v| Vec2::from_array(v.position))
            .collect()
    }

    // ── strips ────────────────────────────────────────────────────────────

    #[test]
    fn strip_appends_k_plus_two() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 64);
        let points = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];

        r.begin_scene(&mut device, &view());
        r.render_line_strip(&mut device, &points, Color::WHITE, 2.0, Vec2::ZERO, 0.0);
        r.end_scene(&mut device);

        let draw = &device.draws()[0];
        assert_eq!(draw.topology, Topology::LineStripAdjacency);
        assert_eq!(draw.index_count, 5);
        let verts = draw.vertices::<LineVertex>();
        assert_eq!(verts.len(), 5);
        let flags: Vec<f32> = verts.iter().map(|v| v.adjacency).collect();
        assert_eq!(flags, vec![1.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(verts.iter().all(|v| v.width == 2.0));
    }

    #[test]
    fn adjacency_extends_away_from_neighbours() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 64);
        let points = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];

        r.begin_scene(&mut device, &view());
        r.render_line_strip(&mut device, &points, Color::WHITE, 1.0, Vec2::ZERO, 0.0);
        r.end_scene(&mut device);

        let p = positions(&device, 0);
        // Reach is ten viewports: 1000 along x, 500 along y.
        assert_eq!(p[0], Vec2::new(-1000.0, 0.0));
        assert_eq!(p[4], Vec2::new(10.0, 510.0));
    }

    #[test]
    fn strip_is_rotated_then_translated() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 64);
        let points = [Vec2::ZERO, Vec2::new(10.0, 0.0)];

        r.begin_scene(&mut device, &view());
        r.render_line_strip(
            &mut device,
            &points,
            Color::WHITE,
            1.0,
            Vec2::new(5.0, 5.0),
            std::f32::consts::FRAC_PI_2,
        );
        r.end_scene(&mut device);

        let p = positions(&device, 0);
        assert_eq!(p[1], Vec2::new(5.0, 5.0));
        assert!((p[2] - Vec2::new(5.0, 15.0)).length() < 1e-4);
    }

    #[test]
    fn single_point_strip_is_ignored() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 64);
        r.begin_scene(&mut device, &view());
        r.render_line_strip(&mut device, &[Vec2::ONE], Color::WHITE, 1.0, Vec2::ZERO, 0.0);
        r.end_scene(&mut device);
        assert!(device.draws().is_empty());
    }

    // ── overflow ──────────────────────────────────────────────────────────

    #[test]
    fn strip_that_does_not_fit_flushes_first() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 8);
        r.begin_scene(&mut device, &view());
        r.render_line(&mut device, Vec2::ZERO, Vec2::X, Color::WHITE, 1.0);
        r.render_line(&mut device, Vec2::ZERO, Vec2::Y, Color::WHITE, 1.0);
        r.render_line(&mut device, Vec2::ZERO, Vec2::ONE, Color::WHITE, 1.0);
        r.end_scene(&mut device);

        let counts: Vec<u32> = device.draws().iter().map(|d| d.index_count).collect();
        assert_eq!(counts, vec![8, 4]);
    }

    #[test]
    fn oversized_strip_is_split_sharing_endpoints() {
        let mut device = HeadlessDevice::new();
        let mut r = renderer(&mut device, 6);
        let points: Vec<Vec2> = (0..7).map(|i| Vec2::new(i as f32, 0.0)).collect();

        r.begin_scene(&mut device, &view());
        r.render_line_strip(&mut device, &points, Color::WHITE, 1.0, Vec2::ZERO, 0.0);
        r.end_scene(&mut device);

        // Four real points per chunk: 0..=3, 3..=6.
        assert_eq!(device.draws().len(), 2);
        let first = positions(&device, 0);
        let second = positions(&device, 1);
        assert_eq!(first[4], Vec2::new(3.0, 0.0));
        assert_eq!(second[1], Vec2::new(3.0, 0.0));
        assert_eq!(second[4], Vec2::new(6.0, 0.0));
    }
}
