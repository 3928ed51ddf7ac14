//! State and helpers shared by the four batch renderers.

use glam::{Mat4, Vec2};

use crate::coords::Viewport;
use crate::render::arena::VertexArena;
use crate::render::device::{GraphicsDevice, SceneUniforms, ShaderId, Topology};
use crate::render::layout::{Vertex, VertexArray};

/// The primitive family a renderer batches.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RendererKind {
    Sprite,
    Line,
    Point,
    Circle,
}

/// Draw-call counters for one renderer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DrawStats {
    pub total: u64,
    pub frame: u32,
    pub last_frame: u32,
}

impl DrawStats {
    #[inline]
    fn record(&mut self) {
        self.total += 1;
        self.frame += 1;
    }

    #[inline]
    pub(crate) fn new_frame(&mut self) {
        self.last_frame = self.frame;
        self.frame = 0;
    }
}

impl std::ops::Add for DrawStats {
    type Output = DrawStats;

    fn add(self, rhs: DrawStats) -> DrawStats {
        DrawStats {
            total: self.total + rhs.total,
            frame: self.frame + rhs.frame,
            last_frame: self.last_frame + rhs.last_frame,
        }
    }
}

/// Camera data captured when a scene opens.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneView {
    pub view_projection: Mat4,
    pub viewport: Viewport,
}

impl SceneView {
    pub fn uniforms(&self) -> SceneUniforms {
        let vp = self.viewport;
        SceneUniforms {
            view_projection: self.view_projection.to_cols_array_2d(),
            viewport: [vp.x, vp.y, vp.width, vp.height],
        }
    }
}

/// Operations every batch renderer exposes, used by the dispatcher.
pub trait SceneRenderer {
    fn kind(&self) -> RendererKind;

    /// Binds the program, uploads the view, rewinds the arena.
    fn begin_scene(&mut self, device: &mut dyn GraphicsDevice, view: &SceneView);

    /// Uploads pending vertices, flushes, and closes the scene.
    fn end_scene(&mut self, device: &mut dyn GraphicsDevice);

    /// Issues one draw for everything accumulated since the last flush.
    fn flush(&mut self, device: &mut dyn GraphicsDevice);

    /// Uploads and flushes, then reopens an empty arena in the same scene.
    fn flush_and_reset(&mut self, device: &mut dyn GraphicsDevice);

    fn stats(&self) -> DrawStats;

    /// Rolls the per-frame counter into `last_frame`.
    fn new_frame(&mut self);

    /// Frees the renderer's GPU objects.
    fn release(&mut self, device: &mut dyn GraphicsDevice);
}

/// Arena, counters and GPU handles every renderer carries.
#[derive(Debug)]
pub(crate) struct BatchCore<V: Vertex> {
    label: &'static str,
    shader: ShaderId,
    topology: Topology,
    vertex_array: VertexArray,
    pub(crate) arena: VertexArena<V>,
    index_count: u32,
    pub(crate) scene: Option<SceneView>,
    stats: DrawStats,
    warned_idle: bool,
}

impl<V: Vertex> BatchCore<V> {
    /// Allocates the vertex buffer for `vertex_capacity` records and uploads
    /// the static `indices` once.
    pub(crate) fn new(
        device: &mut dyn GraphicsDevice,
        label: &'static str,
        shader: ShaderId,
        topology: Topology,
        vertex_capacity: usize,
        indices: &[u32],
    ) -> Self {
        let layout = V::layout();
        debug_assert_eq!(layout.stride() as usize, std::mem::size_of::<V>());

        let size = (vertex_capacity * std::mem::size_of::<V>()) as u64;
        let vertex_buffer = device.create_vertex_buffer(label, size);
        let index_buffer = device.create_index_buffer(label, indices);
        let id = device.create_vertex_array(vertex_buffer, &layout, index_buffer);

        Self {
            label,
            shader,
            topology,
            vertex_array: VertexArray {
                id,
                vertex_buffer,
                index_buffer,
                layout,
                index_capacity: indices.len() as u32,
            },
            arena: VertexArena::with_capacity(vertex_capacity),
            index_count: 0,
            scene: None,
            stats: DrawStats::default(),
            warned_idle: false,
        }
    }

    #[inline]
    pub(crate) fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Whether `vertices`/`indices` more still fit in the current window.
    #[inline]
    pub(crate) fn fits(&self, vertices: usize, indices: u32) -> bool {
        vertices <= self.arena.remaining()
            && self.index_count + indices <= self.vertex_array.index_capacity
    }

    /// `true` when a scene is open. Logs once per renderer otherwise.
    pub(crate) fn accepting(&mut self) -> bool {
        if self.scene.is_some() {
            return true;
        }
        if !self.warned_idle {
            log::warn!("{}: draw submitted outside begin_scene/end_scene; ignored", self.label);
            self.warned_idle = true;
        }
        false
    }

    /// Appends one primitive's vertices and advances the index count.
    pub(crate) fn push(&mut self, vertices: &[V], indices: u32) {
        for v in vertices {
            let written = self.arena.push(*v);
            debug_assert!(written, "{}: arena overflow past fits() check", self.label);
        }
        self.index_count += indices;
    }

    pub(crate) fn begin(&mut self, device: &mut dyn GraphicsDevice, view: &SceneView) {
        device.bind_shader(self.shader);
        device.set_scene_uniforms(&view.uniforms());
        self.scene = Some(*view);
        self.reset();
    }

    /// Uploads exactly the bytes written since the arena was last rewound.
    pub(crate) fn upload(&mut self, device: &mut dyn GraphicsDevice) {
        if !self.arena.is_empty() {
            device.upload(self.vertex_array.vertex_buffer, self.arena.as_bytes());
        }
    }

    pub(crate) fn draw(&mut self, device: &mut dyn GraphicsDevice) {
        if self.index_count == 0 {
            return;
        }
        device.draw_indexed(self.vertex_array.id, self.topology, self.index_count);
        self.stats.record();
    }

    pub(crate) fn reset(&mut self) {
        self.arena.reset();
        self.index_count = 0;
    }

    pub(crate) fn stats(&self) -> DrawStats {
        self.stats
    }

    pub(crate) fn new_frame(&mut self) {
        self.stats.new_frame();
    }

    pub(crate) fn release(&mut self, device: &mut dyn GraphicsDevice) {
        device.delete_vertex_array(self.vertex_array.id);
        device.delete_buffer(self.vertex_array.vertex_buffer);
        device.delete_buffer(self.vertex_array.index_buffer);
        self.scene = None;
        self.reset();
    }
}

/// Unit-square corners in the order every quad is emitted (counter-clockwise).
pub(crate) const QUAD_CORNERS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

pub(crate) const QUAD_VERTEX_COUNT: usize = 4;
pub(crate) const QUAD_INDEX_COUNT: u32 = 6;

/// Two triangles per quad, `(0,1,2)(2,3,0)`, offset by 4 per quad.
pub(crate) fn quad_indices(quads: usize) -> Vec<u32> {
    (0..quads as u32)
        .flat_map(|q| {
            let b = q * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .collect()
}

/// `0, 1, 2, ...` for primitives that consume vertices in order.
pub(crate) fn identity_indices(count: usize) -> Vec<u32> {
    (0..count as u32).collect()
}
