//! The narrow GPU contract the batching renderers are written against.
//!
//! Handles are opaque ids minted by the device. The renderers never see a
//! concrete graphics API; `WgpuDevice` and `HeadlessDevice` implement this.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use super::layout::BufferLayout;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// GPU buffer (vertex or index).
    BufferId
);
handle!(
    /// Vertex buffer + layout + index buffer binding.
    VertexArrayId
);
handle!(
    /// Sampled 2D texture.
    TextureId
);
handle!(
    /// Compiled shader program (pipeline).
    ShaderId
);

/// Primitive assembly mode for a draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Triangles,
    /// Line strip where the first and last vertex only provide direction.
    LineStripAdjacency,
    Points,
}

/// Everything a device needs to build a shader program.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub key: &'static str,
    pub source: &'static str,
    pub layout: BufferLayout,
    pub topology: Topology,
    /// Number of texture slots the fragment stage samples from (0 for none).
    pub texture_slots: u32,
}

/// Per-scene uniform block, identical for every program.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_projection: [[f32; 4]; 4],
    /// `x, y, width, height` of the camera viewport in pixels.
    pub viewport: [f32; 4],
}

/// Tightly packed RGBA8 pixels, premultiplied, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// A single opaque white texel.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![0xff; 4],
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("shader {key:?} has no `{entry}` entry point")]
    MissingEntryPoint { key: String, entry: &'static str },

    #[error("shader {key:?} declares {requested} texture slots, device supports {supported}")]
    TooManyTextureSlots { key: String, requested: u32, supported: u32 },

    #[error("texture {label:?} has inconsistent dimensions {width}x{height} for {len} bytes")]
    InvalidImage { label: String, width: u32, height: u32, len: usize },
}

/// GPU object management plus the handful of commands a batch flush needs.
///
/// Calls are issued in frame order; devices may execute them immediately
/// or record and replay them later, but must preserve the data each draw
/// saw at the time it was issued.
pub trait GraphicsDevice {
    fn create_shader(&mut self, program: &ShaderProgram) -> Result<ShaderId, DeviceError>;
    fn delete_shader(&mut self, shader: ShaderId);

    fn create_vertex_buffer(&mut self, label: &str, size: u64) -> BufferId;
    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> BufferId;
    fn delete_buffer(&mut self, buffer: BufferId);

    fn create_vertex_array(
        &mut self,
        vertex_buffer: BufferId,
        layout: &BufferLayout,
        index_buffer: BufferId,
    ) -> VertexArrayId;
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);

    fn create_texture(&mut self, label: &str, image: &ImageData) -> Result<TextureId, DeviceError>;
    fn delete_texture(&mut self, texture: TextureId);

    /// Replaces the contents of `buffer` starting at offset zero.
    fn upload(&mut self, buffer: BufferId, bytes: &[u8]);

    fn bind_shader(&mut self, shader: ShaderId);
    /// Sets the uniforms of the currently bound shader.
    fn set_scene_uniforms(&mut self, uniforms: &SceneUniforms);
    /// Binds `texture` to `slot` for the next draw only; issuing a draw clears every slot.
    fn bind_texture(&mut self, slot: u32, texture: TextureId);

    fn draw_indexed(&mut self, vertex_array: VertexArrayId, topology: Topology, index_count: u32);

    /// Texture units usable by one draw.
    fn max_texture_slots(&self) -> u32;
}

/// Entry points every program source must define.
pub(crate) const REQUIRED_ENTRY_POINTS: [&str; 2] = ["vs_main", "fs_main"];

/// Shared program validation for device implementations.
pub(crate) fn validate_program(program: &ShaderProgram, max_slots: u32) -> Result<(), DeviceError> {
    for entry in REQUIRED_ENTRY_POINTS {
        if !program.source.contains(&format!("fn {entry}")) {
            return Err(DeviceError::MissingEntryPoint {
                key: program.key.to_string(),
                entry,
            });
        }
    }
    if program.texture_slots > max_slots {
        return Err(DeviceError::TooManyTextureSlots {
            key: program.key.to_string(),
            requested: program.texture_slots,
            supported: max_slots,
        });
    }
    Ok(())
}

pub(crate) fn validate_image(label: &str, image: &ImageData) -> Result<(), DeviceError> {
    if image.is_consistent() {
        Ok(())
    } else {
        Err(DeviceError::InvalidImage {
            label: label.to_string(),
            width: image.width,
            height: image.height,
            len: image.pixels.len(),
        })
    }
}
