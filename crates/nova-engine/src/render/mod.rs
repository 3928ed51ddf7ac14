//! Batched 2D rendering.
//!
//! Game code draws through a [`Batch`] bound to a [`GraphicsDevice`] once per
//! frame. The batch collects geometry into CPU vertex arenas and only talks
//! to the device when an arena fills, a texture slot runs out, the active
//! primitive kind changes, or the scene ends.
//!
//! Convention:
//! - world geometry is in pixels, origin bottom-left, +Y up
//! - colors are premultiplied

mod arena;
pub mod batch;
mod camera;
pub mod device;
pub mod headless;
pub mod layout;
pub mod shader;
mod texture;
mod wgpu_device;

pub use arena::VertexArena;
pub use batch::{
    Batch, BatchCapacities, BatchRenderer, DrawStats, Outline, RendererKind, RendererSettings,
    SceneRenderer, SceneView, TexturedQuad,
};
pub use camera::Camera;
pub use device::{
    BufferId, DeviceError, GraphicsDevice, ImageData, SceneUniforms, ShaderId, ShaderProgram,
    TextureId, Topology, VertexArrayId,
};
pub use headless::{DrawRecord, HeadlessDevice};
pub use layout::{BufferElement, BufferLayout, ShaderDataType, Vertex, VertexArray};
pub use shader::{BuiltinShaders, Shader};
pub use texture::Texture;
pub use wgpu_device::WgpuDevice;
