//! wgpu bring-up for a single window.
//!
//! [`Gpu`] owns the device, queue and window surface; the wgpu
//! [`GraphicsDevice`](crate::render::GraphicsDevice) backend records draws
//! against it and replays them into one [`Frame`] per present.

mod gpu;
mod init;
mod surface;

pub use gpu::{Frame, Gpu};
pub use init::{GpuInit, BATCH_TEXTURE_SLOTS};
pub use surface::SurfaceErrorAction;
