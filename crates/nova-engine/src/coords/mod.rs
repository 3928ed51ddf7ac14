//! Coordinate and geometry types shared by the renderers and game code.
//!
//! World space:
//! - pixels, origin bottom-left of the camera viewport
//! - +X right, +Y up
//!
//! Image space (atlas frames) keeps the usual top-left origin with +Y down.

mod rect;
mod viewport;

pub use glam::{Affine2, Mat4, Vec2, Vec4};
pub use rect::Rect;
pub use viewport::Viewport;
