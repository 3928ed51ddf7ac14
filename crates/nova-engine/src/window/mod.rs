//! Window and event loop.
//!
//! Owns the winit event loop and window and drives a [`Game`](crate::core::Game)
//! through the batch renderer on the window's device.

mod runtime;

pub use runtime::Runtime;
