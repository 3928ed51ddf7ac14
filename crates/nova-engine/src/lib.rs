//! Nova: a small 2D engine built around a batching renderer.
//!
//! Game code describes a frame with immediate-mode calls on a
//! [`Batch`](render::Batch); the batch groups primitives into few draw calls
//! per renderer kind and texture set.

pub mod audio;
pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod math;
pub mod paint;
pub mod render;
pub mod resources;
pub mod scene;
pub mod text;
pub mod time;
pub mod window;

pub use config::EngineConfig;
pub use core::{AppControl, Game, StartCtx, UpdateCtx};
pub use window::Runtime;
