//! Keyed, shared game resources: textures, fonts and shaders.

mod cache;
mod manager;

pub use cache::{CacheEvent, ResourceCache};
pub use manager::{ResourceError, ResourceManager};
