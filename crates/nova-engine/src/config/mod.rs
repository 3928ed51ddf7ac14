//! Engine configuration, read from a TOML file.

mod engine;

pub use engine::{
    AudioConfig, ConfigError, DebugConfig, EngineConfig, RendererConfig, ResourcesConfig,
    WindowConfig,
};
