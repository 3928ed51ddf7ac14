use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LoggingConfig;
use crate::paint::{Color, ColorParseError};
use crate::render::RendererSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("renderer.clear_color: {0}")]
    ClearColor(#[from] ColorParseError),

    #[error("window size {width}x{height} must be non-zero")]
    WindowSize { width: u32, height: u32 },

    #[error("audio.volume {0} is outside 0..=1")]
    Volume(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Nova".to_string(),
            width: 1024,
            height: 768,
            fullscreen: false,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// `RRGGBB` or `RRGGBBAA`, straight alpha.
    pub clear_color: String,
    /// Unset follows the build: on in debug builds.
    pub sprite_outline: Option<bool>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: "000000ff".to_string(),
            sprite_outline: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub draw_fps: bool,
    pub draw_total_draw_calls: bool,
    pub draw_frame_draw_calls: bool,
    /// Font key the overlay text is drawn with.
    pub overlay_font: String,
    /// `env_logger` filter; empty defers to `RUST_LOG`.
    pub log_filter: Option<String>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            draw_fps: false,
            draw_total_draw_calls: false,
            draw_frame_draw_calls: false,
            overlay_font: "debug".to_string(),
            log_filter: None,
        }
    }
}

impl DebugConfig {
    pub fn overlay_enabled(&self) -> bool {
        self.draw_fps || self.draw_total_draw_calls || self.draw_frame_draw_calls
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Directory holding `images/` and `fonts/`.
    pub root: PathBuf,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Off opens no output device; voices still run silently.
    pub enabled: bool,
    /// Master volume, `0.0..=1.0`.
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub renderer: RendererConfig,
    pub debug: DebugConfig,
    pub resources: ResourcesConfig,
    pub audio: AudioConfig,
}

impl EngineConfig {
    /// Reads `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::from_toml_str(&text)?;
                log::info!("loaded config {}", path.display());
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}; using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> String {
        // Plain structs of strings, numbers and booleans always serialize.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Color::from_hex(&self.renderer.clear_color)?;
        let WindowConfig { width, height, .. } = self.window;
        if width == 0 || height == 0 {
            return Err(ConfigError::WindowSize { width, height });
        }
        let volume = self.audio.volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::Volume(volume));
        }
        Ok(())
    }

    /// Parsed clear color, black if the string is invalid.
    pub fn clear_color(&self) -> Color {
        Color::from_hex(&self.renderer.clear_color).unwrap_or(Color::BLACK)
    }

    pub fn renderer_settings(&self) -> RendererSettings {
        let mut settings = RendererSettings::default();
        if let Some(outline) = self.renderer.sprite_outline {
            settings.sprite_outline = outline;
        }
        settings
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::with_filter(self.debug.log_filter.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parsing ───────────────────────────────────────────────────────────

    #[test]
    fn empty_file_is_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.window.title, "Nova");
        assert_eq!((config.window.width, config.window.height), (1024, 768));
        assert!(config.window.vsync);
        assert_eq!(config.clear_color(), Color::BLACK);
    }

    #[test]
    fn sections_override_fields() {
        let config = EngineConfig::from_toml_str(
            r##"
            [window]
            title = "Asteroids"
            width = 1280

            [renderer]
            clear_color = "#ff0000"
            sprite_outline = false

            [debug]
            draw_fps = true
            log_filter = "nova_engine=debug"

            [resources]
            root = "content"
            "##,
        )
        .unwrap();

        assert_eq!(config.window.title, "Asteroids");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 768);
        assert_eq!(config.clear_color(), Color::RED);
        assert!(!config.renderer_settings().sprite_outline);
        assert!(config.debug.draw_fps && !config.debug.draw_frame_draw_calls);
        assert_eq!(config.logging().env_filter.as_deref(), Some("nova_engine=debug"));
        assert_eq!(config.resources.root, PathBuf::from("content"));
    }

    #[test]
    fn outline_defaults_to_build_profile() {
        let config = EngineConfig::default();
        assert_eq!(config.renderer_settings().sprite_outline, cfg!(debug_assertions));
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("[window\nwidth = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = EngineConfig::from_toml_str("[window]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_clear_color_is_rejected() {
        let err = EngineConfig::from_toml_str("[renderer]\nclear_color = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::ClearColor(_)));
    }

    #[test]
    fn zero_window_size_is_rejected() {
        let err = EngineConfig::from_toml_str("[window]\nheight = 0").unwrap_err();
        assert!(matches!(err, ConfigError::WindowSize { width: 1024, height: 0 }));
    }

    #[test]
    fn audio_volume_must_be_unit_range() {
        let err = EngineConfig::from_toml_str("[audio]\nvolume = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Volume(v) if v == 1.5));

        let config = EngineConfig::from_toml_str("[audio]\nenabled = false\nvolume = 0.25").unwrap();
        assert!(!config.audio.enabled);
        assert_eq!(config.audio.volume, 0.25);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = EngineConfig::load("definitely/not/here/nova.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn written_config_reads_back() {
        let mut config = EngineConfig::default();
        config.window.fullscreen = true;
        config.debug.log_filter = Some("warn".into());
        let text = config.to_toml_string();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
