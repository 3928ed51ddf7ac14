use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax, e.g.
/// `"info,nova_engine=debug,wgpu_core=warn"`. When unset, `RUST_LOG` is
/// consulted, then `Info` applies.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    /// Configuration with an explicit filter; an empty string counts as unset.
    pub fn with_filter(filter: Option<&str>) -> Self {
        Self {
            env_filter: filter.filter(|f| !f.trim().is_empty()).map(str::to_string),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            // wgpu is chatty at info.
            builder
                .filter_level(log::LevelFilter::Info)
                .filter_module("wgpu_core", log::LevelFilter::Warn)
                .filter_module("wgpu_hal", log::LevelFilter::Warn);
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filter_counts_as_unset() {
        assert_eq!(LoggingConfig::with_filter(Some("  ")).env_filter, None);
        assert_eq!(LoggingConfig::with_filter(None).env_filter, None);
        assert_eq!(
            LoggingConfig::with_filter(Some("debug")).env_filter.as_deref(),
            Some("debug")
        );
    }
}
