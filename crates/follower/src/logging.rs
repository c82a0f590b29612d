//! Logging setup

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Parsed level, falling back to INFO
    pub fn max_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.max_level())
        .with_target(true);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.expect("Failed to set tracing subscriber");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        let mut config = LoggingConfig::default();
        assert_eq!(config.max_level(), Level::INFO);
        config.level = "debug".to_string();
        assert_eq!(config.max_level(), Level::DEBUG);
        config.level = "loud".to_string();
        assert_eq!(config.max_level(), Level::INFO);
    }
}
