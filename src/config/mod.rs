use serde::Deserialize;

// Re-export the messaging config so callers can build one directly
#[cfg(feature = "nats")]
pub use crate::nats::NatsConfig;

/// Complete satchel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SatchelConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[cfg(feature = "nats")]
    #[serde(default)]
    pub nats: NatsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter, used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "satchel=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Default for SatchelConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            #[cfg(feature = "nats")]
            nats: NatsConfig::default(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<SatchelConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: SatchelConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SatchelConfig::default();
        assert_eq!(config.logging.filter, "satchel=info");
        #[cfg(feature = "nats")]
        assert_eq!(config.nats.request_timeout_ms, 1000);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [logging]
            filter = "satchel=debug"

            [nats]
            url = "nats://example.com:4222"
            request_timeout_ms = 250
        "#;

        let config: SatchelConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "satchel=debug");
        #[cfg(feature = "nats")]
        {
            assert_eq!(config.nats.url, "nats://example.com:4222");
            assert_eq!(config.nats.request_timeout_ms, 250);
        }
    }

    #[test]
    fn test_partial_config() {
        // Missing sections fall back to defaults
        let toml = r#"
            [logging]
            filter = "satchel=trace"
        "#;

        let config: SatchelConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "satchel=trace");
        #[cfg(feature = "nats")]
        assert_eq!(config.nats.request_timeout_ms, 1000);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satchel.toml");
        std::fs::write(&path, "[logging]\nfilter = \"satchel=debug\"\n").unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.logging.filter, "satchel=debug");
    }

    #[test]
    fn test_load_config_missing_file_fails() {
        assert!(load_config("/nonexistent/satchel.toml").is_err());
    }
}
