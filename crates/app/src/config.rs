//! Runtime configuration: defaults, an optional JSON config file, and
//! CLI overrides layered on top (in that order).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Settings for the relay pipeline and the synthetic source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    /// Capture tick interval in milliseconds.
    pub interval_ms: u64,
    /// Synthetic source frame width.
    pub width: u32,
    /// Synthetic source frame height.
    pub height: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            interval_ms: relay::DEFAULT_TICK_INTERVAL.as_millis() as u64,
            width: 640,
            height: 480,
        }
    }
}

impl RelayConfig {
    /// Read a config from a JSON file.
    pub fn read_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: RelayConfig = serde_json::from_str(r#"{ "interval_ms": 50 }"#).unwrap();
        assert_eq!(config.interval_ms, 50);
        assert_eq!(config.width, RelayConfig::default().width);
        assert_eq!(config.height, RelayConfig::default().height);
    }
}
