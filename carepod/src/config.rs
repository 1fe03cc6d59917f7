/*!
Configuration management for the carepod tool.
*/

use anyhow::{Context, Result};
use hl7_codec::protocol;
use hl7_codec::WireFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub wire: WireFormat,
    pub sender: SenderConfig,
    pub order: OrderDefaults,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            wire: WireFormat::default(),
            sender: SenderConfig::default(),
            order: OrderDefaults::default(),
            output: OutputConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse config file as TOML")?;

        config
            .wire
            .validate()
            .with_context(|| format!("Invalid [wire] section in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// MSH values identifying this device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// MSH-3
    pub sending_app: String,

    /// MSH-4
    pub sending_facility: String,

    /// MSH-9
    pub message_type: String,

    /// MSH-12
    pub version: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            sending_app: "SMT".to_string(),
            sending_facility: "VChmey".to_string(),
            message_type: protocol::DEFAULT_MESSAGE_TYPE.to_string(),
            version: protocol::DEFAULT_VERSION.to_string(),
        }
    }
}

/// OBR values the device cannot measure itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDefaults {
    pub set_id: String,
    pub specimen_type: String,
    pub examiner: String,
    pub department: String,
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            set_id: "1".to_string(),
            specimen_type: "TBD".to_string(),
            examiner: "TBD".to_string(),
            department: "TBD".to_string(),
        }
    }
}

/// Where encoded messages go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for `.hl7` files
    pub directory: String,

    /// Also write messages to `directory`; they are always printed
    pub write_files: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./messages".to_string(),
            write_files: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_roundtrip() {
        let mut original_config = AppConfig::new();
        original_config.wire.segment_terminator = "\r".to_string();
        original_config.output.write_files = true;

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path();

        // Save and load
        original_config.save_to_file(temp_path).unwrap();
        let loaded_config = AppConfig::load_from_file(temp_path).unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::new();

        assert_eq!(config.wire.segment_terminator, "<CR>");
        assert_eq!(config.sender.sending_app, "SMT");
        assert_eq!(config.sender.sending_facility, "VChmey");
        assert_eq!(config.sender.message_type, "ORU^R01");
        assert_eq!(config.sender.version, "2.3.1");
        assert_eq!(config.order.specimen_type, "TBD");
        assert_eq!(config.output.directory, "./messages");
        assert!(!config.output.write_files);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[sender]\nsending_facility = \"Ward 7\"\n").unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.sender.sending_facility, "Ward 7");
        assert_eq!(config.sender.sending_app, "SMT");
        assert_eq!(config.wire, WireFormat::default());
    }

    #[test]
    fn test_invalid_wire_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[wire]\nsegment_terminator = \"\"\n").unwrap();

        assert!(AppConfig::load_from_file(temp_file.path()).is_err());
    }
}
