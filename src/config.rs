//! Configuration types for Graf

use serde::{Deserialize, Serialize};

use crate::codec::{TextEncoding, DEFAULT_ENCODING};
use crate::{GrafError, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Text encoding label for agent names and units
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// File extensions of the two layouts
    #[serde(default)]
    pub files: FilesConfig,
    /// Structural limits enforced while decoding headers
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

/// File extensions, without the leading dot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Header file of the split layout
    #[serde(default = "default_header_extension")]
    pub header_extension: String,
    /// Payload file of the split layout
    #[serde(default = "default_payload_extension")]
    pub payload_extension: String,
    /// Single file holding header and payload
    #[serde(default = "default_combined_extension")]
    pub combined_extension: String,
}

fn default_header_extension() -> String {
    "hdr".to_string()
}

fn default_payload_extension() -> String {
    "bin".to_string()
}

fn default_combined_extension() -> String {
    "dat".to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            header_extension: default_header_extension(),
            payload_extension: default_payload_extension(),
            combined_extension: default_combined_extension(),
        }
    }
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum agents per header
    pub max_agents: usize,
    /// Maximum stages per header
    pub max_stages: usize,
    /// Maximum bytes in one agent name
    pub max_name_length: usize,
    /// Maximum blocks in one stage
    #[serde(default = "default_max_blocks")]
    pub max_blocks: usize,
}

fn default_max_blocks() -> usize {
    100_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_agents: 1_000_000,
            max_stages: 1_000_000,
            max_name_length: 4096,
            max_blocks: default_max_blocks(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            files: FilesConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GrafError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| GrafError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Resolved text encoding
    ///
    /// # Errors
    ///
    /// Returns `UnknownEncoding` if the label is not recognised
    pub fn text_encoding(&self) -> Result<TextEncoding> {
        TextEncoding::for_label(&self.encoding)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        self.text_encoding()
            .map_err(|e| GrafError::ConfigError(e.to_string()))?;

        let files = &self.files;
        for (name, ext) in [
            ("header_extension", &files.header_extension),
            ("payload_extension", &files.payload_extension),
            ("combined_extension", &files.combined_extension),
        ] {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(GrafError::ConfigError(format!(
                    "files.{name} must be a non-empty extension without a leading dot"
                )));
            }
        }
        if files.header_extension == files.payload_extension
            || files.header_extension == files.combined_extension
            || files.payload_extension == files.combined_extension
        {
            return Err(GrafError::ConfigError(
                "File extensions must be distinct".to_string(),
            ));
        }

        if self.limits.max_agents == 0
            || self.limits.max_stages == 0
            || self.limits.max_name_length == 0
            || self.limits.max_blocks == 0
        {
            return Err(GrafError::ConfigError(
                "Limits must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
