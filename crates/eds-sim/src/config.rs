//! TOML-based configuration for the simulation binary.
//!
//! Everything has a default, so the binary runs with no config file at all;
//! a `config.toml` next to the binary overrides individual fields:
//!
//! ```toml
//! [simulation]
//! log_level = "debug"
//!
//! [addresses]
//! host = [10, 0, 0, 1]
//! device = [10, 0, 0, 2]
//!
//! [video]
//! source_path = "assets/capture.gif"
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so a partial
//! config file keeps working as new fields are added.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub addresses: AddressConfig,
    #[serde(default)]
    pub video: VideoConfig,
}

/// General driver-loop behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Link-layer addresses of the two endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressConfig {
    /// Host endpoint address as four bytes.
    #[serde(default = "default_host_address")]
    pub host: [u8; 4],
    /// Device endpoint address as four bytes.
    #[serde(default = "default_device_address")]
    pub device: [u8; 4],
}

/// File paths the video pipeline reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoConfig {
    /// Capture asset the device serves on a video request.
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,
    /// Where the device stages its encoded transport stream.
    #[serde(default = "default_device_encoded_path")]
    pub device_encoded_path: PathBuf,
    /// Where the host writes the reassembled transport stream.
    #[serde(default = "default_host_encoded_path")]
    pub host_encoded_path: PathBuf,
    /// Where the host writes the final decoded asset.
    #[serde(default = "default_host_decoded_path")]
    pub host_decoded_path: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_host_address() -> [u8; 4] {
    [0x0A, 0x00, 0x00, 0x01]
}
fn default_device_address() -> [u8; 4] {
    [0x0A, 0x00, 0x00, 0x02]
}
fn default_source_path() -> PathBuf {
    PathBuf::from("assets/capture.gif")
}
fn default_device_encoded_path() -> PathBuf {
    PathBuf::from("assets/device-encoded.h264")
}
fn default_host_encoded_path() -> PathBuf {
    PathBuf::from("assets/host-received.h264")
}
fn default_host_decoded_path() -> PathBuf {
    PathBuf::from("assets/host-decoded.gif")
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            addresses: AddressConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            host: default_host_address(),
            device: default_device_address(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            device_encoded_path: default_device_encoded_path(),
            host_encoded_path: default_host_encoded_path(),
            host_decoded_path: default_host_decoded_path(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SimConfig {
    /// Loads configuration from `path`, returning `SimConfig::default()` if
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than "not
    /// found", and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: SimConfig = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SimConfig::default()),
            Err(e) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
