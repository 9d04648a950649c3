// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.2
// Author: Lukas Bower
// Date Modified: 2027-11-02

//! TOML bridge configuration.
//!
//! Every knob is optional; an empty file (or no file at all) yields a
//! usable default session that direct-loads binaries over the cable.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}")]
    Io(String),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    #[serde(default)]
    pub cable: CableConfig,
    #[serde(default)]
    pub boot: BootConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

/// Which cable driver to mount. The name may carry an instance suffix,
/// e.g. `ftdi@digilent`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CableConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootConfig {
    /// `jtag` (default), `jtag_hyper`, anything else direct-loads.
    pub mode: Option<String>,
    /// Chip profile name; absent means no boot choreography.
    pub chip: Option<String>,
}

/// Optional address/value knobs for targets without a chip profile, plus
/// the PC patch applied after loading.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    pub set_pc_addr: Option<u32>,
    pub set_pc_offset: Option<i64>,
    pub start_addr: Option<u32>,
    pub start_value: Option<u32>,
    pub stop_addr: Option<u32>,
    pub stop_value: Option<u32>,
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::Io(path.display().to_string()))?;
        Ok(toml::from_str(&text)?)
    }
}
