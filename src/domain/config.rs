//! Receiver configuration
//!
//! A `RadioConfig` holds the power-on settings for one receiver: band,
//! start frequency, volume and the RSSI gate used for RDS reception.
//! Profiles are stored as pretty-printed JSON.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Band, RadioError, RadioResult};

/// Hardware volume ceiling (4-bit VOL field)
pub const HW_MAX_VOLUME: u8 = 15;

fn default_frequency() -> u16 {
    10000
}

fn default_volume() -> u8 {
    1
}

fn default_max_volume() -> u8 {
    HW_MAX_VOLUME
}

fn default_rds_threshold() -> u8 {
    10
}

fn default_threshold_interval_secs() -> u64 {
    10
}

/// Power-on settings for a receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioConfig {
    #[serde(default)]
    pub band: Band,
    /// Start frequency in 10 kHz units (10000 = 100.0 MHz)
    #[serde(default = "default_frequency")]
    pub frequency: u16,
    #[serde(default = "default_volume")]
    pub volume: u8,
    /// Volume ceiling; anything above 15 is capped to 15
    #[serde(default = "default_max_volume")]
    pub max_volume: u8,
    /// Minimum RSSI before RDS frames are polled
    #[serde(default = "default_rds_threshold")]
    pub rds_threshold: u8,
    /// Seconds between RSSI re-checks of the RDS gate
    #[serde(default = "default_threshold_interval_secs")]
    pub threshold_interval_secs: u64,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            band: Band::default(),
            frequency: default_frequency(),
            volume: default_volume(),
            max_volume: default_max_volume(),
            rds_threshold: default_rds_threshold(),
            threshold_interval_secs: default_threshold_interval_secs(),
        }
    }
}

impl RadioConfig {
    /// Effective volume ceiling, never above the 4-bit hardware field
    pub fn volume_ceiling(&self) -> u8 {
        self.max_volume.min(HW_MAX_VOLUME)
    }

    pub fn threshold_interval(&self) -> Duration {
        Duration::from_secs(self.threshold_interval_secs)
    }

    /// Load a profile from a JSON file
    pub fn load(path: impl AsRef<Path>) -> RadioResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            RadioError::Config(format!("Failed to read config '{}': {e}", path.display()))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            RadioError::Config(format!("Failed to parse config '{}': {e}", path.display()))
        })
    }

    /// Save this profile as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> RadioResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RadioError::Config(format!("Serialization error: {e}")))?;
        std::fs::write(path, json).map_err(|e| {
            RadioError::Config(format!("Failed to write config '{}': {e}", path.display()))
        })
    }
}
