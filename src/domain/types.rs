//! Core domain types

use serde::{Deserialize, Serialize};

/// Channel step in frequency units (10 kHz each), i.e. 100 kHz spacing
pub const FREQ_STEP: u16 = 10;

/// Upper band edge shared by both bands: 108.0 MHz
pub const FREQ_HIGH: u16 = 10800;

/// Receiver band. Each band has its own lower edge; both top out at 108 MHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Band {
    /// 87.0–108.0 MHz (US/Europe)
    #[default]
    #[serde(rename = "FM")]
    Fm,
    /// 76.0–108.0 MHz (Japan/world-wide)
    #[serde(rename = "FMWORLD")]
    FmWorld,
}

impl Band {
    /// Lowest tunable frequency in 10 kHz units
    pub fn freq_low(self) -> u16 {
        match self {
            Band::Fm => 8700,
            Band::FmWorld => 7600,
        }
    }

    /// Highest tunable frequency in 10 kHz units
    pub fn freq_high(self) -> u16 {
        FREQ_HIGH
    }

    /// Clamp `freq` into this band and round it down onto the channel grid.
    pub fn snap(self, freq: u16) -> u16 {
        let low = self.freq_low();
        let clamped = freq.clamp(low, self.freq_high());
        low + (clamped - low) / FREQ_STEP * FREQ_STEP
    }
}

/// Where the controller is in its tuning lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuneState {
    Uninitialized,
    Initialized,
    Tuned,
    /// Transient while the chip scans the band on its own
    Seeking,
}

/// Format a frequency in 10 kHz units as e.g. `"101.1 MHz"`
pub fn format_frequency(freq: u16) -> String {
    format!("{:.1} MHz", f64::from(freq) / 100.0)
}

/// Snapshot of the receiver state, suitable for display or serialisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioStatus {
    pub state: TuneState,
    pub band: Band,
    /// Frequency in 10 kHz units
    pub frequency: u16,
    pub volume: u8,
    pub mute: bool,
    pub mono: bool,
    pub bass_boost: bool,
    pub soft_mute: bool,
    pub stereo: bool,
    pub tuned: bool,
    pub rds_enabled: bool,
    /// Chip reported an RDS group waiting at the last status read
    pub rds_available: bool,
    pub rssi: u8,
    pub rds_ready: bool,
}
