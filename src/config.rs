//! Transfer configuration parameters
//!
//! All tunable parameters for one sample dump.  Values can be loaded from
//! JSON; missing fields take their defaults.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sds::message::LoopType;

/// Largest value a 20-bit header field carries.
const MAX_20BIT: u32 = 0xF_FFFF;

/// Per-transfer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    // --- Addressing ---
    /// Sysex device channel (0-127)
    pub channel: u8,
    /// Waveform slot on the receiver (14 bits)
    pub slot: u16,

    // --- Handshake timing ---
    /// How long to wait for the header response before assuming the
    /// receiver does not handshake (milliseconds)
    pub header_timeout_ms: u32,
    /// Wait per data packet (milliseconds)
    pub packet_timeout_ms: u32,

    // --- Reporting ---
    /// Minimum progress delta between reports (percentage points)
    pub progress_step_percent: u8,

    // --- Sustain loop ---
    pub loop_start: u32,
    pub loop_end: u32,
    pub loop_type: LoopType,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            slot: 0,

            header_timeout_ms: 2000,
            packet_timeout_ms: 20,

            progress_step_percent: 5,

            loop_start: 0,
            loop_end: 0,
            loop_type: LoopType::Forward,
        }
    }
}

impl TransferConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|_| ConfigError::Malformed)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel > 0x7F {
            return Err(ConfigError::ValidationFailed("channel must be in 0..=127"));
        }
        if self.slot > 0x3FFF {
            return Err(ConfigError::ValidationFailed("slot must be in 0..=16383"));
        }
        if self.header_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "header_timeout_ms must be non-zero",
            ));
        }
        if self.packet_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "packet_timeout_ms must be non-zero",
            ));
        }
        if !(1..=100).contains(&self.progress_step_percent) {
            return Err(ConfigError::ValidationFailed(
                "progress_step_percent must be in 1..=100",
            ));
        }
        if self.loop_start > MAX_20BIT || self.loop_end > MAX_20BIT {
            return Err(ConfigError::ValidationFailed(
                "loop points must fit in 20 bits",
            ));
        }
        Ok(())
    }

    pub fn header_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.header_timeout_ms))
    }

    pub fn packet_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.packet_timeout_ms))
    }
}
