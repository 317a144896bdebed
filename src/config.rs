//! System configuration parameters
//!
//! All tunable timing and signalling parameters for the LoneWatch badge.
//! Values can be overridden via NVS (non-volatile storage) or at runtime
//! through [`AppCommand::UpdateConfig`](crate::app::commands::AppCommand).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Button ---
    /// Released level must hold this long before a release counts (ms)
    pub button_settle_ms: u32,
    /// `true` when the button pulls the pin LOW while pressed
    pub button_active_low: bool,
    /// Rolling window within which consecutive taps belong to one pattern (ms)
    pub tap_window_ms: u32,

    // --- Safety check ---
    /// Inactivity before a check-in prompt is raised (ms)
    pub safety_interval_ms: u32,
    /// How long the green confirmation light stays on (ms)
    pub confirmation_duration_ms: u32,

    // --- Alarms ---
    /// How long the concern alarm sounds before returning to idle (ms)
    pub concern_duration_ms: u32,
    /// Continuous tone frequency for the concern alarm (Hz)
    pub concern_tone_hz: u32,
    /// Morse unit length for the SOS signal (ms)
    pub sos_unit_ms: u32,
    /// Tone frequency for SOS marks (Hz)
    pub sos_tone_hz: u32,

    // --- Card reader ---
    /// Minimum spacing between accepted card reads (ms)
    pub card_cooldown_ms: u32,
    /// Confirmation chirp frequency on card acceptance (Hz)
    pub card_chirp_hz: u32,
    /// Confirmation chirp length (ms)
    pub card_chirp_ms: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Button
            button_settle_ms: 50,
            button_active_low: true, // internal pull-up, switch to GND
            tap_window_ms: 1_500,

            // Safety check
            safety_interval_ms: 30_000,
            confirmation_duration_ms: 2_000,

            // Alarms
            concern_duration_ms: 5_000,
            concern_tone_hz: 1_000,
            sos_unit_ms: 150,
            sos_tone_hz: 2_000,

            // Card reader
            card_cooldown_ms: 2_000,
            card_chirp_hz: 1_500,
            card_chirp_ms: 100,

            // Timing
            control_loop_interval_ms: 10, // 100 Hz
        }
    }
}

impl SystemConfig {
    /// Range-check every field.
    ///
    /// Rejects rather than clamps, so a bad value pushed over a command
    /// channel never silently changes alarm behaviour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(5..=500).contains(&self.button_settle_ms) {
            return Err(ConfigError::ValidationFailed(
                "button_settle_ms must be 5–500",
            ));
        }
        if !(200..=5_000).contains(&self.tap_window_ms) {
            return Err(ConfigError::ValidationFailed(
                "tap_window_ms must be 200–5000",
            ));
        }
        if self.tap_window_ms <= self.button_settle_ms {
            return Err(ConfigError::ValidationFailed(
                "tap_window_ms must exceed button_settle_ms",
            ));
        }
        if !(5_000..=3_600_000).contains(&self.safety_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "safety_interval_ms must be 5000–3600000",
            ));
        }
        if self.safety_interval_ms <= self.tap_window_ms {
            return Err(ConfigError::ValidationFailed(
                "safety_interval_ms must exceed tap_window_ms",
            ));
        }
        if !(250..=60_000).contains(&self.confirmation_duration_ms) {
            return Err(ConfigError::ValidationFailed(
                "confirmation_duration_ms must be 250–60000",
            ));
        }
        if !(500..=600_000).contains(&self.concern_duration_ms) {
            return Err(ConfigError::ValidationFailed(
                "concern_duration_ms must be 500–600000",
            ));
        }
        if !(40..=1_000).contains(&self.sos_unit_ms) {
            return Err(ConfigError::ValidationFailed("sos_unit_ms must be 40–1000"));
        }
        for hz in [self.concern_tone_hz, self.sos_tone_hz, self.card_chirp_hz] {
            if !(100..=8_000).contains(&hz) {
                return Err(ConfigError::ValidationFailed(
                    "tone frequencies must be 100–8000 Hz",
                ));
            }
        }
        if !(250..=60_000).contains(&self.card_cooldown_ms) {
            return Err(ConfigError::ValidationFailed(
                "card_cooldown_ms must be 250–60000",
            ));
        }
        if !(10..=1_000).contains(&self.card_chirp_ms) {
            return Err(ConfigError::ValidationFailed(
                "card_chirp_ms must be 10–1000",
            ));
        }
        if !(1..=100).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 1–100",
            ));
        }
        if self.control_loop_interval_ms >= self.button_settle_ms {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be shorter than button_settle_ms",
            ));
        }
        Ok(())
    }

    /// Encode as the compact blob stored in NVS.
    pub fn to_blob(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::IoError)
    }

    /// Decode an NVS blob.  Fails on truncated or foreign data and on
    /// values that do not pass [`validate`](Self::validate).
    pub fn from_blob(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// One-line JSON rendering for the boot banner.
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}
