//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (button, card reader, lights/buzzer, clock, event
//! sinks, config storage) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.
//!
//! None of the per-cycle ports return `Result`: the controller is
//! fail-safe, so adapters translate their own failures into the safe
//! reading ("not pressed", "no card") before it reaches the domain.

use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; every consumer
/// compares with `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw button sampling.  Polarity is resolved by the debouncer, not here.
pub trait InputPort {
    /// Current pin level (`true` = HIGH).
    fn read_button_level(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Card reader port
// ───────────────────────────────────────────────────────────────

/// Presence-only view of the proximity-card reader.
pub trait CardReaderPort {
    /// Non-blocking.  `true` at most once per physical presentation until
    /// [`release_card`](Self::release_card) is called.
    fn poll_card_present(&mut self) -> bool;

    /// Halt the current card session so the same card is not reported
    /// again while it lingers in the field.
    fn release_card(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The two indicator lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightChannel {
    /// Red: check-in prompt, alarms, SOS marks.
    Alert,
    /// Green: safety or attendance confirmed.
    Confirm,
}

/// How long a tone should sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneDuration {
    /// Until [`IndicatorPort::stop_tone`].
    Continuous,
    /// Self-terminating after the given milliseconds.
    For(u32),
}

/// Write-side port: lights and audible channel.
pub trait IndicatorPort {
    fn set_light(&mut self, channel: LightChannel, on: bool);

    /// Start a tone, replacing any tone already sounding.
    fn play_tone(&mut self, frequency_hz: u32, duration: ToneDuration);

    fn stop_tone(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Best-effort: nothing in the control path depends
/// on delivery.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting
/// ([`SystemConfig::validate`]).
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
