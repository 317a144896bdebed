//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; on the device they become log lines.

use crate::fsm::Mode;
use crate::tap::TapPattern;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries initial mode).
    Started(Mode),

    /// The controller transitioned between modes.
    ModeChanged { from: Mode, to: Mode },

    /// A button release was counted toward a tap pattern.
    TapCounted { count: u8 },

    /// A tap window closed and was classified.
    TapPattern(TapPattern),

    /// A card passed the cooldown gate while in `mode`.
    CardAccepted { mode: Mode },

    /// A configuration update was applied.
    ConfigApplied,
}
