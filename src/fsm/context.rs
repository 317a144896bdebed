//! Shared mutable context threaded through every FSM handler.
//!
//! `ControllerState` is the single struct that mode handlers read from and
//! write to: the cycle timestamp, the tap accumulator, the activity clock,
//! the SOS cursor, this cycle's raised events, the output commands, and
//! configuration.  Think of it as the "blackboard" in a blackboard
//! architecture.

use crate::config::SystemConfig;
use crate::events::CycleEvents;
use crate::safety::SafetyTimer;
use crate::sos::SosSequencer;
use crate::tap::TapRecognizer;

// ---------------------------------------------------------------------------
// Output commands (written by mode handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Continuous tone request.  Short chirps are issued by the service
/// directly and never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneCommand {
    #[default]
    Silent,
    Continuous(u32),
}

/// Desired output levels.  The service diffs these against what it last
/// applied and only touches the hardware on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputCommands {
    pub alert_light: bool,
    pub confirm_light: bool,
    pub tone: ToneCommand,
}

impl OutputCommands {
    /// Everything dark and silent.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// ControllerState
// ---------------------------------------------------------------------------

/// The shared context passed to every mode handler function.
pub struct ControllerState {
    // -- Timing --
    /// Clock reading for the current cycle.  Sampled once per cycle.
    pub now_ms: u32,
    /// Timestamp of the last transition.
    pub mode_entry_ms: u32,

    // -- Sub-components --
    pub taps: TapRecognizer,
    pub activity: SafetyTimer,
    pub sos: SosSequencer,

    // -- Inputs --
    /// Events raised by the filtering stage this cycle.
    pub events: CycleEvents,

    // -- Outputs --
    pub outputs: OutputCommands,

    // -- Configuration --
    pub config: SystemConfig,
}

impl ControllerState {
    /// Create a new context with the given configuration, starting the
    /// clocks at `now_ms`.
    pub fn new(config: SystemConfig, now_ms: u32) -> Self {
        let mut sos = SosSequencer::new(config.sos_unit_ms);
        sos.retire();
        Self {
            now_ms,
            mode_entry_ms: now_ms,
            taps: TapRecognizer::new(),
            activity: SafetyTimer::new(now_ms),
            sos,
            events: CycleEvents::new(),
            outputs: OutputCommands::all_off(),
            config,
        }
    }

    /// Milliseconds since the current mode was entered.
    pub fn ms_in_mode(&self) -> u32 {
        self.now_ms.wrapping_sub(self.mode_entry_ms)
    }
}
