//! Morse SOS signal generator.
//!
//! A fixed program of 21 steps spells `... --- ...` on the alert light
//! and tone channel.  Each step names an action and how long to wait
//! before performing it, counted from when the previous step was due:
//!
//! ```text
//!  step  action  wait        step  action  wait        step  action  wait
//!   0    Assert  0             7   Assert  0            14   Assert  0
//!   1    Clear   dot           8   Clear   dash         15   Clear   dot
//!   2    Assert  gap           9   Assert  gap          16   Assert  gap
//!   3    Clear   dot          10   Clear   dash         17   Clear   dot
//!   4    Assert  gap          11   Assert  gap          18   Assert  gap
//!   5    Clear   dot          12   Clear   dash         19   Clear   dot
//!   6    Pause   letter gap   13   Pause   letter gap   20   Finish  0
//! ```
//!
//! Deadlines accumulate from the sequence start rather than from the cycle
//! that happened to observe them, so loop jitter never stretches the
//! signal.  The sequencer never blocks: [`SosSequencer::tick`] performs at
//! most one phase check per call and reports what the outputs should be.

/// Length of one Morse element, in units.
pub const DOT_UNITS: u32 = 1;
pub const DASH_UNITS: u32 = 3;
/// Silence between elements of one letter.
pub const GAP_UNITS: u32 = 1;
/// Silence between letters.
pub const LETTER_GAP_UNITS: u32 = 3;

/// What a step does once its wait has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    /// Light + tone on.
    Assert,
    /// Light + tone off.
    Clear,
    /// Nothing; just consumes time.
    Pause,
    /// Sequence complete.
    Finish,
}

/// One row of the phase program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStep {
    pub action: PhaseAction,
    /// Wait before acting, in Morse units.
    pub wait_units: u32,
}

const fn step(action: PhaseAction, wait_units: u32) -> PhaseStep {
    PhaseStep { action, wait_units }
}

use PhaseAction::{Assert, Clear, Finish, Pause};

/// The full S-O-S program.
pub const SOS_PROGRAM: [PhaseStep; 21] = [
    // S
    step(Assert, 0),
    step(Clear, DOT_UNITS),
    step(Assert, GAP_UNITS),
    step(Clear, DOT_UNITS),
    step(Assert, GAP_UNITS),
    step(Clear, DOT_UNITS),
    step(Pause, LETTER_GAP_UNITS),
    // O
    step(Assert, 0),
    step(Clear, DASH_UNITS),
    step(Assert, GAP_UNITS),
    step(Clear, DASH_UNITS),
    step(Assert, GAP_UNITS),
    step(Clear, DASH_UNITS),
    step(Pause, LETTER_GAP_UNITS),
    // S
    step(Assert, 0),
    step(Clear, DOT_UNITS),
    step(Assert, GAP_UNITS),
    step(Clear, DOT_UNITS),
    step(Assert, GAP_UNITS),
    step(Clear, DOT_UNITS),
    step(Finish, 0),
];

/// Units from sequence start to the last clear:
/// 6 dots + 3 dashes + 6 element gaps + 2 letter gaps.
pub const SOS_TOTAL_UNITS: u32 =
    6 * DOT_UNITS + 3 * DASH_UNITS + 6 * GAP_UNITS + 2 * LETTER_GAP_UNITS;

/// Output change requested by a phase step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SosOutput {
    /// Nothing happened this cycle.
    Hold,
    /// Turn light + tone on.
    MarkOn,
    /// Turn light + tone off.
    MarkOff,
    /// The program finished; outputs are already off.
    Complete,
}

/// Phase cursor over [`SOS_PROGRAM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SosSequencer {
    phase_index: usize,
    phase_start_ms: u32,
    unit_ms: u32,
}

impl SosSequencer {
    pub fn new(unit_ms: u32) -> Self {
        Self {
            phase_index: 0,
            phase_start_ms: 0,
            unit_ms,
        }
    }

    /// Rewind to phase 0, starting the clock at `now_ms`.
    pub fn restart(&mut self, now_ms: u32, unit_ms: u32) {
        self.phase_index = 0;
        self.phase_start_ms = now_ms;
        self.unit_ms = unit_ms;
    }

    /// Park the cursor past the end so a stale sequence cannot resume.
    pub fn retire(&mut self) {
        self.phase_index = SOS_PROGRAM.len();
    }

    /// Current position in the program.
    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    /// Whether the cursor has run past `Finish`.
    pub fn is_finished(&self) -> bool {
        self.phase_index >= SOS_PROGRAM.len()
    }

    /// One non-blocking phase check.
    pub fn tick(&mut self, now_ms: u32) -> SosOutput {
        let Some(step) = SOS_PROGRAM.get(self.phase_index) else {
            return SosOutput::Complete;
        };

        let wait_ms = step.wait_units.saturating_mul(self.unit_ms);
        if now_ms.wrapping_sub(self.phase_start_ms) < wait_ms {
            return SosOutput::Hold;
        }

        self.phase_index += 1;
        self.phase_start_ms = self.phase_start_ms.wrapping_add(wait_ms);

        match step.action {
            PhaseAction::Assert => SosOutput::MarkOn,
            PhaseAction::Clear => SosOutput::MarkOff,
            PhaseAction::Pause => SosOutput::Hold,
            PhaseAction::Finish => SosOutput::Complete,
        }
    }
}
