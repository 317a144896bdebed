//! Event arbitration.
//!
//! Every event raised in a cycle is mapped, for the current mode, to an
//! [`Intent`].  Events that mean nothing in the current mode map to no
//! intent.  When several intents compete, the highest-precedence one wins:
//!
//! ```text
//!   ConfirmSafety  >  RaiseAlarm  >  ConfirmAttendance  >  PromptCheckIn
//! ```
//!
//! `Intent` derives `Ord` in exactly that order, so resolution is `min()`.

use heapless::Vec;

use crate::events::{CycleEvent, CycleEvents};
use crate::tap::TapPattern;

use super::Mode;

/// Which alarm a tap pattern asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlarmKind {
    Distress,
    Concern,
}

/// What the controller wants to do about this cycle's events.
///
/// Variant order is precedence order (first wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Intent {
    ConfirmSafety,
    RaiseAlarm(AlarmKind),
    ConfirmAttendance,
    PromptCheckIn,
}

impl Intent {
    /// Destination mode for this intent.
    pub fn target(self) -> Mode {
        match self {
            Self::ConfirmSafety => Mode::SafetyConfirmed,
            Self::RaiseAlarm(AlarmKind::Distress) => Mode::SosAlarm,
            Self::RaiseAlarm(AlarmKind::Concern) => Mode::ConcernAlarm,
            Self::ConfirmAttendance => Mode::CardConfirmed,
            Self::PromptCheckIn => Mode::SafetyPending,
        }
    }
}

/// Map one event to its intent in `mode`.
pub fn intent_for(mode: Mode, event: CycleEvent) -> Option<Intent> {
    use CycleEvent as E;
    match (mode, event) {
        (Mode::SafetyPending, E::TapReleased | E::CardPresented) => Some(Intent::ConfirmSafety),
        (Mode::Idle | Mode::SafetyPending, E::TapPattern(TapPattern::Distress)) => {
            Some(Intent::RaiseAlarm(AlarmKind::Distress))
        }
        (Mode::Idle | Mode::SafetyPending, E::TapPattern(TapPattern::Concern)) => {
            Some(Intent::RaiseAlarm(AlarmKind::Concern))
        }
        (Mode::Idle, E::CardPresented) => Some(Intent::ConfirmAttendance),
        (Mode::Idle, E::CheckInDue) => Some(Intent::PromptCheckIn),
        _ => None,
    }
}

/// All intents this cycle's events produce in `mode`.
pub fn intents(mode: Mode, events: &CycleEvents) -> Vec<Intent, 4> {
    let mut out = Vec::new();
    for &event in events.iter() {
        if let Some(intent) = intent_for(mode, event) {
            // One intent per event and at most four events, so this never fails.
            let _ = out.push(intent);
        }
    }
    out
}

/// The winning intent, if any.
pub fn resolve(mode: Mode, events: &CycleEvents) -> Option<Intent> {
    intents(mode, events).into_iter().min()
}
