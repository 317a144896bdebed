//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌─────────────────┬───────────┬──────────┬─────────────────┐  │
//! │  │ Mode            │ on_enter  │ on_exit  │ on_update       │  │
//! │  ├─────────────────┼───────────┼──────────┼─────────────────┤  │
//! │  │ Idle            │ fn(ctx)   │ -        │ fn(ctx)->Option │  │
//! │  │ SafetyPending   │ fn(ctx)   │ -        │ fn(ctx)->Option │  │
//! │  │ SosAlarm        │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option │  │
//! │  │ ConcernAlarm    │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option │  │
//! │  │ SafetyConfirmed │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option │  │
//! │  │ CardConfirmed   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option │  │
//! │  └─────────────────┴───────────┴──────────┴─────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** mode.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! mode, stamps the entry time, then runs `on_enter` for the next.  All
//! functions receive `&mut ControllerState`, which holds the cycle's
//! events, timing, sub-component state, and output commands.

pub mod arbiter;
pub mod context;
pub mod states;

use context::ControllerState;
use log::info;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Enumeration of all controller modes.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Idle = 0,
    SafetyPending = 1,
    SosAlarm = 2,
    ConcernAlarm = 3,
    SafetyConfirmed = 4,
    CardConfirmed = 5,
}

impl Mode {
    /// Total number of modes, used to size the table array.
    pub const COUNT: usize = 6;

    pub const ALL: [Mode; Mode::COUNT] = [
        Mode::Idle,
        Mode::SafetyPending,
        Mode::SosAlarm,
        Mode::ConcernAlarm,
        Mode::SafetyConfirmed,
        Mode::CardConfirmed,
    ];

    /// Convert an index back to `Mode`.  Panics on out-of-range in debug
    /// builds; returns `Idle` in release.
    pub fn from_index(idx: usize) -> Self {
        match Self::ALL.get(idx) {
            Some(&mode) => mode,
            None => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Idle
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::SafetyPending => "SafetyPending",
            Self::SosAlarm => "SosAlarm",
            Self::ConcernAlarm => "ConcernAlarm",
            Self::SafetyConfirmed => "SafetyConfirmed",
            Self::CardConfirmed => "CardConfirmed",
        }
    }

    /// Modes that sound an alarm.  Card chirps are muted in these.
    pub fn is_alarm(self) -> bool {
        matches!(self, Self::SosAlarm | Self::ConcernAlarm)
    }

    /// Modes in which button releases feed the tap recognizer.
    pub fn counts_taps(self) -> bool {
        matches!(self, Self::Idle | Self::SafetyPending)
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each transition.
pub type StateActionFn = fn(&mut ControllerState);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut ControllerState) -> Option<Mode>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single mode.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: Mode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and the index of
/// the active mode.  The [`ControllerState`] lives with the caller and is
/// threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `Mode as usize`.
    table: [StateDescriptor; Mode::COUNT],
    /// Index of the currently active mode.
    current: usize,
    /// Transitions taken since start (wraps).
    transitions: u32,
}

impl Fsm {
    /// Construct a new FSM with the given table, starting in `initial`.
    pub fn new(table: [StateDescriptor; Mode::COUNT], initial: Mode) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting mode.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut ControllerState) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        ctx.mode_entry_ms = ctx.now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one cycle.
    ///
    /// 1. Call `on_update` for the current mode.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    ///
    /// At most one transition per cycle.
    pub fn tick(&mut self, ctx: &mut ControllerState) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition.  Forcing the current mode re-runs
    /// its exit and entry actions, restarting any timers it owns.
    pub fn force_transition(&mut self, next: Mode, ctx: &mut ControllerState) {
        self.transition(next, ctx);
    }

    /// The current mode.
    pub fn current_mode(&self) -> Mode {
        self.table[self.current].id
    }

    /// Transitions taken since start.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: Mode, ctx: &mut ControllerState) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.transitions = self.transitions.wrapping_add(1);
        ctx.mode_entry_ms = ctx.now_ms;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::{ControllerState, OutputCommands, ToneCommand};
    use super::states::prescribed_outputs;
    use super::*;
    use crate::config::SystemConfig;
    use crate::events::CycleEvent;
    use crate::tap::TapPattern;

    fn make_ctx() -> ControllerState {
        ControllerState::new(SystemConfig::default(), 0)
    }

    fn make_fsm() -> Fsm {
        Fsm::new(states::build_state_table(), Mode::Idle)
    }

    /// Advance the clock to `at` and tick with the given events raised.
    fn step(fsm: &mut Fsm, ctx: &mut ControllerState, at: u32, events: &[CycleEvent]) {
        ctx.now_ms = at;
        ctx.events.clear();
        for &e in events {
            ctx.events.raise(e);
        }
        fsm.tick(ctx);
    }

    #[test]
    fn starts_in_idle_dark() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        assert_eq!(fsm.current_mode(), Mode::Idle);
        assert_eq!(ctx.outputs, context::OutputCommands::all_off());
    }

    #[test]
    fn table_rows_match_their_index() {
        for (i, row) in states::build_state_table().iter().enumerate() {
            assert_eq!(row.id as usize, i);
            assert_eq!(row.name, row.id.name());
        }
    }

    #[test]
    fn check_in_prompt_then_tap_confirms() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        step(&mut fsm, &mut ctx, 30_001, &[CycleEvent::CheckInDue]);
        assert_eq!(fsm.current_mode(), Mode::SafetyPending);
        assert!(ctx.outputs.alert_light);

        step(&mut fsm, &mut ctx, 31_000, &[CycleEvent::TapReleased]);
        assert_eq!(fsm.current_mode(), Mode::SafetyConfirmed);
        assert!(!ctx.outputs.alert_light);
        assert!(ctx.outputs.confirm_light);
    }

    #[test]
    fn safety_confirmed_expires_and_rearms() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.now_ms = 40_000;
        fsm.force_transition(Mode::SafetyConfirmed, &mut ctx);

        step(&mut fsm, &mut ctx, 41_999, &[]);
        assert_eq!(fsm.current_mode(), Mode::SafetyConfirmed);
        step(&mut fsm, &mut ctx, 42_000, &[]);
        assert_eq!(fsm.current_mode(), Mode::Idle);
        assert!(!ctx.outputs.confirm_light);
        assert_eq!(ctx.activity.last_activity_ms(), 42_000);
    }

    #[test]
    fn concern_alarm_runs_for_its_duration() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);

        step(
            &mut fsm,
            &mut ctx,
            2_000,
            &[CycleEvent::TapPattern(TapPattern::Concern)],
        );
        assert_eq!(fsm.current_mode(), Mode::ConcernAlarm);
        assert!(ctx.outputs.alert_light);
        assert_eq!(
            ctx.outputs.tone,
            ToneCommand::Continuous(ctx.config.concern_tone_hz)
        );

        step(&mut fsm, &mut ctx, 7_000, &[]);
        assert_eq!(fsm.current_mode(), Mode::Idle);
        assert_eq!(ctx.outputs.tone, ToneCommand::Silent);
        assert!(!ctx.outputs.alert_light);
    }

    #[test]
    fn sos_runs_to_completion() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        step(
            &mut fsm,
            &mut ctx,
            1_000,
            &[CycleEvent::TapPattern(TapPattern::Distress)],
        );
        assert_eq!(fsm.current_mode(), Mode::SosAlarm);

        let mut t = 1_000;
        while fsm.current_mode() == Mode::SosAlarm {
            t += 10;
            step(&mut fsm, &mut ctx, t, &[]);
            assert!(t < 20_000, "SOS never finished");
        }
        assert_eq!(fsm.current_mode(), Mode::Idle);
        assert_eq!(ctx.outputs, context::OutputCommands::all_off());
        assert_eq!(ctx.activity.last_activity_ms(), t);
    }

    #[test]
    fn forcing_sos_again_restarts_at_phase_zero() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(Mode::SosAlarm, &mut ctx);
        for t in (10..600).step_by(10) {
            step(&mut fsm, &mut ctx, t, &[]);
        }
        assert!(ctx.sos.phase_index() > 0);

        fsm.force_transition(Mode::SosAlarm, &mut ctx);
        assert_eq!(ctx.sos.phase_index(), 0);
        assert_eq!(ctx.mode_entry_ms, 590);
    }

    #[test]
    fn leaving_sos_retires_the_cursor() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        fsm.force_transition(Mode::SosAlarm, &mut ctx);
        step(&mut fsm, &mut ctx, 10, &[]);
        assert!(ctx.outputs.alert_light);

        fsm.force_transition(Mode::Idle, &mut ctx);
        assert!(ctx.sos.is_finished());
        assert_eq!(ctx.outputs, context::OutputCommands::all_off());
    }

    #[test]
    fn card_confirmed_expires_without_touching_activity() {
        let mut fsm = make_fsm();
        let mut ctx = make_ctx();
        fsm.start(&mut ctx);
        ctx.activity.rearm(5_000);
        step(&mut fsm, &mut ctx, 5_000, &[CycleEvent::CardPresented]);
        assert_eq!(fsm.current_mode(), Mode::CardConfirmed);

        step(&mut fsm, &mut ctx, 7_000, &[]);
        assert_eq!(fsm.current_mode(), Mode::Idle);
        assert!(!ctx.outputs.confirm_light);
        assert_eq!(ctx.activity.last_activity_ms(), 5_000);
    }

    #[test]
    fn every_entry_applies_prescribed_outputs() {
        for mode in Mode::ALL {
            let mut fsm = make_fsm();
            let mut ctx = make_ctx();
            fsm.start(&mut ctx);
            ctx.outputs = OutputCommands {
                alert_light: true,
                confirm_light: true,
                tone: ToneCommand::Continuous(123),
            };
            fsm.force_transition(mode, &mut ctx);
            assert_eq!(
                ctx.outputs,
                prescribed_outputs(mode, &ctx.config),
                "{mode:?}"
            );
        }
    }

    #[test]
    fn mode_from_index_roundtrip() {
        for i in 0..Mode::COUNT {
            assert_eq!(Mode::from_index(i) as usize, i);
        }
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn mode_from_invalid_index_returns_idle() {
        assert_eq!(Mode::from_index(99), Mode::Idle);
    }
}
