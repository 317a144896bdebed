//! Concrete mode handler functions and table builder.
//!
//! Each mode is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[check-in due]──▶ SAFETY_PENDING ──[tap | card]──▶ SAFETY_CONFIRMED
//!   │                            │                                │
//!   ├──[2 taps]──┬───────────────┘ [2 | 3 taps]              [duration]
//!   │            ▼                                                ▼
//!   │       CONCERN_ALARM ──[duration]──────────────────────────▶ IDLE
//!   │
//!   ├──[3 taps]──▶ SOS_ALARM ──[sequence finished]──────────────▶ IDLE
//!   │
//!   └──[card]────▶ CARD_CONFIRMED ──[duration]──────────────────▶ IDLE
//! ```
//!
//! Event-driven transitions are decided by [`arbiter::resolve`]; timed
//! ones by each handler's own deadline.

use super::arbiter;
use super::context::{ControllerState, OutputCommands, ToneCommand};
use super::{Mode, StateDescriptor};
use crate::config::SystemConfig;
use crate::sos::SosOutput;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; Mode::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: Mode::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — SafetyPending
        StateDescriptor {
            id: Mode::SafetyPending,
            name: "SafetyPending",
            on_enter: Some(safety_pending_enter),
            on_exit: None,
            on_update: safety_pending_update,
        },
        // Index 2 — SosAlarm
        StateDescriptor {
            id: Mode::SosAlarm,
            name: "SosAlarm",
            on_enter: Some(sos_enter),
            on_exit: Some(sos_exit),
            on_update: sos_update,
        },
        // Index 3 — ConcernAlarm
        StateDescriptor {
            id: Mode::ConcernAlarm,
            name: "ConcernAlarm",
            on_enter: Some(concern_enter),
            on_exit: Some(concern_exit),
            on_update: concern_update,
        },
        // Index 4 — SafetyConfirmed
        StateDescriptor {
            id: Mode::SafetyConfirmed,
            name: "SafetyConfirmed",
            on_enter: Some(safety_confirmed_enter),
            on_exit: Some(safety_confirmed_exit),
            on_update: safety_confirmed_update,
        },
        // Index 5 — CardConfirmed
        StateDescriptor {
            id: Mode::CardConfirmed,
            name: "CardConfirmed",
            on_enter: Some(card_confirmed_enter),
            on_exit: Some(card_confirmed_exit),
            on_update: card_confirmed_update,
        },
    ]
}

/// Output levels a mode establishes on entry.
pub fn prescribed_outputs(mode: Mode, config: &SystemConfig) -> OutputCommands {
    let (alert_light, confirm_light, tone) = match mode {
        Mode::Idle | Mode::SosAlarm => (false, false, ToneCommand::Silent),
        Mode::SafetyPending => (true, false, ToneCommand::Silent),
        Mode::SafetyConfirmed | Mode::CardConfirmed => (false, true, ToneCommand::Silent),
        Mode::ConcernAlarm => (true, false, ToneCommand::Continuous(config.concern_tone_hz)),
    };
    OutputCommands {
        alert_light,
        confirm_light,
        tone,
    }
}

fn apply_prescribed(ctx: &mut ControllerState, mode: Mode) {
    ctx.outputs = prescribed_outputs(mode, &ctx.config);
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE — waiting for taps, cards, or the safety interval
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut ControllerState) {
    apply_prescribed(ctx, Mode::Idle);
    info!("IDLE: monitoring");
}

fn idle_update(ctx: &mut ControllerState) -> Option<Mode> {
    arbiter::resolve(Mode::Idle, &ctx.events).map(arbiter::Intent::target)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAFETY_PENDING — check-in prompt, waiting for a tap or card
// ═══════════════════════════════════════════════════════════════════════════

fn safety_pending_enter(ctx: &mut ControllerState) {
    apply_prescribed(ctx, Mode::SafetyPending);
    warn!(
        "SAFETY_PENDING: no activity for {} ms, awaiting check-in",
        ctx.activity.idle_for(ctx.now_ms)
    );
}

fn safety_pending_update(ctx: &mut ControllerState) -> Option<Mode> {
    arbiter::resolve(Mode::SafetyPending, &ctx.events).map(arbiter::Intent::target)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SOS_ALARM — phase-stepped Morse distress signal
// ═══════════════════════════════════════════════════════════════════════════

fn sos_enter(ctx: &mut ControllerState) {
    ctx.taps.clear();
    ctx.sos.restart(ctx.now_ms, ctx.config.sos_unit_ms);
    apply_prescribed(ctx, Mode::SosAlarm);
    warn!("SOS_ALARM: distress signal started");
}

fn sos_exit(ctx: &mut ControllerState) {
    ctx.sos.retire();
    ctx.outputs.alert_light = false;
    ctx.outputs.tone = ToneCommand::Silent;
    ctx.activity.rearm(ctx.now_ms);
}

fn sos_update(ctx: &mut ControllerState) -> Option<Mode> {
    match ctx.sos.tick(ctx.now_ms) {
        SosOutput::Hold => None,
        SosOutput::MarkOn => {
            ctx.outputs.alert_light = true;
            ctx.outputs.tone = ToneCommand::Continuous(ctx.config.sos_tone_hz);
            None
        }
        SosOutput::MarkOff => {
            ctx.outputs.alert_light = false;
            ctx.outputs.tone = ToneCommand::Silent;
            None
        }
        SosOutput::Complete => {
            info!("SOS_ALARM: sequence complete after {} ms", ctx.ms_in_mode());
            Some(Mode::Idle)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONCERN_ALARM — steady light and tone for a fixed duration
// ═══════════════════════════════════════════════════════════════════════════

fn concern_enter(ctx: &mut ControllerState) {
    ctx.taps.clear();
    apply_prescribed(ctx, Mode::ConcernAlarm);
    warn!(
        "CONCERN_ALARM: {} Hz for {} ms",
        ctx.config.concern_tone_hz, ctx.config.concern_duration_ms
    );
}

fn concern_exit(ctx: &mut ControllerState) {
    ctx.outputs.alert_light = false;
    ctx.outputs.tone = ToneCommand::Silent;
    ctx.activity.rearm(ctx.now_ms);
}

fn concern_update(ctx: &mut ControllerState) -> Option<Mode> {
    (ctx.ms_in_mode() >= ctx.config.concern_duration_ms).then_some(Mode::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAFETY_CONFIRMED — check-in acknowledged
// ═══════════════════════════════════════════════════════════════════════════

fn safety_confirmed_enter(ctx: &mut ControllerState) {
    // Check-in wins over counting: the confirming tap starts no pattern.
    ctx.taps.clear();
    apply_prescribed(ctx, Mode::SafetyConfirmed);
    info!("SAFETY_CONFIRMED: check-in received");
}

fn safety_confirmed_exit(ctx: &mut ControllerState) {
    ctx.outputs.confirm_light = false;
    ctx.activity.rearm(ctx.now_ms);
}

fn safety_confirmed_update(ctx: &mut ControllerState) -> Option<Mode> {
    (ctx.ms_in_mode() >= ctx.config.confirmation_duration_ms).then_some(Mode::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CARD_CONFIRMED — attendance acknowledged
// ═══════════════════════════════════════════════════════════════════════════

fn card_confirmed_enter(ctx: &mut ControllerState) {
    apply_prescribed(ctx, Mode::CardConfirmed);
    info!("CARD_CONFIRMED: attendance recorded");
}

fn card_confirmed_exit(ctx: &mut ControllerState) {
    ctx.outputs.confirm_light = false;
}

fn card_confirmed_update(ctx: &mut ControllerState) -> Option<Mode> {
    (ctx.ms_in_mode() >= ctx.config.confirmation_duration_ms).then_some(Mode::Idle)
}
