//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM, the input filters, and the shared
//! controller state.  It exposes a clean, hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!     ClockPort ──▶ ┌──────────────────────────────┐
//!     InputPort ──▶ │          AppService          │ ──▶ EventSink
//! CardReaderPort ─▶ │ debounce · taps · card gate  │
//! IndicatorPort ◀── │ safety timer · arbiter · FSM │
//!                   └──────────────────────────────┘
//! ```
//!
//! One [`tick`](AppService::tick) is one control cycle:
//!
//! 1. Read the clock once.
//! 2. Classify (or discard) a closed tap window.
//! 3. Sample the button, poll the card gate, check the safety timer.
//! 4. Arbitrate and advance the FSM.
//! 5. Apply output changes.
//! 6. Emit diagnostics.

use heapless::Vec;
use log::{debug, info, warn};

use crate::card::CardGate;
use crate::config::SystemConfig;
use crate::drivers::button::{ButtonDriver, ButtonEvent};
use crate::events::CycleEvent;
use crate::fsm::context::{ControllerState, OutputCommands, ToneCommand};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, Mode};
use crate::safety::SafetyTimer;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    CardReaderPort, ClockPort, ConfigError, ConfigPort, EventSink, IndicatorPort, InputPort,
    LightChannel, ToneDuration,
};

/// Quiet period after the last config change before it is persisted.
const CONFIG_SAVE_DELAY_MS: u32 = 5_000;

/// Diagnostics buffered during one cycle: tap count, pattern, card, mode change.
const CYCLE_DIAG_CAP: usize = 4;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: ControllerState,
    button: ButtonDriver,
    cards: CardGate,
    /// Outputs last written to the hardware.  `None` until the first write,
    /// so every channel is driven once at start.
    applied: Option<OutputCommands>,
    cycles: u32,
    /// Timestamp of the first unsaved config change.
    config_dirty_since: Option<u32>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let button = ButtonDriver::new(config.button_active_low, config.button_settle_ms);
        let ctx = ControllerState::new(config, 0);
        let fsm = Fsm::new(build_state_table(), Mode::Idle);

        Self {
            fsm,
            ctx,
            button,
            cards: CardGate::new(),
            applied: None,
            cycles: 0,
            config_dirty_since: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Arm the clocks, enter `Idle`, and drive every output once.
    pub fn start(&mut self, hw: &mut (impl ClockPort + IndicatorPort), sink: &mut impl EventSink) {
        let now = hw.now_ms();
        self.ctx.now_ms = now;
        self.ctx.activity = SafetyTimer::new(now);
        self.fsm.start(&mut self.ctx);
        self.apply_outputs(hw);
        sink.emit(&AppEvent::Started(self.fsm.current_mode()));
        info!("AppService started in {} at {} ms", self.fsm.current_mode(), now);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.  Never blocks and never fails: port
    /// adapters have already folded hardware errors into safe readings.
    ///
    /// The `hw` parameter satisfies every per-cycle port, which avoids
    /// multiple mutable borrows while keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl ClockPort + InputPort + CardReaderPort + IndicatorPort),
        sink: &mut impl EventSink,
    ) {
        self.cycles = self.cycles.wrapping_add(1);
        let now = hw.now_ms();
        let mode = self.fsm.current_mode();
        let window_ms = self.ctx.config.tap_window_ms;
        let mut diag: Vec<AppEvent, CYCLE_DIAG_CAP> = Vec::new();

        self.ctx.now_ms = now;
        self.ctx.events.clear();

        // 1. Tap window: a closed window is settled before any new tap counts
        if self.ctx.taps.window_closed(now, window_ms) {
            if mode.counts_taps() {
                if let Some(pattern) = self.ctx.taps.classify(now, window_ms) {
                    if pattern.is_alarm() {
                        self.ctx.events.raise(CycleEvent::TapPattern(pattern));
                    } else {
                        debug!("tap window closed: {pattern:?}, no alarm");
                    }
                    let _ = diag.push(AppEvent::TapPattern(pattern));
                }
            } else {
                debug!("tap window closed in {mode}, {} taps discarded", self.ctx.taps.count());
                self.ctx.taps.clear();
            }
        }

        // 2. Button: debounced release → activity + (maybe) tap count
        let level = hw.read_button_level();
        if let Some(ButtonEvent::Release) = self.button.tick(level, now) {
            self.ctx.activity.rearm(now);
            self.ctx.events.raise(CycleEvent::TapReleased);
            if mode.counts_taps() {
                let count = self.ctx.taps.record_release(now, window_ms);
                debug!("tap {count} in {mode}");
                let _ = diag.push(AppEvent::TapCounted { count });
            }
        }

        // 3. Card gate: at most one read per cooldown window
        if self
            .cards
            .poll(hw, now, self.ctx.config.card_cooldown_ms)
        {
            self.ctx.activity.rearm(now);
            self.ctx.events.raise(CycleEvent::CardPresented);
            if !mode.is_alarm() {
                hw.play_tone(
                    self.ctx.config.card_chirp_hz,
                    ToneDuration::For(self.ctx.config.card_chirp_ms),
                );
            }
            info!("card accepted in {mode}");
            let _ = diag.push(AppEvent::CardAccepted { mode });
        }

        // 4. Safety timer
        if self
            .ctx
            .activity
            .check_in_due(now, self.ctx.config.safety_interval_ms)
        {
            self.ctx.events.raise(CycleEvent::CheckInDue);
        }

        // 5. Arbitration + FSM
        self.fsm.tick(&mut self.ctx);

        // 6. Outputs
        self.apply_outputs(hw);

        // 7. Diagnostics
        let new_mode = self.fsm.current_mode();
        if new_mode != mode {
            let _ = diag.push(AppEvent::ModeChanged {
                from: mode,
                to: new_mode,
            });
        }
        for event in &diag {
            sink.emit(event);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (serial console, bench tooling).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut (impl ClockPort + IndicatorPort),
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        match cmd {
            AppCommand::ForceMode(target) => {
                let prev = self.fsm.current_mode();
                self.ctx.now_ms = hw.now_ms();
                self.fsm.force_transition(target, &mut self.ctx);
                self.apply_outputs(hw);
                sink.emit(&AppEvent::ModeChanged {
                    from: prev,
                    to: target,
                });
            }
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate()?;
                self.apply_config(new_config, hw.now_ms());
                sink.emit(&AppEvent::ConfigApplied);
                info!("Configuration updated at runtime");
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current controller mode.
    pub fn mode(&self) -> Mode {
        self.fsm.current_mode()
    }

    /// Control cycles executed since startup (wraps).
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Taps in the currently open window.
    pub fn tap_count(&self) -> u8 {
        self.ctx.taps.count()
    }

    /// Outputs the FSM currently requests.
    pub fn outputs(&self) -> OutputCommands {
        self.ctx.outputs
    }

    /// Position of the SOS cursor (past the end outside `SosAlarm`).
    pub fn sos_phase(&self) -> usize {
        self.ctx.sos.phase_index()
    }

    /// Timestamp of the last recorded activity.
    pub fn last_activity_ms(&self) -> u32 {
        self.ctx.activity.last_activity_ms()
    }

    /// Whether the button is currently held (debounced).
    pub fn button_held(&self) -> bool {
        self.button.is_held()
    }

    /// The live configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Write only the channels whose requested level changed.
    fn apply_outputs(&mut self, hw: &mut impl IndicatorPort) {
        let want = self.ctx.outputs;
        let last = self.applied;

        if last.map(|o| o.alert_light) != Some(want.alert_light) {
            hw.set_light(LightChannel::Alert, want.alert_light);
        }
        if last.map(|o| o.confirm_light) != Some(want.confirm_light) {
            hw.set_light(LightChannel::Confirm, want.confirm_light);
        }
        if last.map(|o| o.tone) != Some(want.tone) {
            match want.tone {
                ToneCommand::Silent => hw.stop_tone(),
                ToneCommand::Continuous(hz) => hw.play_tone(hz, ToneDuration::Continuous),
            }
        }

        self.applied = Some(want);
    }

    fn apply_config(&mut self, config: SystemConfig, now_ms: u32) {
        if config.button_active_low != self.ctx.config.button_active_low {
            self.button = ButtonDriver::new(config.button_active_low, config.button_settle_ms);
        } else {
            self.button.set_settle_ms(config.button_settle_ms);
        }
        // The SOS unit is picked up on the next sequence start.
        self.ctx.config = config;
        if self.config_dirty_since.is_none() {
            self.config_dirty_since = Some(now_ms);
        }
    }

    // ── Config persistence ────────────────────────────────────

    /// Persist the config once it has been stable for a few seconds.
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, now_ms: u32, storage: &impl ConfigPort) -> bool {
        let Some(since) = self.config_dirty_since else {
            return false;
        };
        if now_ms.wrapping_sub(since) < CONFIG_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.ctx.config) {
            Ok(()) => {
                self.config_dirty_since = None;
                info!("Config auto-saved");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty_since.is_some()
    }
}
