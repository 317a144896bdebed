//! Integration tests for the input → arbitration → FSM → indicator pipeline.
//!
//! These run on the host (x86_64) and drive [`AppService`] one control
//! cycle at a time against [`MockHardware`], the way the firmware main
//! loop does on the device.

use super::mock_hw::{IndicatorCall, MockHardware, RecordingSink};

use lonewatch::adapters::nvs::NvsAdapter;
use lonewatch::app::commands::AppCommand;
use lonewatch::app::events::AppEvent;
use lonewatch::app::ports::{ConfigPort, LightChannel, ToneDuration};
use lonewatch::app::service::AppService;
use lonewatch::config::SystemConfig;
use lonewatch::fsm::Mode;
use lonewatch::sos::{SOS_PROGRAM, SOS_TOTAL_UNITS};
use lonewatch::tap::TapPattern;

const STEP_MS: u32 = 10;

struct Rig {
    app: AppService,
    hw: MockHardware,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self::starting_at(0, SystemConfig::default())
    }

    fn starting_at(now: u32, config: SystemConfig) -> Self {
        let mut app = AppService::new(config);
        let mut hw = MockHardware::new(now);
        let mut sink = RecordingSink::new();
        app.start(&mut hw, &mut sink);
        Self { app, hw, sink }
    }

    fn cfg(&self) -> SystemConfig {
        self.app.config().clone()
    }

    fn step(&mut self) {
        self.hw.now = self.hw.now.wrapping_add(STEP_MS);
        self.app.tick(&mut self.hw, &mut self.sink);
    }

    fn advance(&mut self, ms: u32) {
        for _ in 0..ms / STEP_MS {
            self.step();
        }
    }

    /// Step until `mode` is reached.  Returns the elapsed time, or `None`
    /// if it was not reached within `max_ms`.
    fn advance_until(&mut self, mode: Mode, max_ms: u32) -> Option<u32> {
        let start = self.hw.now;
        while self.hw.now.wrapping_sub(start) < max_ms {
            self.step();
            if self.app.mode() == mode {
                return Some(self.hw.now.wrapping_sub(start));
            }
        }
        None
    }

    /// One press-and-release, long enough to clear the debounce.
    fn tap(&mut self) {
        self.hw.level = false;
        self.advance(100);
        self.hw.level = true;
        self.advance(60);
    }

    fn taps(&mut self, n: usize) {
        for _ in 0..n {
            self.tap();
            self.advance(200);
        }
    }

    /// Press, release, and step until the release is counted.  Returns
    /// the cycle time the release landed on.
    fn timed_tap(&mut self) -> u32 {
        let counted = |sink: &RecordingSink| {
            sink.count(|e| matches!(e, AppEvent::TapCounted { .. }))
        };
        let before = counted(&self.sink);
        self.hw.level = false;
        self.advance(100);
        self.hw.level = true;
        while counted(&self.sink) == before {
            self.step();
        }
        self.hw.now
    }

    /// Hold the button so its release is reported on exactly the cycle
    /// at `at`.
    fn release_at(&mut self, at: u32) {
        let settle = self.cfg().button_settle_ms;
        self.hw.level = false;
        while self.hw.now != at.wrapping_sub(settle + STEP_MS) {
            self.step();
        }
        self.hw.level = true;
        while self.hw.now != at {
            self.step();
        }
    }

    /// A card held in the field for a single cycle.
    fn present_card(&mut self) {
        self.hw.card_in_field = true;
        self.step();
        self.hw.card_in_field = false;
    }

    fn enter_concern(&mut self) {
        self.taps(2);
        let window = self.cfg().tap_window_ms;
        assert!(self.advance_until(Mode::ConcernAlarm, window + 100).is_some());
    }
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_drives_all_outputs_off() {
    let rig = Rig::new();
    assert_eq!(rig.app.mode(), Mode::Idle);
    assert_eq!(
        rig.hw.calls,
        vec![
            IndicatorCall::Light {
                channel: LightChannel::Alert,
                on: false
            },
            IndicatorCall::Light {
                channel: LightChannel::Confirm,
                on: false
            },
            IndicatorCall::StopTone,
        ]
    );
    assert_eq!(rig.sink.events, vec![AppEvent::Started(Mode::Idle)]);
}

// ── Tap patterns ──────────────────────────────────────────────

#[test]
fn two_taps_raise_concern_then_return_to_idle() {
    let mut rig = Rig::new();
    let cfg = rig.cfg();
    rig.enter_concern();

    assert!(rig.hw.light(LightChannel::Alert));
    assert_eq!(rig.hw.continuous_tone(), Some(cfg.concern_tone_hz));
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::TapPattern(TapPattern::Concern)));

    let held = rig
        .advance_until(Mode::Idle, cfg.concern_duration_ms + 100)
        .expect("concern alarm should time out");
    assert!(held >= cfg.concern_duration_ms);
    assert!(!rig.hw.light(LightChannel::Alert));
    assert_eq!(rig.hw.continuous_tone(), None);
}

#[test]
fn three_taps_play_complete_sos() {
    let mut rig = Rig::new();
    let cfg = rig.cfg();
    rig.taps(3);
    assert!(rig
        .advance_until(Mode::SosAlarm, cfg.tap_window_ms + 100)
        .is_some());
    assert_eq!(rig.app.sos_phase(), 0);

    let total = SOS_TOTAL_UNITS * cfg.sos_unit_ms;
    let elapsed = rig
        .advance_until(Mode::Idle, total + 500)
        .expect("SOS should finish on its own");
    assert!(elapsed >= total);
    assert!(elapsed < total + 100);

    // Nine marks, each with light and tone together.
    assert_eq!(rig.hw.light_on_count(LightChannel::Alert), 9);
    let marks = rig
        .hw
        .calls
        .iter()
        .filter(|c| {
            **c == IndicatorCall::Tone {
                hz: cfg.sos_tone_hz,
                duration: ToneDuration::Continuous,
            }
        })
        .count();
    assert_eq!(marks, 9);

    assert!(!rig.hw.light(LightChannel::Alert));
    assert_eq!(rig.hw.continuous_tone(), None);
    assert_eq!(rig.app.sos_phase(), SOS_PROGRAM.len());
}

/// Taps `n` times, then lands one more release on the first cycle after
/// the window closes.  Returns the mode entered on that cycle.
fn release_on_window_close(n: usize) -> (Rig, Mode) {
    let mut rig = Rig::new();
    let window = rig.cfg().tap_window_ms;
    let mut last = 0;
    for _ in 0..n {
        last = rig.timed_tap();
        rig.advance(100);
    }
    rig.release_at(last + window + STEP_MS);
    let mode = rig.app.mode();
    (rig, mode)
}

#[test]
fn pattern_classified_before_release_on_closing_cycle() {
    let (rig, mode) = release_on_window_close(2);
    assert_eq!(mode, Mode::ConcernAlarm);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::TapPattern(TapPattern::Concern)));
    assert!(!rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::TapPattern(TapPattern::Ignored(_)))));
}

#[test]
fn distress_survives_release_on_closing_cycle() {
    let (rig, mode) = release_on_window_close(3);
    assert_eq!(mode, Mode::SosAlarm);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::TapPattern(TapPattern::Distress)));
}

#[test]
fn single_tap_raises_nothing() {
    let mut rig = Rig::new();
    rig.tap();
    rig.advance(2_000);

    assert_eq!(rig.app.mode(), Mode::Idle);
    assert_eq!(rig.app.tap_count(), 0);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::TapPattern(TapPattern::Ignored(1))));
    assert_eq!(rig.hw.continuous_tone(), None);
}

#[test]
fn four_taps_are_ignored() {
    let mut rig = Rig::new();
    rig.taps(4);
    rig.advance(2_000);
    assert_eq!(rig.app.mode(), Mode::Idle);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::TapPattern(TapPattern::Ignored(4))));
}

#[test]
fn taps_during_alarm_are_not_counted() {
    let mut rig = Rig::new();
    rig.enter_concern();
    let counted = rig.sink.count(|e| matches!(e, AppEvent::TapCounted { .. }));

    rig.taps(3);
    assert_eq!(rig.app.mode(), Mode::ConcernAlarm);
    assert_eq!(rig.app.tap_count(), 0);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::TapCounted { .. })),
        counted
    );
}

// ── Check-in ──────────────────────────────────────────────────

#[test]
fn inactivity_prompts_check_in() {
    let mut rig = Rig::new();
    let cfg = rig.cfg();

    rig.advance(cfg.safety_interval_ms - 1_000);
    assert_eq!(rig.app.mode(), Mode::Idle);

    assert!(rig.advance_until(Mode::SafetyPending, 2_000).is_some());
    assert!(rig.hw.light(LightChannel::Alert));
    assert_eq!(rig.hw.continuous_tone(), None);
}

#[test]
fn tap_confirms_pending_check_in() {
    let mut rig = Rig::new();
    let cfg = rig.cfg();
    assert!(rig
        .advance_until(Mode::SafetyPending, cfg.safety_interval_ms + 100)
        .is_some());

    rig.tap();
    assert_eq!(rig.app.mode(), Mode::SafetyConfirmed);
    assert!(!rig.hw.light(LightChannel::Alert));
    assert!(rig.hw.light(LightChannel::Confirm));
    assert_eq!(rig.app.tap_count(), 0);

    assert!(rig
        .advance_until(Mode::Idle, cfg.confirmation_duration_ms + 100)
        .is_some());
    assert!(!rig.hw.light(LightChannel::Confirm));
}

#[test]
fn card_confirms_pending_check_in() {
    let mut rig = Rig::new();
    let cfg = rig.cfg();
    assert!(rig
        .advance_until(Mode::SafetyPending, cfg.safety_interval_ms + 100)
        .is_some());

    rig.present_card();
    assert_eq!(rig.app.mode(), Mode::SafetyConfirmed);
    assert!(rig.hw.light(LightChannel::Confirm));
    assert_eq!(rig.hw.chirps(), 1);
    assert!(rig.sink.events.contains(&AppEvent::CardAccepted {
        mode: Mode::SafetyPending
    }));
}

#[test]
fn held_button_is_not_activity() {
    let mut rig = Rig::new();
    let cfg = rig.cfg();

    rig.hw.level = false;
    assert!(rig
        .advance_until(Mode::SafetyPending, cfg.safety_interval_ms + 100)
        .is_some());
    rig.advance(5_000);
    assert_eq!(rig.app.mode(), Mode::SafetyPending);
    assert!(rig.app.button_held());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::TapCounted { .. })),
        0
    );

    rig.hw.level = true;
    rig.advance(60);
    assert_eq!(rig.app.mode(), Mode::SafetyConfirmed);
}

// ── Cards ─────────────────────────────────────────────────────

#[test]
fn card_in_idle_records_attendance() {
    let mut rig = Rig::new();
    let cfg = rig.cfg();

    rig.present_card();
    assert_eq!(rig.app.mode(), Mode::CardConfirmed);
    assert!(rig.hw.light(LightChannel::Confirm));
    assert_eq!(rig.hw.card_releases, 1);

    let held = rig
        .advance_until(Mode::Idle, cfg.confirmation_duration_ms + 100)
        .expect("attendance confirmation should time out");
    assert!(held >= cfg.confirmation_duration_ms - STEP_MS);
    assert!(!rig.hw.light(LightChannel::Confirm));
}

#[test]
fn lingering_card_accepted_once_per_cooldown() {
    let mut rig = Rig::new();
    let cooldown = rig.cfg().card_cooldown_ms;
    let accepted = |sink: &RecordingSink| sink.count(|e| matches!(e, AppEvent::CardAccepted { .. }));

    rig.hw.card_in_field = true;
    rig.step();
    rig.advance(cooldown - 100);
    assert_eq!(accepted(&rig.sink), 1);
    assert_eq!(rig.hw.card_polls, 1);

    rig.advance(200);
    assert_eq!(accepted(&rig.sink), 2);
}

#[test]
fn card_chirp_muted_during_alarm() {
    let mut rig = Rig::new();
    rig.enter_concern();

    rig.present_card();
    assert_eq!(rig.app.mode(), Mode::ConcernAlarm);
    assert_eq!(rig.hw.chirps(), 0);
    assert!(rig.sink.events.contains(&AppEvent::CardAccepted {
        mode: Mode::ConcernAlarm
    }));
}

// ── Clock wrap ────────────────────────────────────────────────

#[test]
fn timing_survives_clock_wraparound() {
    let mut rig = Rig::starting_at(u32::MAX - 1_000, SystemConfig::default());
    let cfg = rig.cfg();

    // The tap window straddles the wrap.
    rig.enter_concern();
    assert!(rig.hw.now < 10_000);

    assert!(rig
        .advance_until(Mode::Idle, cfg.concern_duration_ms + 100)
        .is_some());
    rig.advance(cfg.safety_interval_ms - 1_000);
    assert_eq!(rig.app.mode(), Mode::Idle);
    assert!(rig.advance_until(Mode::SafetyPending, 2_000).is_some());
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn forcing_sos_again_restarts_the_sequence() {
    let mut rig = Rig::new();
    let cfg = rig.cfg();

    rig.app
        .handle_command(AppCommand::ForceMode(Mode::SosAlarm), &mut rig.hw, &mut rig.sink)
        .unwrap();
    rig.advance(1_000);
    assert!(rig.app.sos_phase() > 0);

    rig.app
        .handle_command(AppCommand::ForceMode(Mode::SosAlarm), &mut rig.hw, &mut rig.sink)
        .unwrap();
    assert_eq!(rig.app.mode(), Mode::SosAlarm);
    assert_eq!(rig.app.sos_phase(), 0);

    let total = SOS_TOTAL_UNITS * cfg.sos_unit_ms;
    let elapsed = rig.advance_until(Mode::Idle, total + 500).unwrap();
    assert!(elapsed >= total);
    assert!(!rig.hw.light(LightChannel::Alert));
}

#[test]
fn config_update_applies_and_auto_saves() {
    let mut rig = Rig::new();
    let nvs = NvsAdapter::new().unwrap();
    let cfg = SystemConfig {
        safety_interval_ms: 60_000,
        ..SystemConfig::default()
    };

    rig.app
        .handle_command(AppCommand::UpdateConfig(cfg.clone()), &mut rig.hw, &mut rig.sink)
        .unwrap();
    assert!(rig.app.is_config_dirty());
    assert!(rig.sink.events.contains(&AppEvent::ConfigApplied));
    assert!(!rig.app.auto_save_if_needed(rig.hw.now + 1_000, &nvs));

    rig.advance(5_000);
    assert!(rig.app.auto_save_if_needed(rig.hw.now, &nvs));
    assert!(!rig.app.is_config_dirty());
    assert_eq!(nvs.load().unwrap(), cfg);

    // Past the default interval but inside the new one.
    rig.advance(30_000);
    assert_eq!(rig.app.mode(), Mode::Idle);
}

#[test]
fn invalid_config_command_rejected() {
    let mut rig = Rig::new();
    let bad = SystemConfig {
        confirmation_duration_ms: 0,
        ..SystemConfig::default()
    };
    assert!(rig
        .app
        .handle_command(AppCommand::UpdateConfig(bad), &mut rig.hw, &mut rig.sink)
        .is_err());
    assert!(!rig.app.is_config_dirty());
    assert!(!rig.sink.events.contains(&AppEvent::ConfigApplied));
}
