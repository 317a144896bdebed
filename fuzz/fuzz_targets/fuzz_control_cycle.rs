//! Fuzz target: control cycle under arbitrary input timelines
//!
//! Each input byte is one cycle: the low bits pick the time step, bit 6 is
//! the raw button level, bit 7 puts a card in the field.  Verifies:
//! - No panics, including across the `u32` clock wrap
//! - No continuous tone is requested outside the alarm modes
//! - The SOS cursor is only live inside `SosAlarm`
//!
//! cargo fuzz run fuzz_control_cycle

#![no_main]

use libfuzzer_sys::fuzz_target;
use lonewatch::app::events::AppEvent;
use lonewatch::app::ports::{
    CardReaderPort, ClockPort, EventSink, IndicatorPort, InputPort, LightChannel, ToneDuration,
};
use lonewatch::app::service::AppService;
use lonewatch::config::SystemConfig;
use lonewatch::fsm::context::ToneCommand;
use lonewatch::fsm::Mode;
use lonewatch::sos::SOS_PROGRAM;

struct Rig {
    now: u32,
    level: bool,
    card: bool,
}

impl ClockPort for Rig {
    fn now_ms(&self) -> u32 {
        self.now
    }
}

impl InputPort for Rig {
    fn read_button_level(&mut self) -> bool {
        self.level
    }
}

impl CardReaderPort for Rig {
    fn poll_card_present(&mut self) -> bool {
        self.card
    }
    fn release_card(&mut self) {
        self.card = false;
    }
}

impl IndicatorPort for Rig {
    fn set_light(&mut self, _: LightChannel, _: bool) {}
    fn play_tone(&mut self, _: u32, _: ToneDuration) {}
    fn stop_tone(&mut self) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&seed, steps)) = data.split_first() else {
        return;
    };

    // Start close to the wrap so long inputs cross it.
    let mut rig = Rig {
        now: u32::MAX - u32::from(seed) * 1_000,
        level: true,
        card: false,
    };
    let mut app = AppService::new(SystemConfig::default());
    app.start(&mut rig, &mut Discard);

    for &b in steps {
        rig.now = rig.now.wrapping_add(u32::from(b & 0x3F) * 25);
        rig.level = b & 0x40 == 0;
        if b & 0x80 != 0 {
            rig.card = true;
        }
        app.tick(&mut rig, &mut Discard);

        let out = app.outputs();
        if !app.mode().is_alarm() {
            assert_eq!(out.tone, ToneCommand::Silent, "tone outside alarm in {:?}", app.mode());
        }
        if app.mode() != Mode::SosAlarm {
            assert!(app.sos_phase() >= SOS_PROGRAM.len(), "SOS cursor live in {:?}", app.mode());
        }
    }
});
