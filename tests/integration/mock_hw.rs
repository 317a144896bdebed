//! Mock hardware adapter for integration tests.
//!
//! Records every indicator call so tests can assert on the full output
//! history without touching real GPIO/PWM registers.  The clock, the
//! button level, and the card field are plain fields the test drives.

use lonewatch::app::events::AppEvent;
use lonewatch::app::ports::{
    CardReaderPort, ClockPort, EventSink, IndicatorPort, InputPort, LightChannel, ToneDuration,
};

// ── Indicator call record ─────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorCall {
    Light { channel: LightChannel, on: bool },
    Tone { hz: u32, duration: ToneDuration },
    StopTone,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub now: u32,
    /// Raw button pin level.  Active-low wiring: `true` = released.
    pub level: bool,
    /// A card is sitting in the reader field.
    pub card_in_field: bool,
    pub card_polls: u32,
    pub card_releases: u32,
    pub calls: Vec<IndicatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(now: u32) -> Self {
        Self {
            now,
            level: true,
            card_in_field: false,
            card_polls: 0,
            card_releases: 0,
            calls: Vec::new(),
        }
    }

    /// Last level written to a light, `false` if never written.
    pub fn light(&self, channel: LightChannel) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match *c {
                IndicatorCall::Light { channel: ch, on } if ch == channel => Some(on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Frequency of the continuous tone currently sounding, if any.
    pub fn continuous_tone(&self) -> Option<u32> {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match *c {
                IndicatorCall::Tone {
                    hz,
                    duration: ToneDuration::Continuous,
                } => Some(Some(hz)),
                IndicatorCall::StopTone => Some(None),
                _ => None,
            })
            .flatten()
    }

    /// Number of times a light was switched on.
    pub fn light_on_count(&self, channel: LightChannel) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == IndicatorCall::Light { channel, on: true })
            .count()
    }

    /// Timed (self-terminating) tones requested so far.
    pub fn chirps(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    IndicatorCall::Tone {
                        duration: ToneDuration::For(_),
                        ..
                    }
                )
            })
            .count()
    }
}

impl ClockPort for MockHardware {
    fn now_ms(&self) -> u32 {
        self.now
    }
}

impl InputPort for MockHardware {
    fn read_button_level(&mut self) -> bool {
        self.level
    }
}

impl CardReaderPort for MockHardware {
    fn poll_card_present(&mut self) -> bool {
        self.card_polls += 1;
        self.card_in_field
    }

    fn release_card(&mut self) {
        self.card_releases += 1;
    }
}

impl IndicatorPort for MockHardware {
    fn set_light(&mut self, channel: LightChannel, on: bool) {
        self.calls.push(IndicatorCall::Light { channel, on });
    }

    fn play_tone(&mut self, frequency_hz: u32, duration: ToneDuration) {
        self.calls.push(IndicatorCall::Tone {
            hz: frequency_hz,
            duration,
        });
    }

    fn stop_tone(&mut self) {
        self.calls.push(IndicatorCall::StopTone);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
