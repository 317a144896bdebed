//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the button pin, both indicator LEDs, the buzzer, the card reader,
//! and the clock, exposing them through [`ClockPort`], [`InputPort`],
//! [`CardReaderPort`], and [`IndicatorPort`].  This is the only module in
//! the system that touches actual hardware.
//!
//! Every driver error stops here.  The ports are infallible, so each
//! failure is logged and replaced by the fail-safe reading:
//!
//! | Failure          | Reported to the domain            |
//! |------------------|-----------------------------------|
//! | button read      | released level ("not pressed")    |
//! | card poll / halt | no card (retried next cycle)      |
//! | light / tone     | nothing (rewritten on next change)|

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{
    CardReaderPort, ClockPort, IndicatorPort, InputPort, LightChannel, ToneDuration,
};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::card_reader::CardReader;
use crate::drivers::indicator::IndicatorLed;
use crate::error::{Error, InputError, Result};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<B, L, R, C> {
    button: B,
    /// Level the button pin idles at when not pressed.
    released_level: bool,
    alert: IndicatorLed<L>,
    confirm: IndicatorLed<L>,
    buzzer: Buzzer,
    reader: R,
    clock: C,
    faults: u32,
}

impl<B, L, R, C> HardwareAdapter<B, L, R, C>
where
    B: InputPin,
    L: OutputPin,
    R: CardReader,
    C: ClockPort,
{
    pub fn new(
        button: B,
        button_active_low: bool,
        alert: IndicatorLed<L>,
        confirm: IndicatorLed<L>,
        reader: R,
        clock: C,
    ) -> Self {
        Self {
            button,
            released_level: button_active_low,
            alert,
            confirm,
            buzzer: Buzzer::new(),
            reader,
            clock,
            faults: 0,
        }
    }

    /// Housekeeping between control cycles: retires expired chirps.
    pub fn service(&mut self) {
        let now = self.clock.now_ms();
        let res = self.buzzer.tick(now).map(|_| ()).map_err(Error::from);
        self.absorb(res);
    }

    /// Hardware errors absorbed since boot (wraps).
    pub fn fault_count(&self) -> u32 {
        self.faults
    }

    fn try_read_button(&mut self) -> Result<bool> {
        self.button
            .is_high()
            .map_err(|_| Error::from(InputError::GpioReadFailed))
    }

    fn try_poll_card(&mut self) -> Result<bool> {
        Ok(self.reader.card_present()?)
    }

    fn try_set_light(&mut self, channel: LightChannel, on: bool) -> Result<()> {
        let led = match channel {
            LightChannel::Alert => &mut self.alert,
            LightChannel::Confirm => &mut self.confirm,
        };
        Ok(led.set(on)?)
    }

    fn try_play_tone(&mut self, hz: u32, duration: ToneDuration) -> Result<()> {
        let now = self.clock.now_ms();
        let duration_ms = match duration {
            ToneDuration::Continuous => None,
            ToneDuration::For(ms) => Some(ms),
        };
        Ok(self.buzzer.play(hz, duration_ms, now)?)
    }

    /// Log and count a failure, keeping the success value if there is one.
    fn absorb<T>(&mut self, res: Result<T>) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                self.faults = self.faults.wrapping_add(1);
                warn!("hw: {}", e);
                None
            }
        }
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<B, L, R, C: ClockPort> ClockPort for HardwareAdapter<B, L, R, C> {
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<B, L, R, C> InputPort for HardwareAdapter<B, L, R, C>
where
    B: InputPin,
    L: OutputPin,
    R: CardReader,
    C: ClockPort,
{
    fn read_button_level(&mut self) -> bool {
        let res = self.try_read_button();
        self.absorb(res).unwrap_or(self.released_level)
    }
}

// ── CardReaderPort implementation ─────────────────────────────

impl<B, L, R, C> CardReaderPort for HardwareAdapter<B, L, R, C>
where
    B: InputPin,
    L: OutputPin,
    R: CardReader,
    C: ClockPort,
{
    fn poll_card_present(&mut self) -> bool {
        let res = self.try_poll_card();
        self.absorb(res).unwrap_or(false)
    }

    fn release_card(&mut self) {
        let res = self.reader.halt().map_err(Error::from);
        self.absorb(res);
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<B, L, R, C> IndicatorPort for HardwareAdapter<B, L, R, C>
where
    B: InputPin,
    L: OutputPin,
    R: CardReader,
    C: ClockPort,
{
    fn set_light(&mut self, channel: LightChannel, on: bool) {
        let res = self.try_set_light(channel, on);
        self.absorb(res);
    }

    fn play_tone(&mut self, frequency_hz: u32, duration: ToneDuration) {
        let res = self.try_play_tone(frequency_hz, duration);
        self.absorb(res);
    }

    fn stop_tone(&mut self) {
        let res = self.buzzer.stop().map_err(Error::from);
        self.absorb(res);
    }
}
