//! Indicator light driver.
//!
//! One discrete LED on a GPIO, through any `embedded-hal` output pin.
//! Polarity is fixed at construction so callers only ever say "lit" or
//! "dark".

use embedded_hal::digital::OutputPin;

use crate::error::OutputError;

pub struct IndicatorLed<P> {
    pin: P,
    active_high: bool,
    lit: bool,
}

impl<P: OutputPin> IndicatorLed<P> {
    pub fn new(pin: P, active_high: bool) -> Self {
        Self {
            pin,
            active_high,
            lit: false,
        }
    }

    pub fn set(&mut self, on: bool) -> Result<(), OutputError> {
        let high = on == self.active_high;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| OutputError::GpioWriteFailed)?;
        self.lit = on;
        Ok(())
    }

    /// Last level successfully written.
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
