//! Piezo buzzer driver.
//!
//! Plays one tone at a time on the LEDC channel set up by
//! [`hw_init`](crate::drivers::hw_init).  A tone either runs until
//! stopped or carries its own duration; timed tones are retired by
//! [`Buzzer::tick`], so nothing ever blocks waiting for a chirp to end.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: retunes and gates LEDC via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::error::OutputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerState {
    Silent,
    Continuous { hz: u32 },
    Timed { hz: u32, started_ms: u32, duration_ms: u32 },
}

pub struct Buzzer {
    state: BuzzerState,
}

impl Default for Buzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buzzer {
    pub fn new() -> Self {
        Self {
            state: BuzzerState::Silent,
        }
    }

    /// Start a tone, replacing whatever is sounding.  `duration_ms = None`
    /// sounds until [`stop`](Self::stop).
    pub fn play(
        &mut self,
        hz: u32,
        duration_ms: Option<u32>,
        now_ms: u32,
    ) -> Result<(), OutputError> {
        hw_init::ledc_tone(hz)?;
        self.state = match duration_ms {
            None => BuzzerState::Continuous { hz },
            Some(duration_ms) => BuzzerState::Timed {
                hz,
                started_ms: now_ms,
                duration_ms,
            },
        };
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), OutputError> {
        // Record silence first: a failed write is retried by the next stop.
        self.state = BuzzerState::Silent;
        hw_init::ledc_silence()
    }

    /// Retire an expired timed tone.  Returns `true` if one just ended.
    pub fn tick(&mut self, now_ms: u32) -> Result<bool, OutputError> {
        if let BuzzerState::Timed {
            started_ms,
            duration_ms,
            ..
        } = self.state
        {
            if now_ms.wrapping_sub(started_ms) >= duration_ms {
                self.stop()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn state(&self) -> BuzzerState {
        self.state
    }

    pub fn is_sounding(&self) -> bool {
        self.state != BuzzerState::Silent
    }
}
