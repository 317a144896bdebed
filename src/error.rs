//! Unified error types for the LoneWatch firmware.
//!
//! A single `Error` enum that every hardware-facing subsystem converts into.
//! The control cycle itself never propagates these: adapters log them and
//! fall back to a fail-safe reading ("not pressed", "no card") at the port
//! boundary.  All variants are `Copy` so they move through the adapters
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible hardware operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The button input could not be sampled.
    Input(InputError),
    /// An indicator light or the buzzer could not be driven.
    Output(OutputError),
    /// The card reader failed to answer a presence poll.
    CardReader(CardError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::CardReader(e) => write!(f, "card reader: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// GPIO read returned an error.
    GpioReadFailed,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// Tone frequency or duty write failed.
    PwmWriteFailed,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
        }
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Card reader errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardError {
    /// The reader did not respond within its bus timeout.
    Timeout,
    /// A frame arrived but failed its integrity check.
    Corrupted,
    /// More than one card answered and the reader could not settle on one.
    Collision,
    /// SPI transfer failed or the chip reported an internal fault.
    Bus,
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Corrupted => write!(f, "corrupted frame"),
            Self::Collision => write!(f, "card collision"),
            Self::Bus => write!(f, "reader bus fault"),
        }
    }
}

impl From<CardError> for Error {
    fn from(e: CardError) -> Self {
        Self::CardReader(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_by_subsystem() {
        let e: Error = CardError::Collision.into();
        assert_eq!(e.to_string(), "card reader: card collision");
        let e: Error = OutputError::PwmWriteFailed.into();
        assert_eq!(e.to_string(), "output: PWM write failed");
    }
}
