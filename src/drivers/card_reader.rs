//! Proximity-card reader drivers.
//!
//! The controller only needs presence: "a new card entered the field" and
//! "stop talking to that card".  [`CardReader`] is that contract at the
//! driver level, with errors still visible; the hardware adapter folds
//! errors into "no card" before they reach the domain.
//!
//! - [`Mfrc522Reader`]: the MFRC522 front end on SPI.  Presence is a REQA
//!   answered and a completed anticollision select; `halt` sends HLTA, so
//!   a card left lying on the badge stays silent until it is lifted and
//!   presented again.
//! - [`NoCardReader`]: boards built without a reader.

use embedded_hal::spi::SpiDevice;
use log::{debug, info};
use mfrc522::comm::blocking::spi::{DummyDelay, SpiInterface};
use mfrc522::{Initialized, Mfrc522};

use crate::error::CardError;

/// Presence-only card reader.
pub trait CardReader {
    /// `Ok(true)` once per card presentation until [`halt`](Self::halt).
    fn card_present(&mut self) -> Result<bool, CardError>;

    /// End the session with the current card.
    fn halt(&mut self) -> Result<(), CardError>;
}

// ── MFRC522 ───────────────────────────────────────────────────

pub struct Mfrc522Reader<SPI: SpiDevice> {
    device: Mfrc522<SpiInterface<SPI, DummyDelay>, Initialized>,
}

impl<SPI: SpiDevice> Mfrc522Reader<SPI> {
    /// Reset and configure the chip behind `spi`.
    pub fn new(spi: SPI) -> Result<Self, CardError> {
        let device = Mfrc522::new(SpiInterface::new(spi))
            .init()
            .map_err(|e| card_error(&e))?;
        let mut reader = Self { device };
        match reader.device.version() {
            Ok(v) => info!("MFRC522: ready, version 0x{v:02x}"),
            Err(e) => return Err(card_error(&e)),
        }
        Ok(reader)
    }
}

impl<SPI: SpiDevice> CardReader for Mfrc522Reader<SPI> {
    fn card_present(&mut self) -> Result<bool, CardError> {
        let atqa = match self.device.new_card_present() {
            Ok(atqa) => atqa,
            // No answer to REQA: empty field, or only halted cards.
            Err(mfrc522::Error::Timeout) => return Ok(false),
            Err(e) => return Err(card_error(&e)),
        };
        let uid = self.device.select(&atqa).map_err(|e| card_error(&e))?;
        debug!("card: uid {:02x?}", uid.as_bytes());
        Ok(true)
    }

    fn halt(&mut self) -> Result<(), CardError> {
        self.device.hlta().map_err(|e| card_error(&e))
    }
}

/// Collapse the chip's error set into what the adapter reports.
fn card_error<C>(e: &mfrc522::Error<C>) -> CardError {
    use mfrc522::Error;
    match e {
        Error::Timeout => CardError::Timeout,
        Error::Collision => CardError::Collision,
        Error::Crc | Error::Bcc | Error::Parity | Error::IncompleteFrame | Error::Protocol => {
            CardError::Corrupted
        }
        _ => CardError::Bus,
    }
}

// ── Absent reader ─────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct NoCardReader;

impl CardReader for NoCardReader {
    fn card_present(&mut self) -> Result<bool, CardError> {
        Ok(false)
    }

    fn halt(&mut self) -> Result<(), CardError> {
        Ok(())
    }
}
