//! Card event gate.
//!
//! Turns the reader's raw "card present" signal into at most one accepted
//! event per cooldown window.  Inside the window the reader is not even
//! polled, which keeps a lingering card from being re-reported and keeps
//! bus traffic off the control loop.  No identity is read: presence alone
//! is the signal.

use log::debug;

use crate::app::ports::CardReaderPort;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardGate {
    /// Timestamp of the last accepted card, `None` until the first one.
    last_accept_ms: Option<u32>,
}

impl CardGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cooldown that followed the last accepted card is still
    /// running.
    pub fn cooling_down(&self, now_ms: u32, cooldown_ms: u32) -> bool {
        self.last_accept_ms
            .is_some_and(|t| now_ms.wrapping_sub(t) < cooldown_ms)
    }

    /// Poll the reader if the cooldown allows it.  On a read, records the
    /// acceptance, releases the card session, and returns `true`.
    pub fn poll(
        &mut self,
        reader: &mut impl CardReaderPort,
        now_ms: u32,
        cooldown_ms: u32,
    ) -> bool {
        if self.cooling_down(now_ms, cooldown_ms) {
            return false;
        }
        if !reader.poll_card_present() {
            return false;
        }
        self.last_accept_ms = Some(now_ms);
        reader.release_card();
        debug!("card: accepted at {now_ms}");
        true
    }
}
