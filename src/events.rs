//! Per-cycle input events.
//!
//! Events are produced by the filtering stage of each control cycle:
//! - Debounced button releases
//! - Card reads that passed the cooldown gate
//! - Tap windows that closed and were classified
//! - The safety timer falling due
//!
//! They are collected into a [`CycleEvents`] set owned by the controller
//! state and consumed by the arbiter in the same cycle; nothing survives
//! to the next one.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Button      │────▶│              │     │              │
//! │ Card gate   │────▶│  CycleEvents │────▶│   Arbiter    │
//! │ Tap window  │────▶│  (fixed cap) │     │  (one mode)  │
//! │ Safety timer│────▶│              │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use heapless::Vec;
use log::warn;

use crate::tap::TapPattern;

/// One distinct event per source, so four slots always suffice.
const CYCLE_EVENT_CAP: usize = 4;

/// Raw input events raised during one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    /// The button was released after a debounced press.
    TapReleased,
    /// A card passed the cooldown gate.
    CardPresented,
    /// A tap window closed with an alarm-worthy count.
    TapPattern(TapPattern),
    /// Inactivity exceeded the safety interval.
    CheckInDue,
}

/// Fixed-capacity set of the events raised this cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleEvents {
    raised: Vec<CycleEvent, CYCLE_EVENT_CAP>,
}

impl CycleEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous cycle's events.
    pub fn clear(&mut self) {
        self.raised.clear();
    }

    /// Raise an event.  Duplicates are ignored.
    pub fn raise(&mut self, event: CycleEvent) {
        if self.raised.contains(&event) {
            return;
        }
        if self.raised.push(event).is_err() {
            warn!("cycle event dropped (set full): {:?}", event);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CycleEvent> {
        self.raised.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.raised.is_empty()
    }

    pub fn len(&self) -> usize {
        self.raised.len()
    }

    pub fn contains(&self, event: CycleEvent) -> bool {
        self.raised.contains(&event)
    }
}
