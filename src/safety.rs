//! Safety (dead-man) timer.
//!
//! Tracks the last moment the wearer showed signs of life: a tap, a card,
//! or the end of a confirmation or alarm.  Once the inactivity exceeds the
//! safety interval the timer reports a check-in as due; the state machine
//! turns that into the `SafetyPending` prompt while idle.
//!
//! ## Lifecycle
//!
//! 1. Boot arms the clock at the first cycle timestamp.
//! 2. Any qualifying activity calls [`SafetyTimer::rearm`].
//! 3. Each cycle the service asks [`SafetyTimer::check_in_due`].
//! 4. A due check-in stays due until something rearms the clock, so the
//!    prompt cannot be missed by a mode that was busy when it fell due.

use log::debug;

/// Activity clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyTimer {
    last_activity_ms: u32,
}

impl SafetyTimer {
    pub fn new(now_ms: u32) -> Self {
        Self {
            last_activity_ms: now_ms,
        }
    }

    /// Record activity at `now_ms`.
    pub fn rearm(&mut self, now_ms: u32) {
        debug!("safety: activity clock rearmed at {now_ms}");
        self.last_activity_ms = now_ms;
    }

    /// Milliseconds since the last recorded activity.
    pub fn idle_for(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_activity_ms)
    }

    /// Whether inactivity has exceeded `interval_ms`.
    pub fn check_in_due(&self, now_ms: u32, interval_ms: u32) -> bool {
        self.idle_for(now_ms) > interval_ms
    }

    pub fn last_activity_ms(&self) -> u32 {
        self.last_activity_ms
    }
}
