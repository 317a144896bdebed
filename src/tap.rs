//! Tap pattern recognizer.
//!
//! Counts debounced releases that fall inside a rolling window and, once
//! the window has elapsed since the last release, classifies the count:
//!
//! | Count | Outcome                |
//! |-------|------------------------|
//! | 2     | [`TapPattern::Concern`]  |
//! | 3     | [`TapPattern::Distress`] |
//! | other | [`TapPattern::Ignored`]  |
//!
//! Counts of 1 and 4+ never raise an alarm.  A single tap is the normal
//! check-in gesture and four or more is treated as fumbling.
//!
//! The recognizer itself is mode-agnostic; the service decides when a
//! release counts and when a closed window may raise an alarm.

/// Result of classifying a closed tap window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapPattern {
    /// Two taps: summon attention.
    Concern,
    /// Three taps: full SOS.
    Distress,
    /// Any other count: cleared without an alarm.
    Ignored(u8),
}

impl TapPattern {
    /// Whether this outcome should start an alarm.
    pub fn is_alarm(self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

/// Tap accumulator: count plus the timestamp of the last counted release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapRecognizer {
    count: u8,
    last_release_ms: u32,
}

impl TapRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Taps accumulated in the open window (0 when none is open).
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Count a release.  A release arriving after the window closed starts
    /// a fresh pattern.  Returns the updated count.
    pub fn record_release(&mut self, now_ms: u32, window_ms: u32) -> u8 {
        if self.count == 0 || now_ms.wrapping_sub(self.last_release_ms) > window_ms {
            self.count = 1;
        } else {
            self.count = self.count.saturating_add(1);
        }
        self.last_release_ms = now_ms;
        self.count
    }

    /// Whether a pattern is pending and its window has closed.
    pub fn window_closed(&self, now_ms: u32, window_ms: u32) -> bool {
        self.count > 0 && now_ms.wrapping_sub(self.last_release_ms) > window_ms
    }

    /// Classify and clear once the window has closed.  Returns `None`
    /// while the window is still open or nothing is pending.
    pub fn classify(&mut self, now_ms: u32, window_ms: u32) -> Option<TapPattern> {
        if !self.window_closed(now_ms, window_ms) {
            return None;
        }
        let pattern = match self.count {
            2 => TapPattern::Concern,
            3 => TapPattern::Distress,
            n => TapPattern::Ignored(n),
        };
        self.clear();
        Some(pattern)
    }

    /// Drop any pending pattern.
    pub fn clear(&mut self) {
        self.count = 0;
    }
}
