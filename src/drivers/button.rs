//! Debounced release detector for the check-in button.
//!
//! ## Hardware
//!
//! Momentary switch, polarity configurable (the reference board is
//! active-low with the internal pull-up).  The main loop samples the raw
//! level once per control cycle and feeds it to [`ButtonDriver::tick`].
//!
//! ## Edge detection
//!
//! Only releases matter downstream.  A release is reported once the pin
//! has held its released level continuously for the settle delay after
//! a press.  A bounce back to the pressed level while settling cancels the
//! pending release, so one physical press yields at most one event.
//!
//! | State      | Raw pressed            | Raw released                    |
//! |-----------|------------------------|---------------------------------|
//! | Released  | → Pressed              | stay                            |
//! | Pressed   | stay                   | → Settling { since: now }       |
//! | Settling  | → Pressed (bounce)     | held >= settle → `Release`      |
//!
//! A button held down forever simply stays in `Pressed`; no event, no
//! timeout.

/// Button events emitted after debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Release,
}

/// Internal edge state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeState {
    Released,
    Pressed,
    Settling { since_ms: u32 },
}

pub struct ButtonDriver {
    active_low: bool,
    settle_ms: u32,
    state: EdgeState,
}

impl ButtonDriver {
    pub fn new(active_low: bool, settle_ms: u32) -> Self {
        Self {
            active_low,
            settle_ms,
            state: EdgeState::Released,
        }
    }

    /// Update the settle delay (config reload).  Takes effect on the next
    /// release.
    pub fn set_settle_ms(&mut self, settle_ms: u32) {
        self.settle_ms = settle_ms;
    }

    /// Whether the last sample left the button held down.
    pub fn is_held(&self) -> bool {
        self.state == EdgeState::Pressed
    }

    /// Call from the main loop at each control cycle.
    /// `raw_level` is the pin level as read; `now_ms` the cycle timestamp.
    pub fn tick(&mut self, raw_level: bool, now_ms: u32) -> Option<ButtonEvent> {
        let pressed = raw_level != self.active_low;

        match self.state {
            EdgeState::Released => {
                if pressed {
                    self.state = EdgeState::Pressed;
                }
                None
            }

            EdgeState::Pressed => {
                if !pressed {
                    self.state = EdgeState::Settling { since_ms: now_ms };
                }
                None
            }

            EdgeState::Settling { since_ms } => {
                if pressed {
                    self.state = EdgeState::Pressed;
                    return None;
                }
                if now_ms.wrapping_sub(since_ms) >= self.settle_ms {
                    self.state = EdgeState::Released;
                    return Some(ButtonEvent::Release);
                }
                None
            }
        }
    }
}
