//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => info!("START | initial_mode={}", mode),
            AppEvent::ModeChanged { from, to } => info!("MODE  | {} -> {}", from, to),
            AppEvent::TapCounted { count } => info!("TAP   | count={}", count),
            AppEvent::TapPattern(pattern) => info!("TAP   | window closed: {:?}", pattern),
            AppEvent::CardAccepted { mode } => info!("CARD  | accepted in {}", mode),
            AppEvent::ConfigApplied => info!("CONF  | runtime config applied"),
        }
    }
}
