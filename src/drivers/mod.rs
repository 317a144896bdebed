//! Peripheral drivers and one-shot hardware initialisation.

pub mod button;
pub mod buzzer;
pub mod card_reader;
pub mod hw_init;
pub mod indicator;
pub mod watchdog;
