//! LoneWatch firmware library.
//!
//! A single-loop safety controller: a pushbutton and a proximity-card
//! reader feed one state machine that drives two indicator lights and a
//! buzzer.  Exposes the pure-logic modules for integration testing; all
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod card;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod pins;
pub mod safety;
pub mod sos;
pub mod tap;

pub mod adapters;
pub mod drivers;
