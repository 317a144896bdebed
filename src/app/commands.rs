//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (serial console,
//! bench tooling) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

use crate::config::SystemConfig;
use crate::fsm::Mode;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Force the controller into a mode (debug / testing only).  Forcing
    /// the current mode re-runs its entry action.
    ForceMode(Mode),

    /// Validate, apply, and persist a new configuration.
    UpdateConfig(SystemConfig),
}
