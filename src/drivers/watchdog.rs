//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the control loop stops feeding it: a hung loop
//! must never leave a check-in prompt or an alarm frozen on the outputs.
//! The main loop calls [`Watchdog::feed`] once per cycle.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

/// Default stall timeout.  Generous next to a 10 ms cycle, short enough
/// that a wedged loop recovers before the next safety interval.
pub const DEFAULT_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    subscribed: bool,
    feeds: u32,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        let subscribed = {
            // SAFETY: TWDT calls from the main task during boot.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK as i32 {
                    warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
                }
                esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK as i32
            }
        };

        #[cfg(not(target_os = "espidf"))]
        let subscribed = true;

        if subscribed {
            info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
        } else {
            warn!("Watchdog: failed to subscribe, loop stalls will go unnoticed");
        }

        Self {
            subscribed,
            feeds: 0,
        }
    }

    /// Feed the watchdog.
    pub fn feed(&mut self) {
        if !self.subscribed {
            return;
        }
        #[cfg(target_os = "espidf")]
        // SAFETY: resets the TWDT entry of the subscribed calling task.
        unsafe {
            esp_task_wdt_reset();
        }
        self.feeds = self.feeds.wrapping_add(1);
    }

    /// Feeds since construction (wraps).
    pub fn feeds(&self) -> u32 {
        self.feeds
    }
}
