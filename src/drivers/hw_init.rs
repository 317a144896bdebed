//! One-shot hardware peripheral initialization.
//!
//! The lights and the button go through `esp-idf-hal` pin drivers; the
//! buzzer needs a variable-frequency square wave, which is configured here
//! on LEDC timer 0 / channel 0 using raw ESP-IDF sys calls.  Called once
//! from `main()` before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::OutputError;
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcTimerFailed(i32),
    LedcChannelFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcTimerFailed(rc) => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::LedcChannelFailed(rc) => write!(f, "LEDC channel config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

/// 8-bit duty at 50 %: the loudest square wave a piezo gets from LEDC.
const TONE_DUTY: u32 = 128;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe { init_buzzer_ledc()? };
    info!("hw_init: buzzer LEDC configured (timer0/ch0, GPIO{})", pins::BUZZER_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── LEDC tone channel ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_buzzer_ledc() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::BUZZER_IDLE_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcTimerFailed(ret));
    }

    // Start silent: duty 0.
    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: ledc_channel_t_LEDC_CHANNEL_0,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: pins::BUZZER_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcChannelFailed(ret));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
fn ledc_duty(duty: u32) -> Result<(), OutputError> {
    // SAFETY: the channel was configured in init_buzzer_ledc(); only the
    // main loop writes the duty register.
    unsafe {
        if ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0, duty)
            != ESP_OK as i32
        {
            return Err(OutputError::PwmWriteFailed);
        }
        if ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_channel_t_LEDC_CHANNEL_0)
            != ESP_OK as i32
        {
            return Err(OutputError::PwmWriteFailed);
        }
    }
    Ok(())
}

/// Retune the buzzer timer to `hz` and open the channel.
#[cfg(target_os = "espidf")]
pub fn ledc_tone(hz: u32) -> Result<(), OutputError> {
    // SAFETY: timer 0 was configured in init_buzzer_ledc().
    let ret = unsafe {
        ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_timer_t_LEDC_TIMER_0, hz)
    };
    if ret != ESP_OK as i32 {
        return Err(OutputError::PwmWriteFailed);
    }
    ledc_duty(TONE_DUTY)
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_tone(hz: u32) -> Result<(), OutputError> {
    log::trace!("hw_init(sim): tone {} Hz at duty {}", hz, TONE_DUTY);
    Ok(())
}

/// Close the buzzer channel.
#[cfg(target_os = "espidf")]
pub fn ledc_silence() -> Result<(), OutputError> {
    ledc_duty(0)
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_silence() -> Result<(), OutputError> {
    Ok(())
}
