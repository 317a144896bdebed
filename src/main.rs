//! LoneWatch Firmware — Main Entry Point
//!
//! Hexagonal architecture around one cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter             LogEventSink      NvsAdapter      │
//! │  (Clock+Input+Card+Indicator) (EventSink)      (ConfigPort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  debounce · taps · card gate · safety timer · FSM      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Watchdog (fed every cycle)                                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{OutputPin as _, Pin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::config::Config as SpiConfig;
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use lonewatch::adapters::hardware::HardwareAdapter;
use lonewatch::adapters::log_sink::LogEventSink;
use lonewatch::adapters::nvs::NvsAdapter;
use lonewatch::adapters::time::MonotonicClock;
use lonewatch::app::ports::{ClockPort, ConfigPort};
use lonewatch::app::service::AppService;
use lonewatch::config::SystemConfig;
use lonewatch::drivers::card_reader::Mfrc522Reader;
use lonewatch::drivers::hw_init;
use lonewatch::drivers::indicator::IndicatorLed;
use lonewatch::drivers::watchdog::Watchdog;
use lonewatch::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LoneWatch v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new().map_err(|e| anyhow::anyhow!("NVS init failed: {e}"))?;
    let config = nvs.load().unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        SystemConfig::default()
    });
    if let Some(json) = config.to_json() {
        info!("Config: {}", json);
    }

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    let peripherals = Peripherals::take()?;
    let io = &peripherals.pins;
    wired("button", io.gpio16.pin(), pins::BUTTON_GPIO)?;
    wired("alert LED", io.gpio11.pin(), pins::ALERT_LED_GPIO)?;
    wired("confirm LED", io.gpio12.pin(), pins::CONFIRM_LED_GPIO)?;
    wired("buzzer", io.gpio1.pin(), pins::BUZZER_GPIO)?;
    wired("card SCK", io.gpio36.pin(), pins::CARD_SPI_SCK_GPIO)?;
    wired("card MOSI", io.gpio35.pin(), pins::CARD_SPI_MOSI_GPIO)?;
    wired("card MISO", io.gpio37.pin(), pins::CARD_SPI_MISO_GPIO)?;
    wired("card CS", io.gpio10.pin(), pins::CARD_SPI_CS_GPIO)?;

    let mut button = PinDriver::input(peripherals.pins.gpio16)?;
    button.set_pull(if config.button_active_low {
        Pull::Up
    } else {
        Pull::Down
    })?;

    let alert = IndicatorLed::new(
        PinDriver::output(peripherals.pins.gpio11.downgrade_output())?,
        true,
    );
    let confirm = IndicatorLed::new(
        PinDriver::output(peripherals.pins.gpio12.downgrade_output())?,
        true,
    );

    let spi = SpiDriver::new(
        peripherals.spi2,
        peripherals.pins.gpio36,
        peripherals.pins.gpio35,
        Some(peripherals.pins.gpio37),
        &SpiDriverConfig::new(),
    )?;
    let card_spi = SpiDeviceDriver::new(
        spi,
        Some(peripherals.pins.gpio10),
        &SpiConfig::new().baudrate(Hertz(pins::CARD_SPI_BAUD_HZ)),
    )?;
    let reader = Mfrc522Reader::new(card_spi)
        .map_err(|e| anyhow::anyhow!("card reader init failed: {e}"))?;

    let mut hw = HardwareAdapter::new(
        button,
        config.button_active_low,
        alert,
        confirm,
        reader,
        MonotonicClock::new(),
    );
    let mut watchdog = Watchdog::default();
    let mut log_sink = LogEventSink::new();

    // ── 4. Application core ───────────────────────────────────
    let mut app = AppService::new(config);
    app.start(&mut hw, &mut log_sink);

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        app.tick(&mut hw, &mut log_sink);
        hw.service();
        app.auto_save_if_needed(hw.now_ms(), &nvs);
        watchdog.feed();

        FreeRtos::delay_ms(app.config().control_loop_interval_ms);
    }
}

/// Fail boot if a typed pin does not match the board table.
fn wired(what: &str, actual: i32, expected: i32) -> Result<()> {
    anyhow::ensure!(
        actual == expected,
        "{what} on GPIO{actual}, board table says GPIO{expected}"
    );
    Ok(())
}
