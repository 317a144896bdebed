//! GPIO / peripheral pin assignments for the LoneWatch board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  `main` picks the matching typed pins from
//! `esp-idf-hal` and refuses to boot if any of them disagrees with this
//! table.

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button: taps, check-ins, distress patterns.
pub const BUTTON_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Indicator lights (active-high through 330 Ω)
// ---------------------------------------------------------------------------

/// Red: check-in prompt, alarms, SOS marks.
pub const ALERT_LED_GPIO: i32 = 11;
/// Green: safety or attendance confirmed.
pub const CONFIRM_LED_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Piezo buzzer (LEDC timer 0 / channel 0)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 1;
/// Timer frequency while silent; retuned per tone.
pub const BUZZER_IDLE_FREQ_HZ: u32 = 2_000;

// ---------------------------------------------------------------------------
// Card reader (MFRC522 on SPI2, mode 0)
// ---------------------------------------------------------------------------

/// SPI clock rate for the reader.
pub const CARD_SPI_BAUD_HZ: u32 = 1_000_000;
pub const CARD_SPI_SCK_GPIO: i32 = 36;
pub const CARD_SPI_MOSI_GPIO: i32 = 35;
pub const CARD_SPI_MISO_GPIO: i32 = 37;
pub const CARD_SPI_CS_GPIO: i32 = 10;
