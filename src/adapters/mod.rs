//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                         |
//! |------------|----------------|-------------------------------------|
//! | `hardware` | ClockPort      | monotonic clock                     |
//! |            | InputPort      | button GPIO                         |
//! |            | CardReaderPort | card reader                         |
//! |            | IndicatorPort  | LED GPIOs, LEDC buzzer              |
//! | `log_sink` | EventSink      | Serial log output                   |
//! | `nvs`      | ConfigPort     | NVS / in-memory store               |
//! | `time`     | ClockPort      | ESP32 system timer                  |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
