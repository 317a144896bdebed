//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the controller against
//! mock adapters.  All tests run on the host (x86_64) with no real
//! hardware required.

#![cfg(not(target_os = "espidf"))]

mod app_service_tests;
mod mock_hw;
