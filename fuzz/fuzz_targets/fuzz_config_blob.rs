//! Fuzz target: NVS config blob decoding
//!
//! Feeds arbitrary bytes to `SystemConfig::from_blob` and verifies:
//! - No panics on truncated, oversized, or foreign data
//! - Anything that decodes also passes `validate`
//! - Accepted configs re-encode to a blob that decodes to the same value
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use lonewatch::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = SystemConfig::from_blob(data) else {
        return;
    };

    assert!(cfg.validate().is_ok(), "from_blob accepted an invalid config");

    let blob = cfg.to_blob().expect("valid config must encode");
    let again = SystemConfig::from_blob(&blob).expect("re-encoded blob must decode");
    assert_eq!(cfg, again);
});
