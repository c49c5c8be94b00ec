//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text to `AppConfig::parse()`, covering both TOML decoding
//! and the validation rules for separators, patterns and sampling ranges.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = helmgen_config::AppConfig::parse(s) {
            // Whatever parsed must also pass validation on its own.
            assert!(config.validate().is_ok());
        }
    }
});
