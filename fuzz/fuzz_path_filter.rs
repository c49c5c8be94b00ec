//! Fuzz target for the exclusion path filter.
//!
//! Run with: cargo +nightly fuzz run fuzz_path_filter
//!
//! The input is split at its first NUL byte: the head is a newline-separated
//! pattern list, the tail is the path to test.

#![no_main]

use helmgen_core::PathFilter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (patterns, path) = text.split_once('\0').unwrap_or((text, ""));
    let patterns: Vec<&str> = patterns.lines().filter(|p| !p.is_empty()).collect();

    let Ok(filter) = PathFilter::new(patterns.iter().copied()) else {
        return;
    };
    let excluded = filter.is_excluded(path);

    // A literal prefix always excludes.
    if patterns.iter().any(|p| path.starts_with(p)) {
        assert!(excluded);
    }
});
