//! Fuzz target for NVM_V3 bundle parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the NVM reader,
//! checking for panics, unbounded allocation, or hangs.
//!
//! Run with:
//!   cargo +nightly fuzz run nvm_parse
//!
//! Or with a corpus:
//!   cargo +nightly fuzz run nvm_parse fuzz/corpus/nvm_parse/

#![no_main]

use libfuzzer_sys::fuzz_target;
use reconbridge::ir::io_nvm::from_nvm_slice;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid OOM on very large inputs.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    // Errors are expected; only panics and hangs are findings.
    let _ = from_nvm_slice(data);
});
