//! Fuzz target for PMVS patch + PLY parsing.
//!
//! The input is split at the first NUL byte: the text before it is the
//! patch file, the text after it is the PLY file.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reconbridge::ir::io_pmvs::fuzz_parse_pmvs;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_parse_pmvs(input);
});
