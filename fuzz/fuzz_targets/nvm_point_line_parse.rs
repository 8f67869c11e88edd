//! Fuzz target for single NVM point-line parsing.
//!
//! This fuzzer feeds arbitrary UTF-8 lines to the point-line parser,
//! exercising the measurement grouping without the surrounding header.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reconbridge::ir::io_nvm::fuzz_parse_point_line;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_parse_point_line(line);
});
