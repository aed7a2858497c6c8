//! Fuzz target for detection JSON parsing.
//!
//! Arbitrary bytes go through the JSON loader, and anything that loads is
//! validated and inspected, which must not panic on any finite or
//! non-finite coordinates.

#![no_main]

use libfuzzer_sys::fuzz_target;
use stalgebra::model::io_json::from_json_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(mapping) = from_json_slice(data) {
        let _ = stalgebra::validation::validate_mapping(&mapping, &Default::default());
        let _ = stalgebra::inspect::inspect_mapping(&mapping, &Default::default());
    }
});
