//! Fuzz target for detection CSV parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use stalgebra::model::io_csv::from_csv_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(mapping) = from_csv_slice(data) {
        let _ = mapping.coalesce(|a, b| a.bounds.t.hi >= b.bounds.t.lo, stalgebra::merge::first_payload);
    }
});
