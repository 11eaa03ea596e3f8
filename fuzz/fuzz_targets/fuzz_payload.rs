#![no_main]

use libfuzzer_sys::fuzz_target;
use lineseek::server::protocol::{Payload, validate_payload};

fuzz_target!(|data: &[u8]| {
    // Validation must never panic, and a valid query is always trimmed and non-empty
    if let Payload::Valid(query) = validate_payload(data, 1024) {
        assert!(!query.is_empty());
        assert_eq!(query.trim(), query);
    }
});
