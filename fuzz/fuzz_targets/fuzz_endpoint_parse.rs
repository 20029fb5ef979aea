#![no_main]

use dbconnect::Endpoint;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(endpoint) = Endpoint::parse(s) {
            let _ = endpoint.format();
            let _ = endpoint.to_string();
        }
    }
});
