//! Fuzz target for engine.json parsing and validation.

#![no_main]

use bn_config::{validate_engine, EngineConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<EngineConfig>(data) {
        let _ = validate_engine(&config);
    }
});
