//! Fuzz target for BIF network parsing.
//!
//! Anything that parses is also sorted and, when small enough, enumerated,
//! so the whole pipeline is checked for panics on arbitrary networks.

#![no_main]

use bn_config::CyclePolicy;
use bn_core::bif::parse_bif;
use bn_core::evidence::Evidence;
use bn_core::graph::prepare;
use bn_core::inference::{infer, InferenceOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(network) = parse_bif(data) else {
        return;
    };
    let Ok(sorted) = prepare(&network, CyclePolicy::Warn) else {
        return;
    };
    let options = InferenceOptions {
        max_joint_states: 4096,
        ..InferenceOptions::default()
    };
    let _ = infer(&sorted, &Evidence::new(), &options);
});
