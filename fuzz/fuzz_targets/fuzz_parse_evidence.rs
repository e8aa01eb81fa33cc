//! Fuzz target for evidence strings such as `a=true,c=false`.

#![no_main]

use bn_core::evidence::Evidence;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(evidence) = Evidence::parse(data) {
        // Display must produce something that parses back to the same set.
        let again = Evidence::parse(&evidence.to_string()).expect("display output parses");
        assert_eq!(evidence, again);
    }
});
