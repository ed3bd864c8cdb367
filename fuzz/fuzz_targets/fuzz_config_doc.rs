//! Fuzz target: `BankConfig::from_json`
//!
//! Drives arbitrary bytes through the JSON description parser and
//! asserts that parsing never panics, that validation is total over
//! anything the parser accepts, and that an accepted description
//! survives the binary carrier round-trip with its shape intact.
//!
//! cargo fuzz run fuzz_config_doc

#![no_main]

use libfuzzer_sys::fuzz_target;
use pwm_leds::config::BankConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = BankConfig::from_json(doc) else {
        return;
    };

    let _ = config.validate();

    let bytes = postcard::to_allocvec(&config).expect("postcard encode");
    let back = BankConfig::from_postcard(&bytes).expect("postcard decode");
    assert_eq!(back.leds.len(), config.leds.len());
});
