//! Fuzz target: identifier derivation from arbitrary exercise names.
//!
//! Derived identifiers must stay inside `[a-z0-9-]`, never start or end with
//! a hyphen, and be stable when derived again.

#![no_main]

use libfuzzer_sys::fuzz_target;
use simplefit_core::ExerciseId;

fuzz_target!(|name: &str| {
    let id = ExerciseId::from_name(name);
    let s = id.as_str();
    assert!(s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'));
    assert!(!s.starts_with('-') && !s.ends_with('-'));
    assert_eq!(ExerciseId::from_name(s), id);
});
