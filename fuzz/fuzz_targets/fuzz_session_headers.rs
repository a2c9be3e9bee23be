//! Fuzz target: session guard over arbitrary `Cookie` and `Authorization`
//! header bytes.
//!
//! Authentication must never panic, whatever the header contents.

#![no_main]

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};
use libfuzzer_sys::fuzz_target;
use simplefit_gateway::{config::Secret, session::authenticate};

fuzz_target!(|data: (&[u8], &[u8])| {
    let (cookie, authorization) = data;
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_bytes(cookie) {
        headers.insert(COOKIE, v);
    }
    if let Ok(v) = HeaderValue::from_bytes(authorization) {
        headers.insert(AUTHORIZATION, v);
    }
    let _ = authenticate(&headers, &Secret::new("fuzz-secret"));
});
