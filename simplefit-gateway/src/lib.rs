//! Authenticating reverse proxy for the SimpleFit exercise API.
//!
//! Validates the browser's session token, re-signs its claims as a bearer
//! credential and relays exercise requests to the upstream API, passing the
//! upstream status and body back untouched.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod credential;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod session;
pub mod state;
pub mod upstream;
