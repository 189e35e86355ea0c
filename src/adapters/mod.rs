//! Hardware adapters behind the port traits.
//!
//! `sim` is always compiled and carries the test doubles; `rpi` holds the
//! rppal-backed implementations and only exists with the `rpi` feature.

#[cfg(feature = "rpi")]
pub mod rpi;
pub mod sim;
