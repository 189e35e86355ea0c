//! Cagerig habitat controller library.
//!
//! Exposes the drivers, assistance gates, and the controller's tool
//! surface for integration testing and embedding. Everything that needs
//! a Raspberry Pi is confined to `adapters::rpi` behind the `rpi`
//! feature; the rest of the crate compiles and tests on any host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod assist;
pub mod config;
pub mod controller;
pub mod drivers;
pub mod error;
pub mod mailbox;
pub mod pins;
pub mod ports;
