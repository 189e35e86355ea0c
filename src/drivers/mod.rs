//! Hardware drivers: the components that own physical actuator state.
//!
//! Each driver is generic over `embedded-hal` pin traits (plus the crate's
//! own ports for interrupts and PWM), so the same logic runs against rppal
//! on the rig and against the sim adapters on a development host.

pub mod feeder;
pub mod lever;
pub mod stepper;
pub mod tone;
