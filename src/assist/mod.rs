//! Rate-limited external assistance.
//!
//! A single [`CooldownGate`](gate::CooldownGate) type guards both channels:
//! human help (operator console) and remote reasoning, instantiated with
//! different windows from config.

pub mod console;
pub mod gate;
pub mod remote;
