//! Unified error types for the habitat controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! tool-surface error handling uniform. All variants are `Copy` so they can
//! be passed through the control path without allocation.
//!
//! Note the split the tool surface relies on: *busy*, *out-of-range* and
//! *cooldown-active* conditions are return contracts (`false` / descriptive
//! string), never `Err`. `Error` carries real faults only.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An actuator or sensor I/O operation failed, or a physical move
    /// violated its contract.
    Actuator(ActuatorError),
    /// An external assistance channel failed.
    Assist(AssistError),
    /// Peripheral or controller initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Assist(e) => write!(f, "assist: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO level write failed.
    GpioWriteFailed,
    /// GPIO level read failed.
    GpioReadFailed,
    /// PWM frequency/enable call failed.
    PwmFailed,
    /// `move_to` called while another move is in flight. Re-entrancy must be
    /// prevented by the feeder state guard; hitting this is a logic fault.
    MoveInFlight,
    /// The limit switch never reached the expected level within the
    /// configured step budget — jammed carriage or dead switch.
    TravelBudgetExceeded,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::PwmFailed => write!(f, "PWM drive failed"),
            Self::MoveInFlight => write!(f, "move already in flight"),
            Self::TravelBudgetExceeded => write!(f, "limit switch not reached within step budget"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Assistance-channel errors
// ---------------------------------------------------------------------------

/// Failures of the wrapped help action. Distinct from "cooldown active",
/// which is communicated as an ordinary string result, never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistError {
    /// I/O failure on the channel (details logged at the adapter).
    Io,
    /// The channel was closed from the far side (e.g. operator EOF).
    Closed,
    /// No channel is wired for this deployment.
    Unavailable,
}

impl fmt::Display for AssistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "channel I/O failed"),
            Self::Closed => write!(f, "channel closed"),
            Self::Unavailable => write!(f, "no channel wired"),
        }
    }
}

impl From<AssistError> for Error {
    fn from(e: AssistError) -> Self {
        Self::Assist(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
