//! Feeder cycle state machine.
//!
//! Wraps [`StepperDriver`] with an Idle/Feeding guard and a duration-based
//! dwell: `feed` runs lower → dwell → raise as one uninterruptible sequence.
//!
//! A stepper fault mid-cycle leaves the carriage somewhere physically
//! unknown. The feeder forces itself back to Idle, latches the position as
//! unverified, and refuses to cycle until [`Feeder::home`] re-establishes a
//! known position — the operator is confronted at the next startup rather
//! than mid-run (the experiment keeps its other actuators).

use std::thread;
use std::time::Duration;

use embedded_hal::digital::{InputPin, OutputPin};
use log::{error, info, warn};

use crate::drivers::stepper::{Endpoint, StepperDriver};
use crate::error::Result;

/// Feeder cycle state. Transitions Idle → Feeding → Idle are strictly
/// sequential within one `feed` call, never interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederState {
    Idle,
    Feeding,
}

pub struct Feeder<O: OutputPin, I: InputPin> {
    stepper: StepperDriver<O, I>,
    state: FeederState,
    /// True once the carriage has reached a limit-switch-defined position
    /// and no fault has occurred since.
    position_verified: bool,
}

impl<O: OutputPin, I: InputPin> Feeder<O, I> {
    /// The position is unverified until [`home`](Self::home) succeeds.
    pub fn new(stepper: StepperDriver<O, I>) -> Self {
        Self {
            stepper,
            state: FeederState::Idle,
            position_verified: false,
        }
    }

    /// Establish a known carriage position by driving to the raised
    /// endpoint. Run at startup, before the first cycle; a failure here is
    /// the one condition worth halting initialisation over, since every
    /// later cycle would start from an ambiguous physical state.
    pub fn home(&mut self) -> Result<()> {
        info!("feeder: homing to raised endpoint");
        self.stepper.move_to(Endpoint::Raised)?;
        self.position_verified = true;
        Ok(())
    }

    /// Run one full lower → dwell → raise cycle.
    ///
    /// Returns `true` iff the whole sequence completed from Idle. Returns
    /// `false` immediately — no side effect — when the feeder is mid-cycle
    /// (busy is a control signal to the caller, not an error) or when the
    /// carriage position is unverified after an earlier fault.
    pub fn feed(&mut self, dwell: Duration) -> bool {
        if self.state != FeederState::Idle {
            return false;
        }
        if !self.position_verified {
            warn!("feeder: feed refused, carriage position unverified — re-home required");
            return false;
        }

        self.state = FeederState::Feeding;

        if let Err(e) = self.stepper.move_to(Endpoint::Lowered) {
            return self.fault("lowering", e);
        }
        thread::sleep(dwell);
        if let Err(e) = self.stepper.move_to(Endpoint::Raised) {
            return self.fault("raising", e);
        }

        self.state = FeederState::Idle;
        true
    }

    /// Block until any in-flight cycle finishes, then release the coils.
    /// Safe to call repeatedly, including on a feeder that never cycled.
    pub fn cleanup(&mut self) {
        // All cycles run on the primary thread, so in practice the state is
        // already Idle here; the scoped wait covers any future off-thread
        // caller without interrupting an in-flight feed.
        while self.state == FeederState::Feeding {
            thread::sleep(Duration::from_millis(10));
        }
        if let Err(e) = self.stepper.release() {
            error!("feeder: cleanup release failed: {e}");
        }
    }

    pub fn state(&self) -> FeederState {
        self.state
    }

    /// Whether the carriage position is currently trusted.
    pub fn position_verified(&self) -> bool {
        self.position_verified
    }

    // ── Internal ──────────────────────────────────────────────

    /// Absorb a stepper fault: log it, distrust the position, force Idle.
    fn fault(&mut self, phase: &str, e: crate::error::Error) -> bool {
        error!("feeder: fault while {phase}: {e} — position now unverified");
        self.position_verified = false;
        self.state = FeederState::Idle;
        false
    }
}
