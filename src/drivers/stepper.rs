//! Feeder carriage stepper drive (ULN2003 + 28BYJ-48 class motor).
//!
//! Walks four coil outputs through an 8-row half-step phase table at a fixed
//! cadence until the carriage limit switch reads the level expected for the
//! target endpoint, then issues a fixed overdrive past the trigger point so
//! the carriage seats fully.
//!
//! ## Calibration contract
//!
//! Two mappings here are *measured on the rig, never assumed*:
//!
//! - traversal direction: lowering walks the table forward when
//!   `lower_traverses_forward` is set (default), reversed otherwise. A wrong
//!   value drives the carriage into its end stop at full torque.
//! - limit polarity: one switch at the raised endpoint, active low. Raised
//!   expects LOW (closed), Lowered expects HIGH (released).
//!
//! ## Bounded travel
//!
//! A move that never sees its expected switch level (jammed carriage, dead
//! switch) aborts with [`ActuatorError::TravelBudgetExceeded`] after
//! `max_travel_steps` half-steps instead of spinning the coils forever.
//! Every exit path de-energizes all four coils and clears the in-flight flag.

use std::thread;
use std::time::Duration;

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, error};

use crate::config::HabitatConfig;
use crate::error::{ActuatorError, Result};

/// Half-step phase table, driver IN1..IN4 order. One full traversal is
/// 8 half-steps; the nominal raised↔lowered throw is 512 traversals.
pub const HALF_STEP_SEQUENCE: [[bool; 4]; 8] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

/// The two limit-switch-defined physical positions of the carriage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Carriage seated at the top, switch closed. The safe rest position.
    Raised,
    /// Carriage at the bottom of its throw, switch released.
    Lowered,
}

pub struct StepperDriver<O: OutputPin, I: InputPin> {
    coils: [O; 4],
    limit: I,
    step_interval: Duration,
    overdrive_steps: u32,
    max_travel_steps: u32,
    lower_traverses_forward: bool,
    /// Current row in [`HALF_STEP_SEQUENCE`]; persists across moves so the
    /// rotor never skips a phase between direction changes.
    phase: usize,
    in_flight: bool,
}

impl<O: OutputPin, I: InputPin> StepperDriver<O, I> {
    pub fn new(coils: [O; 4], limit: I, config: &HabitatConfig) -> Self {
        Self {
            coils,
            limit,
            step_interval: Duration::from_micros(config.step_interval_us),
            overdrive_steps: config.overdrive_steps,
            max_travel_steps: config.max_travel_steps,
            lower_traverses_forward: config.lower_traverses_forward,
            phase: 0,
            in_flight: false,
        }
    }

    /// Drive the carriage to `target`, then overdrive to seat it.
    ///
    /// Blocks for the full travel. Errors with [`ActuatorError::MoveInFlight`]
    /// if a move is already running — the feeder state guard is responsible
    /// for never letting that happen.
    pub fn move_to(&mut self, target: Endpoint) -> Result<()> {
        if self.in_flight {
            return Err(ActuatorError::MoveInFlight.into());
        }
        self.in_flight = true;

        let result = self.drive(target);

        // Holding torque off on every exit path: coils cool, and a faulted
        // carriage can be repositioned by hand.
        if let Err(e) = self.release() {
            error!("stepper: coil release failed after move: {e}");
        }
        self.in_flight = false;
        result
    }

    /// De-energize all four coils. Idempotent.
    pub fn release(&mut self) -> Result<()> {
        for coil in &mut self.coils {
            coil.set_low().map_err(|e| {
                error!("stepper: coil write failed: {e:?}");
                ActuatorError::GpioWriteFailed
            })?;
        }
        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────

    fn drive(&mut self, target: Endpoint) -> Result<()> {
        let forward = match target {
            Endpoint::Lowered => self.lower_traverses_forward,
            Endpoint::Raised => !self.lower_traverses_forward,
        };

        let mut steps: u32 = 0;
        while !self.limit_seated(target)? {
            if steps >= self.max_travel_steps {
                error!(
                    "stepper: {target:?} not reached within {} half-steps — jammed carriage or dead switch",
                    self.max_travel_steps
                );
                return Err(ActuatorError::TravelBudgetExceeded.into());
            }
            self.half_step(forward)?;
            steps += 1;
        }

        // Overdrive past the trigger point to guarantee full seating.
        for _ in 0..self.overdrive_steps {
            self.half_step(forward)?;
        }

        debug!("stepper: {target:?} reached in {steps} half-steps (+{} overdrive)", self.overdrive_steps);
        Ok(())
    }

    /// Whether the limit switch already reads the level expected at `target`.
    fn limit_seated(&mut self, target: Endpoint) -> Result<bool> {
        let low = self.limit.is_low().map_err(|e| {
            error!("stepper: limit switch read failed: {e:?}");
            ActuatorError::GpioReadFailed
        })?;
        Ok(match target {
            Endpoint::Raised => low,
            Endpoint::Lowered => !low,
        })
    }

    /// Advance one row through the phase table and energize it.
    fn half_step(&mut self, forward: bool) -> Result<()> {
        self.phase = if forward {
            (self.phase + 1) % HALF_STEP_SEQUENCE.len()
        } else {
            (self.phase + HALF_STEP_SEQUENCE.len() - 1) % HALF_STEP_SEQUENCE.len()
        };
        let row = HALF_STEP_SEQUENCE[self.phase];
        for (coil, &level) in self.coils.iter_mut().zip(row.iter()) {
            let write = if level { coil.set_high() } else { coil.set_low() };
            write.map_err(|e| {
                error!("stepper: coil write failed: {e:?}");
                ActuatorError::GpioWriteFailed
            })?;
        }
        thread::sleep(self.step_interval);
        Ok(())
    }
}
