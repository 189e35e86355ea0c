//! In-memory simulation adapters.
//!
//! The host half of the dual-target design: every port the drivers consume
//! has a sim implementation here, so the full controller assembles and runs
//! on a development machine with no GPIO in sight. Outputs record every
//! write (tests assert on command history, e.g. "zero drive-pin writes for a
//! rejected tone"), inputs take their levels from a caller closure, and
//! edges are fired by hand — from any thread, which is exactly how the
//! interrupt stress tests use them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::error::Result;
use crate::ports::{EdgeInput, ToneOutput};

// ── Output pin ────────────────────────────────────────────────

/// Shared view of a [`SimOutput`]'s write history. Cloneable, so a test can
/// keep one after moving the pin into a driver.
#[derive(Clone, Default)]
pub struct PinRecorder {
    writes: Arc<Mutex<Vec<bool>>>,
}

impl PinRecorder {
    fn record(&self, level: bool) {
        self.writes.lock().unwrap().push(level);
    }

    /// Total number of level writes this pin has seen.
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Every write, in order.
    pub fn history(&self) -> Vec<bool> {
        self.writes.lock().unwrap().clone()
    }

    /// Current (last written) level; low before any write.
    pub fn level(&self) -> bool {
        self.writes.lock().unwrap().last().copied().unwrap_or(false)
    }
}

/// Recording digital output.
#[derive(Default)]
pub struct SimOutput {
    rec: PinRecorder,
}

impl SimOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self) -> PinRecorder {
        self.rec.clone()
    }
}

impl ErrorType for SimOutput {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimOutput {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.rec.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.rec.record(true);
        Ok(())
    }
}

// ── Input pin ─────────────────────────────────────────────────

/// Digital input whose level comes from a supplier closure (`true` = HIGH).
/// Scripted suppliers let a test release a limit switch after N reads.
pub struct SimInput {
    supplier: Box<dyn FnMut() -> bool + Send>,
}

impl SimInput {
    pub fn from_fn(supplier: impl FnMut() -> bool + Send + 'static) -> Self {
        Self {
            supplier: Box::new(supplier),
        }
    }

    /// An input stuck at `level`.
    pub fn fixed(level: bool) -> Self {
        Self::from_fn(move || level)
    }
}

impl ErrorType for SimInput {
    type Error = core::convert::Infallible;
}

impl InputPin for SimInput {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok((self.supplier)())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(!(self.supplier)())
    }
}

// ── Edge-triggered input ──────────────────────────────────────

type EdgeHandler = Box<dyn FnMut() + Send + 'static>;

/// Hand-fireable edge source. Clones share the registered handler, so a
/// test keeps one clone and fires qualifying edges from any thread.
#[derive(Clone, Default)]
pub struct SimEdge {
    handler: Arc<Mutex<Option<EdgeHandler>>>,
}

impl SimEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one debounced falling edge, as the interrupt layer would.
    /// Runs the handler on the calling thread; a no-op until registration.
    pub fn fire(&self) {
        if let Some(handler) = self.handler.lock().unwrap().as_mut() {
            handler();
        }
    }
}

impl EdgeInput for SimEdge {
    fn on_falling_edge(&mut self, _debounce: Duration, handler: EdgeHandler) -> Result<()> {
        *self.handler.lock().unwrap() = Some(handler);
        Ok(())
    }
}

// ── Tone output ───────────────────────────────────────────────

#[derive(Default)]
struct SimToneState {
    starts: Vec<f64>,
    running: bool,
}

/// Recording tone drive. Clones share state for probing after the drive
/// moves into a [`ToneDriver`](crate::drivers::tone::ToneDriver).
#[derive(Clone, Default)]
pub struct SimTone {
    state: Arc<Mutex<SimToneState>>,
    fail_start: bool,
}

impl SimTone {
    pub fn new() -> Self {
        Self::default()
    }

    /// A drive whose `start` always fails, for failure-path tests.
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    /// Every frequency the drive was started at, in order.
    pub fn starts(&self) -> Vec<f64> {
        self.state.lock().unwrap().starts.clone()
    }

    pub fn running(&self) -> bool {
        self.state.lock().unwrap().running
    }
}

impl ToneOutput for SimTone {
    fn start(&mut self, frequency_hz: f64) -> Result<()> {
        if self.fail_start {
            return Err(crate::error::ActuatorError::PwmFailed.into());
        }
        let mut state = self.state.lock().unwrap();
        state.starts.push(frequency_hz);
        state.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.state.lock().unwrap().running = false;
        Ok(())
    }
}
