//! Port traits — the boundary between control logic and the platform.
//!
//! ```text
//!   Adapter (rppal / sim) ──▶ Port trait ──▶ driver / gate
//! ```
//!
//! Plain digital lines use the `embedded-hal` 1.0 traits directly
//! ([`embedded_hal::digital::OutputPin`] / [`InputPin`]); the ports here
//! cover what embedded-hal has no trait for: edge-interrupt registration,
//! fixed-duty tone PWM, and the external assistance channels.

use std::time::Duration;

use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Edge-triggered input (driven adapter: hardware → lever monitor)
// ───────────────────────────────────────────────────────────────

/// A digital input that can deliver debounced falling-edge callbacks.
///
/// The handler runs on the platform's interrupt thread, concurrent with the
/// primary control thread. Implementations must enforce `debounce` at the
/// platform layer (re-arm suppression), and handlers must stay O(1) and
/// non-blocking — a stall here desynchronizes all subsequent edge detection.
pub trait EdgeInput {
    /// Register `handler` for debounced falling edges. At most one handler
    /// per line; registering again replaces the previous one.
    fn on_falling_edge(
        &mut self,
        debounce: Duration,
        handler: Box<dyn FnMut() + Send + 'static>,
    ) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Tone output (driven adapter: tone driver → PWM peripheral)
// ───────────────────────────────────────────────────────────────

/// A square-wave drive at a caller-chosen frequency, fixed 50% duty.
///
/// Waveform generation is the platform's job; the tone driver only gates
/// frequency range and duration around these two calls.
pub trait ToneOutput {
    /// Start driving at `frequency_hz`.
    fn start(&mut self, frequency_hz: f64) -> Result<()>;

    /// Stop the drive. Idempotent.
    fn stop(&mut self) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Assistance channel (driven adapter: cooldown gate → outside help)
// ───────────────────────────────────────────────────────────────

/// An external call that takes a request string and returns a reply.
///
/// Blocks for the channel's full latency (an operator typing, a remote
/// assistant round-trip). Failures must surface as `Err` — the gate relies
/// on distinguishing them from its own cooldown rejections.
pub trait HelpSource {
    fn request(&mut self, prompt: &str) -> Result<String>;
}

/// Closures are help sources; keeps tests and ad-hoc wiring terse.
impl<F> HelpSource for F
where
    F: FnMut(&str) -> Result<String>,
{
    fn request(&mut self, prompt: &str) -> Result<String> {
        self(prompt)
    }
}
