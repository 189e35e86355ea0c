//! Cooldown-windowed gate around an external assistance call.
//!
//! One parameterized type covers both assistance channels (human help on a
//! short horizon, remote reasoning on a long one) — previously two
//! near-duplicate timestamp checks that had started to drift apart.
//!
//! The window is measured from the *completion* of the last successful call,
//! not its start, so a slow operator or remote round-trip can never shrink
//! the effective cooldown. A rejected call reports elapsed and remaining
//! seconds computed from a single timestamp read, so the message can never
//! disagree with the decision.

use std::time::{Duration, Instant};

use log::info;

use crate::error::Result;
use crate::ports::HelpSource;

pub struct CooldownGate {
    /// Channel name, used in the cooldown message and logs.
    name: &'static str,
    window: Duration,
    /// Completion time of the last successful invocation.
    last_completed: Option<Instant>,
}

impl CooldownGate {
    pub fn new(name: &'static str, window: Duration) -> Self {
        Self {
            name,
            window,
            last_completed: None,
        }
    }

    /// Run `source` unless the cooldown window is still open.
    ///
    /// Within the window: returns the descriptive cooldown message (this is
    /// a normal result, not an error) and never calls `source`. Past it:
    /// calls `source`, stamps the completion time, and returns the reply
    /// unmodified. A `source` failure propagates as `Err` — distinct from
    /// cooldown by construction.
    pub fn invoke<S: HelpSource + ?Sized>(&mut self, source: &mut S, request: &str) -> Result<String> {
        if let Some(last) = self.last_completed {
            let elapsed = last.elapsed();
            if elapsed < self.window {
                let remaining = self.window - elapsed;
                info!("{}: request refused, {}s of cooldown remaining", self.name, remaining.as_secs());
                return Ok(format!(
                    "{} is unavailable: used {}s ago, cooldown of {}s has {}s remaining",
                    self.name,
                    elapsed.as_secs(),
                    self.window.as_secs(),
                    remaining.as_secs(),
                ));
            }
        }

        info!("{}: forwarding request ({} chars)", self.name, request.len());
        let reply = source.request(request)?;
        self.last_completed = Some(Instant::now());
        Ok(reply)
    }

    /// Whether a request would currently pass the gate.
    pub fn is_open(&self) -> bool {
        self.last_completed.is_none_or(|last| last.elapsed() >= self.window)
    }
}
