//! Speaker tone driver.
//!
//! Thin guard around the platform PWM primitive: validates the frequency
//! against the speaker-safe range *before any hardware write* (out-of-range
//! drive is stated to damage the speaker — the bound lives here, not in the
//! caller), raises an activity LED for the duration of the tone, and makes
//! sure a failed drive never leaks a lit indicator.

use std::thread;
use std::time::Duration;

use embedded_hal::digital::OutputPin;
use log::{error, warn};

use crate::config::HabitatConfig;
use crate::ports::ToneOutput;

pub struct ToneDriver<P: ToneOutput, O: OutputPin> {
    pwm: P,
    indicator: O,
    min_hz: f64,
    max_hz: f64,
}

impl<P: ToneOutput, O: OutputPin> ToneDriver<P, O> {
    pub fn new(pwm: P, indicator: O, config: &HabitatConfig) -> Self {
        Self {
            pwm,
            indicator,
            min_hz: config.tone_min_hz,
            max_hz: config.tone_max_hz,
        }
    }

    /// Play a square-wave tone at `frequency_hz` for `duration`.
    ///
    /// Returns `false` — performing no hardware write at all — when the
    /// frequency is outside the inclusive safe range. Drive errors are
    /// logged and surfaced as `false`; the indicator is lowered on every
    /// path.
    pub fn play(&mut self, duration: Duration, frequency_hz: f64) -> bool {
        if !frequency_hz.is_finite() || frequency_hz < self.min_hz || frequency_hz > self.max_hz {
            warn!(
                "tone: {frequency_hz} Hz outside safe range [{}, {}] — refused",
                self.min_hz, self.max_hz
            );
            return false;
        }

        if self.indicator.set_high().is_err() {
            error!("tone: indicator raise failed");
        }

        let ok = match self.pwm.start(frequency_hz) {
            Ok(()) => {
                thread::sleep(duration);
                match self.pwm.stop() {
                    Ok(()) => true,
                    Err(e) => {
                        error!("tone: drive stop failed: {e}");
                        false
                    }
                }
            }
            Err(e) => {
                error!("tone: drive start failed: {e}");
                // Best effort: leave no drive running behind a failed start.
                let _ = self.pwm.stop();
                false
            }
        };

        if self.indicator.set_low().is_err() {
            error!("tone: indicator lower failed");
        }
        ok
    }

    /// Force the drive off and the indicator low. For shutdown paths.
    pub fn silence(&mut self) {
        if let Err(e) = self.pwm.stop() {
            error!("tone: silence failed: {e}");
        }
        let _ = self.indicator.set_low();
    }
}
