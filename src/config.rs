//! System configuration parameters.
//!
//! All tunable parameters for the habitat rig. Values can be overridden via
//! a JSON config file passed at startup; absent or unreadable files fall back
//! to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;

/// GPIO line assignments (BCM numbering). Defaults come from [`crate::pins`];
/// a rewired rig remaps here instead of recompiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinMap {
    /// Stepper coil phases, driver IN1..IN4 order.
    pub stepper_coils: [u8; 4],
    /// Feeder carriage limit switch (active low at the raised endpoint).
    pub feeder_limit: u8,
    /// Left / right lever inputs (active low, falling edge on press).
    pub lever_left: u8,
    pub lever_right: u8,
    /// Left / right lever indicator LEDs.
    pub lever_left_led: u8,
    pub lever_right_led: u8,
    /// Hardware PWM channel for the speaker.
    pub speaker_pwm_channel: u8,
    /// Speaker activity indicator LED.
    pub speaker_led: u8,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            stepper_coils: [
                pins::STEPPER_IN1_GPIO,
                pins::STEPPER_IN2_GPIO,
                pins::STEPPER_IN3_GPIO,
                pins::STEPPER_IN4_GPIO,
            ],
            feeder_limit: pins::FEEDER_LIMIT_GPIO,
            lever_left: pins::LEVER_LEFT_GPIO,
            lever_right: pins::LEVER_RIGHT_GPIO,
            lever_left_led: pins::LEVER_LEFT_LED_GPIO,
            lever_right_led: pins::LEVER_RIGHT_LED_GPIO,
            speaker_pwm_channel: pins::SPEAKER_PWM_CHANNEL,
            speaker_led: pins::SPEAKER_LED_GPIO,
        }
    }
}

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitatConfig {
    /// GPIO line assignments.
    pub pins: PinMap,

    // --- Feeder stepper ---
    /// Delay between half-steps (microseconds).
    pub step_interval_us: u64,
    /// Extra half-steps issued past the limit-switch trigger to guarantee
    /// full mechanical seating.
    pub overdrive_steps: u32,
    /// Maximum half-steps per move before the drive aborts with a fault.
    /// Must comfortably exceed the nominal 4096 half-step travel.
    pub max_travel_steps: u32,
    /// Phase-table traversal direction for the lowering move. Calibration:
    /// verified against the physical rig, never assumed — a wrong value
    /// drives the carriage into the end stop.
    pub lower_traverses_forward: bool,

    // --- Levers ---
    /// Debounce window enforced by the interrupt layer (milliseconds).
    pub lever_debounce_ms: u64,
    /// How long a lever's indicator LED stays lit after a press (seconds).
    pub lever_led_hold_secs: u64,
    /// Sleep-poll interval inside `wait_for_lever` (milliseconds).
    pub lever_poll_ms: u64,

    // --- Speaker ---
    /// Inclusive frequency bounds (Hz). Tones outside this range risk
    /// damaging the speaker and are rejected before any hardware write.
    pub tone_min_hz: f64,
    pub tone_max_hz: f64,

    // --- Assistance gates ---
    /// Minimum spacing between human-help requests (seconds).
    pub human_help_cooldown_secs: u64,
    /// Minimum spacing between remote-reasoning requests (seconds).
    pub reasoning_help_cooldown_secs: u64,
}

impl Default for HabitatConfig {
    fn default() -> Self {
        Self {
            pins: PinMap::default(),

            // Feeder stepper
            step_interval_us: 1_000,
            overdrive_steps: 200,
            max_travel_steps: 6_000,
            lower_traverses_forward: true,

            // Levers
            lever_debounce_ms: 300,
            lever_led_hold_secs: 3,
            lever_poll_ms: 100,

            // Speaker
            tone_min_hz: 50.0,
            tone_max_hz: 10_000.0,

            // Assistance gates
            human_help_cooldown_secs: 3_600,
            reasoning_help_cooldown_secs: 3_600,
        }
    }
}

impl HabitatConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            log::warn!("config: read {} failed: {}", path.display(), e);
            Error::Config("config file unreadable")
        })?;
        let cfg: Self = serde_json::from_str(&raw).map_err(|e| {
            log::warn!("config: parse {} failed: {}", path.display(), e);
            Error::Config("config file malformed")
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check the values that guard hardware safety.
    pub fn validate(&self) -> Result<()> {
        if self.tone_min_hz <= 0.0 || self.tone_max_hz < self.tone_min_hz {
            return Err(Error::Config("tone frequency bounds inverted"));
        }
        if self.step_interval_us == 0 {
            return Err(Error::Config("step interval must be non-zero"));
        }
        if self.max_travel_steps <= self.overdrive_steps {
            return Err(Error::Config("travel budget below overdrive count"));
        }
        if self.lever_poll_ms == 0 {
            return Err(Error::Config("lever poll interval must be non-zero"));
        }
        Ok(())
    }
}
