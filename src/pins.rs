//! GPIO pin assignments for the habitat controller board (BCM numbering).
//!
//! Single source of truth for the *default* wiring — [`crate::config::PinMap`]
//! seeds its defaults from these constants and may remap every line, so a
//! rewired rig only needs a config change.
//!
//! Pin numbers are calibration, not protocol: the stepper phase order and the
//! limit-switch polarity must be re-verified whenever the harness changes.

// ---------------------------------------------------------------------------
// Feeder stepper (ULN2003 driver, 28BYJ-48 class motor)
// ---------------------------------------------------------------------------

/// Stepper coil phase A (driver IN1).
pub const STEPPER_IN1_GPIO: u8 = 17;
/// Stepper coil phase B (driver IN2).
pub const STEPPER_IN2_GPIO: u8 = 18;
/// Stepper coil phase C (driver IN3).
pub const STEPPER_IN3_GPIO: u8 = 27;
/// Stepper coil phase D (driver IN4).
pub const STEPPER_IN4_GPIO: u8 = 22;

/// Feeder carriage limit switch. Active low: closed (LOW) when the carriage
/// is seated at the raised endpoint, open (HIGH) anywhere below it.
pub const FEEDER_LIMIT_GPIO: u8 = 23;

// ---------------------------------------------------------------------------
// Levers (spring-loaded, active-low with external pull-up)
// ---------------------------------------------------------------------------

/// Left lever input — falling edge on press.
pub const LEVER_LEFT_GPIO: u8 = 5;
/// Right lever input — falling edge on press.
pub const LEVER_RIGHT_GPIO: u8 = 6;

/// Left lever indicator LED (lit briefly after each press).
pub const LEVER_LEFT_LED_GPIO: u8 = 16;
/// Right lever indicator LED.
pub const LEVER_RIGHT_LED_GPIO: u8 = 20;

// ---------------------------------------------------------------------------
// Speaker
// ---------------------------------------------------------------------------

/// Hardware PWM channel driving the speaker (PWM0 = BCM 12 on a Pi 4).
pub const SPEAKER_PWM_CHANNEL: u8 = 0;
/// Speaker activity indicator LED.
pub const SPEAKER_LED_GPIO: u8 = 21;
