//! Raspberry Pi adapters (rppal-backed).
//!
//! The only module that touches real hardware. Plain pins come straight
//! from rppal, whose `hal` feature provides the `embedded-hal` impls the
//! drivers are generic over; this module adds the two ports rppal has no
//! trait for — debounced edge interrupts and fixed-duty tone PWM — plus a
//! one-shot constructor that claims every line in the [`PinMap`].

use std::time::Duration;

use log::{error, info};
use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};
use rppal::pwm::{Channel, Polarity, Pwm};

use crate::config::PinMap;
use crate::error::{ActuatorError, Error, Result};
use crate::ports::{EdgeInput, ToneOutput};

// ── Edge-triggered input ──────────────────────────────────────

/// Lever input delivering debounced falling-edge callbacks via rppal's
/// async interrupt thread (debounce is enforced by the platform, per the
/// lever contract).
pub struct RpiEdgeInput {
    pin: InputPin,
}

impl RpiEdgeInput {
    pub fn new(pin: InputPin) -> Self {
        Self { pin }
    }
}

impl EdgeInput for RpiEdgeInput {
    fn on_falling_edge(
        &mut self,
        debounce: Duration,
        mut handler: Box<dyn FnMut() + Send + 'static>,
    ) -> Result<()> {
        self.pin
            .set_async_interrupt(Trigger::FallingEdge, Some(debounce), move |_event| handler())
            .map_err(|e| {
                error!("rpi: interrupt registration failed: {e}");
                Error::Init("edge interrupt registration failed")
            })
    }
}

// ── Tone PWM ──────────────────────────────────────────────────

/// Speaker drive on a hardware PWM channel, 50% duty square wave.
pub struct RpiTone {
    pwm: Pwm,
}

impl RpiTone {
    /// Claim hardware PWM channel `channel` (0 or 1 on a Pi 4), disabled.
    pub fn new(channel: u8) -> Result<Self> {
        let channel = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            _ => return Err(Error::Config("speaker PWM channel must be 0 or 1")),
        };
        // Placeholder frequency; every play() sets its own before enabling.
        let pwm = Pwm::with_frequency(channel, 440.0, 0.5, Polarity::Normal, false)
            .map_err(|e| {
                error!("rpi: PWM channel claim failed: {e}");
                Error::Init("speaker PWM channel unavailable")
            })?;
        Ok(Self { pwm })
    }
}

impl ToneOutput for RpiTone {
    fn start(&mut self, frequency_hz: f64) -> Result<()> {
        self.pwm
            .set_frequency(frequency_hz, 0.5)
            .and_then(|()| self.pwm.enable())
            .map_err(|e| {
                error!("rpi: tone start failed: {e}");
                ActuatorError::PwmFailed.into()
            })
    }

    fn stop(&mut self) -> Result<()> {
        self.pwm.disable().map_err(|e| {
            error!("rpi: tone stop failed: {e}");
            ActuatorError::PwmFailed.into()
        })
    }
}

// ── Rig bring-up ──────────────────────────────────────────────

/// Every hardware line the controller needs, claimed and configured.
pub struct RpiRig {
    pub stepper_coils: [OutputPin; 4],
    pub feeder_limit: InputPin,
    pub lever_left: RpiEdgeInput,
    pub lever_right: RpiEdgeInput,
    pub lever_left_led: OutputPin,
    pub lever_right_led: OutputPin,
    pub speaker: RpiTone,
    pub speaker_led: OutputPin,
}

/// Claim all GPIO lines and the PWM channel per `pins`.
///
/// Fails fast: a line that cannot be claimed at boot (wrong permissions,
/// another process holding it) is an init fault, not something to limp past.
pub fn open(pins: &PinMap) -> Result<RpiRig> {
    let gpio = Gpio::new().map_err(|e| {
        error!("rpi: GPIO access failed: {e}");
        Error::Init("GPIO unavailable (run on a Pi, check permissions)")
    })?;

    let output = |bcm: u8| -> Result<OutputPin> {
        Ok(claim(&gpio, bcm)?.into_output_low())
    };

    let rig = RpiRig {
        stepper_coils: [
            output(pins.stepper_coils[0])?,
            output(pins.stepper_coils[1])?,
            output(pins.stepper_coils[2])?,
            output(pins.stepper_coils[3])?,
        ],
        feeder_limit: claim(&gpio, pins.feeder_limit)?.into_input_pullup(),
        lever_left: RpiEdgeInput::new(claim(&gpio, pins.lever_left)?.into_input_pullup()),
        lever_right: RpiEdgeInput::new(claim(&gpio, pins.lever_right)?.into_input_pullup()),
        lever_left_led: output(pins.lever_left_led)?,
        lever_right_led: output(pins.lever_right_led)?,
        speaker: RpiTone::new(pins.speaker_pwm_channel)?,
        speaker_led: output(pins.speaker_led)?,
    };

    info!(
        "rpi: rig claimed (coils {:?}, limit {}, levers {}/{}, speaker ch{})",
        pins.stepper_coils, pins.feeder_limit, pins.lever_left, pins.lever_right,
        pins.speaker_pwm_channel
    );
    Ok(rig)
}

fn claim(gpio: &Gpio, bcm: u8) -> Result<rppal::gpio::Pin> {
    gpio.get(bcm).map_err(|e| {
        error!("rpi: claiming BCM {bcm} failed: {e}");
        Error::Init("GPIO line unavailable")
    })
}
