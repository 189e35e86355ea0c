//! Full controller rig on simulated adapters.
//!
//! Builds a [`HabitatController`] whose pins, limit switch, edge inputs,
//! PWM and help sources are all in-memory doubles, and hands back the
//! handles tests need to inject presses and inspect hardware writes.

use std::sync::atomic::{AtomicUsize, Ordering};

use cagerig::adapters::sim::{PinRecorder, SimEdge, SimInput, SimOutput, SimTone};
use cagerig::config::HabitatConfig;
use cagerig::controller::HabitatController;
use cagerig::drivers::feeder::Feeder;
use cagerig::drivers::lever::{Lever, LeverMonitor};
use cagerig::drivers::stepper::StepperDriver;
use cagerig::drivers::tone::ToneDriver;
use cagerig::error::Error;
use cagerig::mailbox::Mailbox;
use cagerig::ports::HelpSource;

pub struct SimRig {
    pub controller: HabitatController<SimOutput, SimInput, SimTone>,
    pub left: SimEdge,
    pub right: SimEdge,
    pub pwm: SimTone,
    pub coils: [PinRecorder; 4],
    pub speaker_led: PinRecorder,
}

/// Timing tuned for tests: microsecond step cadence, millisecond polls.
pub fn fast_config() -> HabitatConfig {
    let mut config = HabitatConfig::default();
    config.step_interval_us = 1;
    config.overdrive_steps = 3;
    config.max_travel_steps = 60;
    config.lever_poll_ms = 5;
    config.lever_led_hold_secs = 1;
    config
}

/// Build a rig with canned help sources (keeper and reasoning each reply
/// with a fixed line).
pub fn build(config: &HabitatConfig) -> SimRig {
    build_with(
        config,
        Box::new(|_req: &str| Ok::<_, Error>(String::from("keeper: on my way"))),
        Box::new(|_req: &str| Ok::<_, Error>(String::from("try the left lever"))),
    )
}

pub fn build_with(
    config: &HabitatConfig,
    human: Box<dyn HelpSource + Send>,
    reasoning: Box<dyn HelpSource + Send>,
) -> SimRig {
    let pins: [SimOutput; 4] = std::array::from_fn(|_| SimOutput::new());
    let coils = std::array::from_fn(|i| pins[i].recorder());
    let stepper = StepperDriver::new(pins, alternating_limit(4), config);
    let feeder = Feeder::new(stepper);

    let pwm = SimTone::new();
    let led = SimOutput::new();
    let speaker_led = led.recorder();
    let tone = ToneDriver::new(pwm.clone(), led, config);

    let mailbox = Mailbox::new();
    let monitor = LeverMonitor::new(config, mailbox.clone());
    let mut left = SimEdge::new();
    let mut right = SimEdge::new();
    monitor.attach(Lever::Left, &mut left).unwrap();
    monitor.attach(Lever::Right, &mut right).unwrap();

    let controller =
        HabitatController::new(config, feeder, tone, monitor, mailbox, human, reasoning);
    SimRig { controller, left, right, pwm, coils, speaker_led }
}

/// Limit switch that flips level every `n` reads, starting closed (LOW).
/// Each seek therefore terminates within `n` half-steps, and consecutive
/// moves in opposite directions both have travel to do.
fn alternating_limit(n: usize) -> SimInput {
    let reads = AtomicUsize::new(0);
    SimInput::from_fn(move || {
        let r = reads.fetch_add(1, Ordering::Relaxed);
        (r / n) % 2 == 1
    })
}
