//! Habitat controller: the tool surface handed to the decision loop.
//!
//! Thin composition layer over the drivers. Every tool call runs to
//! completion on the caller's thread; the only things happening off it
//! are lever edge callbacks and the LED indicator worker, both owned by
//! the [`LeverMonitor`]. Durations arrive as raw `f64` seconds from an
//! untrusted caller, so they are clamped here before any driver sees them.

use std::time::Duration;

use embedded_hal::digital::{InputPin, OutputPin};
use log::info;

use crate::assist::gate::CooldownGate;
use crate::config::HabitatConfig;
use crate::drivers::feeder::Feeder;
use crate::drivers::lever::LeverMonitor;
use crate::drivers::tone::ToneDriver;
use crate::error::Result;
use crate::mailbox::Mailbox;
use crate::ports::{HelpSource, ToneOutput};

/// A help source guarded by its cooldown gate.
struct Assist {
    gate: CooldownGate,
    source: Box<dyn HelpSource + Send>,
}

impl Assist {
    fn invoke(&mut self, request: &str) -> Result<String> {
        self.gate.invoke(self.source.as_mut(), request)
    }
}

pub struct HabitatController<O, I, P>
where
    O: OutputPin,
    I: InputPin,
    P: ToneOutput,
{
    feeder: Feeder<O, I>,
    tone: ToneDriver<P, O>,
    levers: LeverMonitor,
    mailbox: Mailbox,
    human: Assist,
    reasoning: Assist,
}

impl<O, I, P> HabitatController<O, I, P>
where
    O: OutputPin,
    I: InputPin,
    P: ToneOutput,
{
    /// Assemble the controller from already-constructed drivers.
    ///
    /// `levers` must share `mailbox` (the monitor posts press events into
    /// it); adapters wire that up before calling here.
    pub fn new(
        config: &HabitatConfig,
        feeder: Feeder<O, I>,
        tone: ToneDriver<P, O>,
        levers: LeverMonitor,
        mailbox: Mailbox,
        human: Box<dyn HelpSource + Send>,
        reasoning: Box<dyn HelpSource + Send>,
    ) -> Self {
        Self {
            feeder,
            tone,
            levers,
            mailbox,
            human: Assist {
                gate: CooldownGate::new(
                    "human help",
                    Duration::from_secs(config.human_help_cooldown_secs),
                ),
                source: human,
            },
            reasoning: Assist {
                gate: CooldownGate::new(
                    "reasoning help",
                    Duration::from_secs(config.reasoning_help_cooldown_secs),
                ),
                source: reasoning,
            },
        }
    }

    /// Drive the feeder to the raised endpoint and verify position.
    /// Must succeed before the first `feed`; a failure here is halt-worthy.
    pub fn home(&mut self) -> Result<()> {
        self.feeder.home()
    }

    /// Run one feed cycle, leaving the trough lowered for `secs`.
    /// Returns false if a cycle is already running or the cycle faulted.
    pub fn feed(&mut self, secs: f64) -> bool {
        self.feeder.feed(clamp_secs(secs))
    }

    /// Sound the speaker at `frequency_hz` for `secs`.
    /// Returns false on an out-of-range frequency or a PWM fault.
    pub fn play_sound(&mut self, secs: f64, frequency_hz: f64) -> bool {
        self.tone.play(clamp_secs(secs), frequency_hz)
    }

    /// Block until a lever is pressed or `secs` elapse.
    /// Returns 0 for the left lever, 1 for the right, -1 on timeout.
    pub fn wait_for_lever(&self, secs: f64) -> i32 {
        match self.levers.wait_for_press(clamp_secs(secs)) {
            Some(lever) => lever.index() as i32,
            None => -1,
        }
    }

    /// Ask the human keeper for help, subject to the cooldown gate.
    pub fn get_human_help(&mut self, request: &str) -> Result<String> {
        info!("controller: human help requested");
        self.human.invoke(request)
    }

    /// Ask the reasoning backend for help, subject to the cooldown gate.
    pub fn get_reasoning_help(&mut self, request: &str) -> Result<String> {
        info!("controller: reasoning help requested");
        self.reasoning.invoke(request)
    }

    /// Drain the out-of-band event slot (lever presses outside a wait).
    pub fn take_notification(&self) -> Option<String> {
        self.mailbox.take()
    }

    /// Quiesce all outputs. Idempotent; called on shutdown and from tests.
    pub fn cleanup(&mut self) {
        self.feeder.cleanup();
        self.tone.silence();
        self.levers.cleanup();
        info!("controller: cleaned up");
    }
}

/// Longest duration a single tool call may block for. `from_secs_f64`
/// panics past ~1.8e19 s, so magnitude has to be bounded here; the policy
/// layer splits anything long into bounded calls anyway.
const MAX_TOOL_SECS: f64 = 7.0 * 86_400.0;

/// Map caller-supplied seconds onto a safe `Duration`. Non-finite and
/// negative values become zero, oversized ones saturate at
/// [`MAX_TOOL_SECS`] — `from_secs_f64` must never see a value it panics on.
fn clamp_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs.min(MAX_TOOL_SECS))
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sim::{SimEdge, SimInput, SimOutput, SimTone};
    use crate::drivers::lever::Lever;
    use crate::drivers::stepper::StepperDriver;
    use crate::error::{AssistError, Error};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_config() -> HabitatConfig {
        let mut config = HabitatConfig::default();
        config.step_interval_us = 0;
        config.overdrive_steps = 2;
        config.max_travel_steps = 50;
        config.lever_poll_ms = 5;
        config
    }

    /// Limit switch that reads open (HIGH) for `n` reads, then seated,
    /// alternating each block so successive moves both have travel to do.
    fn alternating_limit(n: usize) -> SimInput {
        let reads = AtomicUsize::new(0);
        SimInput::from_fn(move || {
            let r = reads.fetch_add(1, Ordering::Relaxed);
            (r / n) % 2 == 1
        })
    }

    fn build(
        config: &HabitatConfig,
    ) -> (HabitatController<SimOutput, SimInput, SimTone>, SimEdge, SimEdge, SimTone) {
        let coils = [SimOutput::new(), SimOutput::new(), SimOutput::new(), SimOutput::new()];
        let stepper = StepperDriver::new(coils, alternating_limit(4), config);
        let feeder = Feeder::new(stepper);

        let pwm = SimTone::new();
        let tone = ToneDriver::new(pwm.clone(), SimOutput::new(), config);

        let mailbox = Mailbox::new();
        let monitor = LeverMonitor::new(config, mailbox.clone());
        let mut left = SimEdge::new();
        let mut right = SimEdge::new();
        monitor.attach(Lever::Left, &mut left).unwrap();
        monitor.attach(Lever::Right, &mut right).unwrap();

        let human: Box<dyn HelpSource + Send> =
            Box::new(|_req: &str| Ok::<_, Error>(String::from("keeper: on my way")));
        let reasoning: Box<dyn HelpSource + Send> =
            Box::new(|_req: &str| Ok::<_, Error>(String::from("try the left lever")));

        let controller =
            HabitatController::new(config, feeder, tone, monitor, mailbox, human, reasoning);
        (controller, left, right, pwm)
    }

    #[test]
    fn feed_requires_homing_first() {
        let config = fast_config();
        let (mut ctl, _l, _r, _pwm) = build(&config);
        assert!(!ctl.feed(0.0));
        ctl.home().unwrap();
        assert!(ctl.feed(0.0));
    }

    #[test]
    fn negative_and_nan_durations_clamp_to_zero() {
        assert_eq!(clamp_secs(-3.0), Duration::ZERO);
        assert_eq!(clamp_secs(f64::NAN), Duration::ZERO);
        assert_eq!(clamp_secs(f64::INFINITY), Duration::ZERO);
        assert_eq!(clamp_secs(0.25), Duration::from_millis(250));
    }

    #[test]
    fn oversized_durations_saturate_instead_of_panicking() {
        let cap = Duration::from_secs_f64(MAX_TOOL_SECS);
        assert_eq!(clamp_secs(1e20), cap);
        assert_eq!(clamp_secs(f64::MAX), cap);
        assert_eq!(clamp_secs(MAX_TOOL_SECS + 1.0), cap);

        // End to end through the tool surface: both calls run the clamp on
        // a huge finite value and then refuse (unhomed feeder, out-of-range
        // frequency) without ever sleeping — and without panicking.
        let config = fast_config();
        let (mut ctl, _l, _r, pwm) = build(&config);
        assert!(!ctl.feed(1e20));
        assert!(!ctl.play_sound(1e20, 20_000.0));
        assert!(pwm.starts().is_empty());
    }

    #[test]
    fn play_sound_rejects_out_of_band_frequency() {
        let config = fast_config();
        let (mut ctl, _l, _r, pwm) = build(&config);
        assert!(!ctl.play_sound(0.0, 12.0));
        assert!(pwm.starts().is_empty());
        assert!(ctl.play_sound(0.0, 440.0));
        assert_eq!(pwm.starts(), vec![440.0]);
    }

    #[test]
    fn wait_for_lever_maps_codes() {
        let config = fast_config();
        let (ctl, left, right, _pwm) = build(&config);

        assert_eq!(ctl.wait_for_lever(0.0), -1);

        let t = std::thread::spawn({
            let left = left.clone();
            move || {
                std::thread::sleep(Duration::from_millis(10));
                left.fire();
            }
        });
        assert_eq!(ctl.wait_for_lever(2.0), 0);
        t.join().unwrap();

        let t = std::thread::spawn({
            let right = right.clone();
            move || {
                std::thread::sleep(Duration::from_millis(10));
                right.fire();
            }
        });
        assert_eq!(ctl.wait_for_lever(2.0), 1);
        t.join().unwrap();
    }

    #[test]
    fn press_outside_wait_lands_in_notification_slot() {
        let config = fast_config();
        let (ctl, left, _r, _pwm) = build(&config);
        assert_eq!(ctl.take_notification(), None);
        left.fire();
        assert_eq!(ctl.take_notification().as_deref(), Some("left lever pressed"));
        assert_eq!(ctl.take_notification(), None);
    }

    #[test]
    fn help_gates_are_independent() {
        let config = fast_config();
        let (mut ctl, _l, _r, _pwm) = build(&config);

        assert_eq!(ctl.get_human_help("stuck pellet").unwrap(), "keeper: on my way");
        let refusal = ctl.get_human_help("again").unwrap();
        assert!(refusal.contains("unavailable"), "got: {refusal}");

        // The human gate closing must not affect the reasoning gate.
        assert_eq!(ctl.get_reasoning_help("what now").unwrap(), "try the left lever");
    }

    #[test]
    fn failing_source_propagates_and_keeps_gate_open() {
        let config = fast_config();
        let (mut ctl, _l, _r, _pwm) = build(&config);

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        ctl.reasoning.source = Box::new(move |_req: &str| {
            seen.fetch_add(1, Ordering::Relaxed);
            Err::<String, _>(Error::Assist(AssistError::Unavailable))
        });

        assert!(matches!(
            ctl.get_reasoning_help("anything"),
            Err(Error::Assist(AssistError::Unavailable))
        ));
        // Failure must not start the cooldown.
        assert!(ctl.get_reasoning_help("retry").is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let config = fast_config();
        let (mut ctl, _l, _r, _pwm) = build(&config);
        ctl.cleanup();
        ctl.cleanup();
    }
}
