//! Integration tests for the controller tool surface over sim adapters.
//!
//! Exercises the same call chain the operator console uses: controller →
//! driver → (simulated) pins, with the lever edge handlers firing from
//! separate threads the way the real interrupt layer would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cagerig::error::{AssistError, Error};

use crate::sim_rig::{build, build_with, fast_config};

#[test]
fn feed_is_refused_until_homed() {
    let mut rig = build(&fast_config());
    assert!(!rig.controller.feed(0.0), "unverified position must refuse to feed");

    rig.controller.home().unwrap();
    assert!(rig.controller.feed(0.0));

    // Lower + raise both moved the carriage, and the fault-safety contract
    // holds: every coil ends de-energized.
    for coil in &rig.coils {
        assert!(coil.write_count() > 0);
        assert!(!coil.level(), "coils must be released after a feed cycle");
    }
}

#[test]
fn feed_dwell_holds_the_trough_down() {
    let mut rig = build(&fast_config());
    rig.controller.home().unwrap();

    let start = std::time::Instant::now();
    assert!(rig.controller.feed(0.2));
    assert!(start.elapsed() >= Duration::from_millis(200), "dwell must be honored");
}

#[test]
fn out_of_range_tone_never_touches_hardware() {
    let mut rig = build(&fast_config());
    assert!(!rig.controller.play_sound(0.0, 20_000.0));
    assert!(!rig.controller.play_sound(0.0, f64::NAN));
    assert!(rig.pwm.starts().is_empty(), "rejected tones must not reach the PWM");
    assert_eq!(rig.speaker_led.write_count(), 0, "nor the indicator LED");
}

#[test]
fn valid_tone_drives_pwm_and_indicator() {
    let mut rig = build(&fast_config());
    assert!(rig.controller.play_sound(0.02, 440.0));
    assert_eq!(rig.pwm.starts(), vec![440.0]);
    assert!(!rig.pwm.running(), "PWM must be stopped after the tone");
    assert_eq!(rig.speaker_led.write_count(), 2);
    assert!(!rig.speaker_led.level());
}

#[test]
fn help_cooldown_closes_and_reopens() {
    let mut config = fast_config();
    config.human_help_cooldown_secs = 1;
    let mut rig = build(&config);

    assert_eq!(rig.controller.get_human_help("pellet jam").unwrap(), "keeper: on my way");

    let refusal = rig.controller.get_human_help("again").unwrap();
    assert!(refusal.contains("unavailable"), "got: {refusal}");

    std::thread::sleep(Duration::from_millis(1_100));
    assert_eq!(rig.controller.get_human_help("still jammed").unwrap(), "keeper: on my way");
}

#[test]
fn gates_are_independent_and_failure_keeps_gate_open() {
    let config = fast_config();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let mut rig = build_with(
        &config,
        Box::new(|_req: &str| Ok::<_, Error>(String::from("keeper here"))),
        Box::new(move |_req: &str| {
            seen.fetch_add(1, Ordering::Relaxed);
            Err::<String, _>(Error::Assist(AssistError::Unavailable))
        }),
    );

    // Closing the human gate must not close the reasoning gate.
    rig.controller.get_human_help("x").unwrap();
    assert!(rig.controller.get_human_help("y").unwrap().contains("unavailable"));

    // A failing reasoning source surfaces the error and never starts the
    // cooldown, so the retry reaches the source again.
    assert!(rig.controller.get_reasoning_help("a").is_err());
    assert!(rig.controller.get_reasoning_help("b").is_err());
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn press_outside_wait_is_notified_once() {
    let rig = build(&fast_config());
    assert_eq!(rig.controller.take_notification(), None);

    rig.left.fire();
    assert_eq!(rig.controller.take_notification().as_deref(), Some("left lever pressed"));
    assert_eq!(rig.controller.take_notification(), None, "events are consumed on take");
}

#[test]
fn newer_press_overwrites_unread_notification() {
    let rig = build(&fast_config());
    rig.left.fire();
    rig.right.fire();
    assert_eq!(rig.controller.take_notification().as_deref(), Some("right lever pressed"));
    assert_eq!(rig.controller.take_notification(), None);
}

#[test]
fn wait_for_lever_codes_match_the_tool_contract() {
    let rig = build(&fast_config());
    assert_eq!(rig.controller.wait_for_lever(0.0), -1);

    let left = rig.left.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(15));
        left.fire();
    });
    assert_eq!(rig.controller.wait_for_lever(5.0), 0);
    handle.join().unwrap();

    let right = rig.right.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(15));
        right.fire();
    });
    assert_eq!(rig.controller.wait_for_lever(5.0), 1);
    handle.join().unwrap();
}

#[test]
fn cleanup_quiesces_and_is_idempotent() {
    let mut rig = build(&fast_config());
    rig.controller.home().unwrap();
    assert!(rig.controller.play_sound(0.01, 440.0));

    rig.controller.cleanup();
    rig.controller.cleanup();

    for coil in &rig.coils {
        assert!(!coil.level());
    }
    assert!(!rig.pwm.running());
}
