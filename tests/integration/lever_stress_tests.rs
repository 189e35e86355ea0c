//! Lever signaling under concurrent edge storms.
//!
//! The edge handlers run on interrupt threads in production; these tests
//! fire them from std threads while the control thread sits in
//! `wait_for_lever`, checking the cross-thread contract holds under load.

use std::time::{Duration, Instant};

use crate::sim_rig::{build, fast_config};

#[test]
fn edge_storm_during_wait_yields_exactly_one_code() {
    let rig = build(&fast_config());

    let left = rig.left.clone();
    let right = rig.right.clone();
    let storm_left = std::thread::spawn(move || {
        for _ in 0..200 {
            left.fire();
            std::thread::sleep(Duration::from_micros(100));
        }
    });
    let storm_right = std::thread::spawn(move || {
        for _ in 0..200 {
            right.fire();
            std::thread::sleep(Duration::from_micros(100));
        }
    });

    let code = rig.controller.wait_for_lever(5.0);
    assert!(code == 0 || code == 1, "storm must resolve to one lever, got {code}");

    storm_left.join().unwrap();
    storm_right.join().unwrap();
}

#[test]
fn both_latched_before_first_poll_resolves_left() {
    let mut config = fast_config();
    // A poll interval long enough that both fires land before the first tick.
    config.lever_poll_ms = 50;
    let rig = build(&config);

    let left = rig.left.clone();
    let right = rig.right.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        right.fire();
        left.fire();
    });

    assert_eq!(rig.controller.wait_for_lever(5.0), 0, "left must win a same-tick tie");
    handle.join().unwrap();
}

#[test]
fn each_wait_requires_a_fresh_press() {
    let rig = build(&fast_config());

    for round in 0..5 {
        let right = rig.right.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            right.fire();
        });
        assert_eq!(rig.controller.wait_for_lever(5.0), 1, "round {round}");
        handle.join().unwrap();

        // The press consumed above must not satisfy the next wait.
        assert_eq!(rig.controller.wait_for_lever(0.05), -1, "round {round} stale press");
    }
}

#[test]
fn timed_out_wait_runs_the_full_timeout() {
    let rig = build(&fast_config());
    let start = Instant::now();
    assert_eq!(rig.controller.wait_for_lever(0.12), -1);
    assert!(start.elapsed() >= Duration::from_millis(120));
}
