//! Cagerig — habitat controller entry point.
//!
//! Brings up the Raspberry Pi rig and exposes the tool surface through a
//! line-oriented operator console on stdin:
//!
//! ```text
//! feed <dwell-secs>        run one feed cycle
//! play <secs> <hz>         sound the speaker
//! wait <secs>              block for a lever press
//! help <request...>        ask the human keeper (cooldown-gated)
//! ask <request...>         ask the reasoning backend (cooldown-gated)
//! quit                     quiesce outputs and exit
//! ```
//!
//! Out-of-band lever presses are drained and printed between commands.

#![deny(unused_must_use)]

use std::io::{BufRead, Write as _};
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use cagerig::adapters::rpi;
use cagerig::assist::console::ConsoleHelp;
use cagerig::assist::remote::NullReasoning;
use cagerig::config::HabitatConfig;
use cagerig::controller::HabitatController;
use cagerig::drivers::feeder::Feeder;
use cagerig::drivers::lever::{Lever, LeverMonitor};
use cagerig::drivers::stepper::StepperDriver;
use cagerig::drivers::tone::ToneDriver;
use cagerig::mailbox::Mailbox;
use cagerig::ports::HelpSource;

const DEFAULT_CONFIG_PATH: &str = "/etc/cagerig/config.json";

fn main() -> Result<()> {
    env_logger::init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Cagerig v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── Config (file or defaults) ─────────────────────────────
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
    let config = match HabitatConfig::load(Path::new(&config_path)) {
        Ok(cfg) => {
            info!("Config loaded from {config_path}");
            cfg
        }
        Err(e) => {
            warn!("Config load failed ({e}), using defaults");
            HabitatConfig::default()
        }
    };

    // ── Claim hardware ────────────────────────────────────────
    let mut rig = rpi::open(&config.pins).context("rig bring-up failed")?;

    // ── Levers: edge callbacks + LED indicator worker ─────────
    let mailbox = Mailbox::new();
    let mut levers = LeverMonitor::new(&config, mailbox.clone());
    levers.attach(Lever::Left, &mut rig.lever_left)?;
    levers.attach(Lever::Right, &mut rig.lever_right)?;
    levers.spawn_indicator(rig.lever_left_led, rig.lever_right_led);

    // ── Actuators ─────────────────────────────────────────────
    let stepper = StepperDriver::new(rig.stepper_coils, rig.feeder_limit, &config);
    let feeder = Feeder::new(stepper);
    let tone = ToneDriver::new(rig.speaker, rig.speaker_led, &config);

    let human: Box<dyn HelpSource + Send> = Box::new(ConsoleHelp::new());
    let reasoning: Box<dyn HelpSource + Send> = Box::new(NullReasoning);

    let mut controller =
        HabitatController::new(&config, feeder, tone, levers, mailbox, human, reasoning);

    // Position must be verified before the first feed. A rig that cannot
    // home has a mechanical or wiring fault; do not run blind.
    controller.home().context("feeder homing failed — check carriage and limit switch")?;

    info!("Rig ready. Type 'quit' to exit.");

    // ── Operator console ──────────────────────────────────────
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut line = String::new();
    loop {
        for event in std::iter::from_fn(|| controller.take_notification()) {
            writeln!(stdout, "[event] {event}")?;
        }
        write!(stdout, "> ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else { continue };

        match command {
            "feed" => {
                let dwell = parse_num(parts.next());
                let ok = controller.feed(dwell);
                writeln!(stdout, "feed: {}", if ok { "done" } else { "refused" })?;
            }
            "play" => {
                let secs = parse_num(parts.next());
                let hz = parse_num(parts.next());
                let ok = controller.play_sound(secs, hz);
                writeln!(stdout, "play: {}", if ok { "done" } else { "refused" })?;
            }
            "wait" => {
                let secs = parse_num(parts.next());
                writeln!(stdout, "wait: {}", controller.wait_for_lever(secs))?;
            }
            "help" => {
                let request = parts.collect::<Vec<_>>().join(" ");
                respond(&mut stdout, controller.get_human_help(&request))?;
            }
            "ask" => {
                let request = parts.collect::<Vec<_>>().join(" ");
                respond(&mut stdout, controller.get_reasoning_help(&request))?;
            }
            "quit" | "exit" => break,
            other => {
                writeln!(stdout, "unknown command: {other}")?;
            }
        }
    }

    controller.cleanup();
    info!("Shutdown complete");
    Ok(())
}

fn parse_num(arg: Option<&str>) -> f64 {
    arg.and_then(|s| s.parse().ok()).unwrap_or(0.0)
}

fn respond(out: &mut impl std::io::Write, reply: cagerig::error::Result<String>) -> Result<()> {
    match reply {
        Ok(text) => writeln!(out, "{text}")?,
        Err(e) => writeln!(out, "request failed: {e}")?,
    }
    Ok(())
}
