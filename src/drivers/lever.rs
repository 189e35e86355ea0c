//! Lever press detection and signaling.
//!
//! Two falling-edge inputs (debounce enforced by the platform interrupt
//! layer) feed a pair of atomic "pressed" cells. The edge handlers run on
//! the interrupt thread and must stay O(1) and non-blocking, so they only:
//!
//! 1. store `true` into the lever's pressed cell;
//! 2. store an LED-off deadline for the lever's indicator — a detached
//!    indicator thread owns the LED pins and drives them against these
//!    deadlines, so the handler never touches a pin or sleeps;
//! 3. post a one-line event into the [`Mailbox`] *iff* the decision loop is
//!    not currently inside `wait_for_press`, letting it react out-of-band.
//!
//! [`LeverMonitor::wait_for_press`] is the blocking consumer: it resets both
//! cells, then sleep-polls them until a press or timeout. The pressed cells
//! and the waiting flag are the only state shared with the interrupt
//! context; everything goes through acquire/release atomics — an
//! unsynchronized race here is the most safety-critical bug this rig can
//! have, silently corrupting a multi-day unattended run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::config::HabitatConfig;
use crate::error::Result;
use crate::mailbox::Mailbox;
use crate::ports::EdgeInput;

/// Indicator thread poll period. Coarse is fine: the LED hold is seconds.
const INDICATOR_TICK: Duration = Duration::from_millis(25);

/// The two levers. `Left` is always checked first at a poll tick — the
/// deterministic tie-break the tool contract promises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lever {
    Left,
    Right,
}

impl Lever {
    /// 0 for Left, 1 for Right; also the tool-surface return code.
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Human-readable event line for the notification mailbox.
    pub fn event_text(self) -> &'static str {
        match self {
            Self::Left => "left lever pressed",
            Self::Right => "right lever pressed",
        }
    }
}

/// State shared between the edge handlers, the indicator thread and the
/// primary control thread.
struct Shared {
    /// Pressed latches, set by the edge handlers, reset by `wait_for_press`.
    pressed: [AtomicBool; 2],
    /// True while the decision loop is inside `wait_for_press`.
    waiting: AtomicBool,
    /// LED-off deadlines in milliseconds since the monitor epoch. 0 = off.
    led_off_at_ms: [AtomicU64; 2],
    /// Indicator thread shutdown flag.
    stop: AtomicBool,
}

pub struct LeverMonitor {
    shared: Arc<Shared>,
    mailbox: Mailbox,
    epoch: Instant,
    debounce: Duration,
    led_hold: Duration,
    poll_interval: Duration,
    indicator: Option<thread::JoinHandle<()>>,
}

impl LeverMonitor {
    pub fn new(config: &HabitatConfig, mailbox: Mailbox) -> Self {
        Self {
            shared: Arc::new(Shared {
                pressed: [AtomicBool::new(false), AtomicBool::new(false)],
                waiting: AtomicBool::new(false),
                led_off_at_ms: [AtomicU64::new(0), AtomicU64::new(0)],
                stop: AtomicBool::new(false),
            }),
            mailbox,
            epoch: Instant::now(),
            debounce: Duration::from_millis(config.lever_debounce_ms),
            led_hold: Duration::from_secs(config.lever_led_hold_secs),
            poll_interval: Duration::from_millis(config.lever_poll_ms),
            indicator: None,
        }
    }

    /// Register the debounced edge handler for `lever` on `line`.
    ///
    /// The handler closure is everything that ever runs in interrupt
    /// context: two atomic stores and, outside an active wait, one mailbox
    /// post. No sleeping, no I/O, no other locks.
    pub fn attach(&self, lever: Lever, line: &mut impl EdgeInput) -> Result<()> {
        let shared = Arc::clone(&self.shared);
        let mailbox = self.mailbox.clone();
        let epoch = self.epoch;
        let hold_ms = self.led_hold.as_millis() as u64;
        let idx = lever.index();

        line.on_falling_edge(
            self.debounce,
            Box::new(move || {
                shared.pressed[idx].store(true, Ordering::Release);
                let now_ms = epoch.elapsed().as_millis() as u64;
                shared.led_off_at_ms[idx].store(now_ms + hold_ms, Ordering::Release);
                if !shared.waiting.load(Ordering::Acquire) {
                    mailbox.post(lever.event_text());
                }
            }),
        )
    }

    /// Spawn the detached indicator thread that owns the two LED pins and
    /// lights each one until its press deadline passes.
    pub fn spawn_indicator<O>(&mut self, left_led: O, right_led: O)
    where
        O: OutputPin + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let epoch = self.epoch;
        let handle = thread::spawn(move || indicator_worker([left_led, right_led], shared, epoch));
        self.indicator = Some(handle);
    }

    /// Block until either lever is pressed or `timeout` elapses.
    ///
    /// Resets both pressed latches first, so only presses that arrive during
    /// this call count. Left wins a same-tick tie. Returns `None` only after
    /// at least `timeout` has elapsed.
    ///
    /// The latches are reset *before* the waiting flag goes up. An edge
    /// landing in that gap is latched (and satisfies the wait) but also
    /// posts a mailbox event, so the consumer may see one duplicate
    /// notification per wait. The reverse order would instead drop such a
    /// press entirely — latched, flag up, then reset — which loses data;
    /// the duplicate does not.
    pub fn wait_for_press(&self, timeout: Duration) -> Option<Lever> {
        self.shared.pressed[0].store(false, Ordering::Release);
        self.shared.pressed[1].store(false, Ordering::Release);
        self.shared.waiting.store(true, Ordering::Release);

        let deadline = Instant::now() + timeout;
        let result = loop {
            // Left before Right: deterministic tie-break, regardless of
            // which edge handler fired first.
            if self.shared.pressed[Lever::Left.index()].load(Ordering::Acquire) {
                break Some(Lever::Left);
            }
            if self.shared.pressed[Lever::Right.index()].load(Ordering::Acquire) {
                break Some(Lever::Right);
            }
            let now = Instant::now();
            if now >= deadline {
                break None;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        };

        self.shared.waiting.store(false, Ordering::Release);
        match result {
            Some(lever) => info!("lever: {} during wait", lever.event_text()),
            None => info!("lever: wait timed out after {timeout:?}"),
        }
        result
    }

    /// Stop and join the indicator thread. Idempotent.
    pub fn cleanup(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(handle) = self.indicator.take() {
            if handle.join().is_err() {
                warn!("lever: indicator thread panicked");
            }
        }
    }
}

impl Drop for LeverMonitor {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Indicator thread body: light each LED while its deadline is in the
/// future, then lower it. Both LEDs end low on shutdown.
fn indicator_worker<O: OutputPin>(mut leds: [O; 2], shared: Arc<Shared>, epoch: Instant) {
    let mut lit = [false; 2];
    while !shared.stop.load(Ordering::Acquire) {
        let now_ms = epoch.elapsed().as_millis() as u64;
        for i in 0..2 {
            let deadline = shared.led_off_at_ms[i].load(Ordering::Acquire);
            let want = deadline != 0 && now_ms < deadline;
            if want != lit[i] {
                let write = if want { leds[i].set_high() } else { leds[i].set_low() };
                if write.is_err() {
                    warn!("lever: indicator LED write failed");
                }
                lit[i] = want;
            }
        }
        thread::sleep(INDICATOR_TICK);
    }
    for led in &mut leds {
        let _ = led.set_low();
    }
}
