//! Out-of-band notification mailbox.
//!
//! A single-slot, overwrite-on-write channel from the lever interrupt
//! context to the decision loop:
//!
//! ```text
//! ┌──────────────┐   post (overwrite)   ┌──────────────┐
//! │ edge callback│ ───────────────────▶ │   Mailbox    │
//! └──────────────┘                      │ (one slot)   │
//!                     take (drain)      └──────────────┘
//!                  ◀───────────────────  decision loop
//! ```
//!
//! The callback never blocks beyond the single slot write, and the decision
//! loop drains opportunistically — neither side ever waits on the other.
//! Only the newest event matters to the policy layer, so a fresh press
//! overwrites an unread one rather than queueing behind it.

use std::sync::{Arc, Mutex};

/// Cheaply clonable handle to the single notification slot.
///
/// Created once at controller start; one clone lives inside each lever edge
/// callback, one in the decision loop. Lifetime = process lifetime.
#[derive(Clone, Default)]
pub struct Mailbox {
    slot: Arc<Mutex<Option<String>>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit an event line, overwriting any unread one.
    ///
    /// Safe from the interrupt thread: the lock is held for a single
    /// pointer-sized swap, and the consumer holds it equally briefly.
    pub fn post(&self, event: impl Into<String>) {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(event.into());
    }

    /// Drain the slot, clearing it. `None` when nothing is pending.
    pub fn take(&self) -> Option<String> {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        slot.take()
    }

    /// Whether an event is pending (without consuming it).
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_drains_the_slot() {
        let mb = Mailbox::new();
        mb.post("left lever pressed");
        assert_eq!(mb.take().as_deref(), Some("left lever pressed"));
        assert_eq!(mb.take(), None);
    }

    #[test]
    fn post_overwrites_unread_event() {
        let mb = Mailbox::new();
        mb.post("left lever pressed");
        mb.post("right lever pressed");
        assert_eq!(mb.take().as_deref(), Some("right lever pressed"));
        assert!(!mb.is_pending());
    }

    #[test]
    fn clones_share_the_slot_across_threads() {
        let mb = Mailbox::new();
        let producer = mb.clone();
        let handle = std::thread::spawn(move || {
            producer.post("right lever pressed");
        });
        handle.join().unwrap();
        assert_eq!(mb.take().as_deref(), Some("right lever pressed"));
    }
}
