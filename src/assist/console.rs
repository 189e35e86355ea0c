//! Operator console help channel.
//!
//! The human-in-the-loop side of the assistance gate: prints the decision
//! loop's request on the controller console and blocks until the operator
//! types a reply. I/O details are logged here; callers only see the typed
//! [`AssistError`] variants.

use std::io::{BufRead, Write};

use log::{info, warn};

use crate::error::{AssistError, Result};
use crate::ports::HelpSource;

pub struct ConsoleHelp;

impl ConsoleHelp {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleHelp {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpSource for ConsoleHelp {
    fn request(&mut self, prompt: &str) -> Result<String> {
        info!("human help requested");
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let write = writeln!(out, "\n=== HELP REQUESTED ===\n{prompt}\n(reply on one line)")
            .and_then(|()| out.flush());
        if let Err(e) = write {
            warn!("console help: write failed: {e}");
            return Err(AssistError::Io.into());
        }

        let mut reply = String::new();
        match std::io::stdin().lock().read_line(&mut reply) {
            Ok(0) => Err(AssistError::Closed.into()),
            Ok(_) => Ok(reply.trim_end().to_string()),
            Err(e) => {
                warn!("console help: read failed: {e}");
                Err(AssistError::Io.into())
            }
        }
    }
}
