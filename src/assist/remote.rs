//! Remote reasoning channel placeholder.
//!
//! The wire transport to the remote assistant is deployment-specific and
//! outside this crate; installations wire a real [`HelpSource`] into the
//! controller at construction. `NullReasoning` stands in until then and
//! makes the "not wired" case a typed error rather than a hang.

use log::warn;

use crate::error::{AssistError, Result};
use crate::ports::HelpSource;

pub struct NullReasoning;

impl HelpSource for NullReasoning {
    fn request(&mut self, _prompt: &str) -> Result<String> {
        warn!("reasoning help requested but no remote channel is wired");
        Err(AssistError::Unavailable.into())
    }
}
