//! Command trait and the per-dispatch reply

use alloc::string::String;
use core::fmt;

use crate::args::{ArgKind, Args};
use crate::error::ShellError;

/// A command that can be registered with a [`Dispatcher`](crate::Dispatcher).
///
/// Commands are stateless and usually implemented as unit structs with a
/// `static` instance. Everything they act on comes in through `ctx`.
pub trait Command<C>: Sync {
    /// The primary name of the command
    fn name(&self) -> &'static str;

    /// Alternative names for the command
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Declared positional argument types
    fn signature(&self) -> &'static [ArgKind] {
        &[]
    }

    /// One-line description for help text
    fn description(&self) -> &'static str;

    /// Usage line for help text
    fn usage(&self) -> &'static str {
        self.name()
    }

    /// Run the command to completion.
    ///
    /// `args` already matches `signature()`. Short results go into the reply
    /// through `fmt::Write`; tables and other bulk output go to
    /// `reply.console()`.
    fn execute(&self, args: &Args, ctx: &mut C, reply: &mut Reply) -> Result<(), ShellError>;
}

/// Output of one dispatch.
///
/// The response text is bounded like a fixed response buffer and silently
/// truncated when full. The console text bypasses that limit and is written
/// to the stream before the response.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    response: String,
    capacity: usize,
    console: String,
    disable_session: bool,
}

impl Reply {
    pub fn new(capacity: usize) -> Self {
        Self {
            response: String::new(),
            capacity,
            console: String::new(),
            disable_session: false,
        }
    }

    /// Bounded response text
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Direct console output
    pub fn console(&mut self) -> &mut String {
        &mut self.console
    }

    pub fn console_text(&self) -> &str {
        &self.console
    }

    /// Ask the session that dispatched this command to stop reading input
    pub fn disable_session(&mut self) {
        self.disable_session = true;
    }

    pub fn disables_session(&self) -> bool {
        self.disable_session
    }

    /// Drop any response text written so far
    pub fn clear_response(&mut self) {
        self.response.clear();
    }
}

impl fmt::Write for Reply {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = self.capacity.saturating_sub(self.response.len());
        if s.len() <= remaining {
            self.response.push_str(s);
        } else {
            let mut end = remaining;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            self.response.push_str(&s[..end]);
        }
        // Truncation is silent
        Ok(())
    }
}
