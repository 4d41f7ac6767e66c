//! Serial Shell
//!
//! Line-buffered command shell for a single byte stream:
//!
//! - `line.rs` - fixed-capacity line buffer with backspace handling
//! - `session.rs` - the polled read/echo/dispatch loop over `embedded-io-async`
//! - `args.rs` - tokenizer and typed argument coercion
//! - `command.rs` - the `Command` trait and the per-dispatch `Reply`
//! - `dispatch.rs` - command table and `process(line) -> Reply`
//!
//! Commands are generic over an application context `C`, so the same shell
//! drives any set of collaborators the application hands in.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod args;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod line;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod test_util;

pub use args::{Arg, ArgKind, Args};
pub use command::{Command, Reply};
pub use dispatch::{Bound, Dispatcher, LineHandler};
pub use error::ShellError;
pub use line::{Edit, LineBuffer};
pub use session::ShellSession;
