//! Task supervisor
//!
//! An interactive shell for a small real-time runtime:
//!
//! - `supervisor.rs` - registry, board and session handoff state
//! - `runtime.rs` - simulated priority scheduler with heap accounting
//! - `commands/` - shell and bus-scanner commands
//! - `console.rs` - byte queue and stream the sessions read from
//! - `board.rs` - GPIO and I2C access
//! - `apps.rs` - built-in unit entry points
//! - `config.rs` - tunable constants
//!
//! The task registry and the line shell live in the `tasksh-registry` and
//! `tasksh-shell` crates.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod apps;
pub mod board;
pub mod commands;
pub mod config;
pub mod console;
pub mod runtime;
pub mod supervisor;


pub use tasksh_registry as registry;
pub use tasksh_shell as shell;
