//! Supervisor configuration constants
//!
//! Tunable parameters for the task registry, the shell and the simulated
//! board. Modify these values to adjust supervisor behavior.
//!
//! # Heap Budget
//!
//! Every unit the runtime creates costs its stack depth plus a control block
//! out of `HEAP_SIZE`. The resident shell alone takes a sizeable share, so
//! raising `USER_TASK_STACK_DEPTH` quickly leads to `out of memory` on spawn.

#![allow(dead_code)]

/// Number of user task slots in the registry
///
/// The resident shell occupies one of them, so `MAX_USER_TASKS - 1` are left
/// for operator-spawned tasks.
pub const MAX_USER_TASKS: usize = 3;

/// Shell line buffer capacity in bytes
///
/// At most `CMD_BUFFER_SIZE - 1` characters are kept per line; further input
/// is dropped until the line is submitted.
pub const CMD_BUFFER_SIZE: usize = 128;

/// Bounded response text per dispatched command, in bytes
///
/// Tables and other bulk output go straight to the console and are not
/// limited by this.
pub const RESPONSE_BUFFER_SIZE: usize = 128;

/// Delay between input polls of the shell task (10ms)
///
/// Human typing speed; low enough that echo feels immediate.
pub const POLL_INTERVAL_MS: u64 = 10;

/// Period of the simulated scheduler tick (10ms)
pub const TICK_INTERVAL_MS: u64 = 10;

/// Priority of the resident shell unit
pub const SHELL_PRIORITY: u32 = 10;

/// Stack budget of the resident shell unit, in bytes
pub const SHELL_STACK_DEPTH: usize = 10024;

/// Stack budget for tasks started with `spawn`, in bytes
pub const USER_TASK_STACK_DEPTH: usize = 2048;

/// Stack budget for the bus-scanner unit, in bytes
pub const SCANNER_STACK_DEPTH: usize = 4096;

/// Priority of the bus-scanner unit
pub const SCANNER_PRIORITY: u32 = 5;

/// Heap managed by the simulated runtime (400000 bytes)
pub const HEAP_SIZE: usize = 400_000;

/// Per-unit control block overhead charged against the heap
pub const TCB_SIZE: usize = 360;

/// Bytes of stack a unit touches just by existing
pub const BASE_STACK_USAGE: usize = 512;

/// Number of distinct priorities; higher values are clamped to the top one
pub const MAX_PRIORITIES: u32 = 25;

/// Longest unit name the runtime keeps (including room for a terminator)
pub const MAX_TASK_NAME_LEN: usize = 16;

/// Size of the runtime's own unit table
///
/// Larger than `MAX_USER_TASKS` so the runtime can also host units that are
/// not tracked by the registry.
pub const MAX_UNITS: usize = 8;

/// Period of the `.` heartbeat printed by spawned tasks (10s)
pub const HEARTBEAT_PERIOD_MS: u64 = 10_000;

/// Number of addressable GPIO pins on the simulated board
pub const PIN_COUNT: u8 = 40;

/// Pins that read high on the simulated board (UART, strapping pins)
pub const DEFAULT_HIGH_PINS: &[u8] = &[0, 1, 3, 5, 15];

/// Devices that acknowledge on the simulated I2C bus
pub const I2C_DEVICES: &[u8] = &[0x3C, 0x68];

/// First and last 7-bit addresses probed by `scan`
pub const I2C_SCAN_FIRST: u8 = 0x01;
pub const I2C_SCAN_LAST: u8 = 0x7F;

/// Shell banner
pub const BANNER: &str = "Tiny task shell ready!";

/// Prompt of the resident shell
pub const SHELL_PROMPT: &str = ">";

/// Prompt of the bus-scanner session
pub const SCANNER_PROMPT: &str = "i2c>";
