//! Built-in unit entry points

use core::fmt::Write;

use crate::config::{HEARTBEAT_PERIOD_MS, POLL_INTERVAL_MS};
use crate::runtime::{Step, UnitContext};

/// Entry point for tasks started with `spawn`.
///
/// Prints a `.` every `HEARTBEAT_PERIOD_MS`, forever.
pub fn heartbeat(ctx: &mut UnitContext<'_>) -> Step {
    ctx.use_stack(640);
    if ctx.runs() > 0 {
        let _ = ctx.write_str(".");
    }
    Step::Sleep(HEARTBEAT_PERIOD_MS)
}

/// Unit standing for the resident shell.
///
/// The shell loop itself runs on the host executor; this unit only gives it a
/// slot, a priority and a scheduling state.
pub fn console_service(ctx: &mut UnitContext<'_>) -> Step {
    ctx.use_stack(1800);
    Step::Sleep(POLL_INTERVAL_MS)
}

/// Unit standing for the bus-scanner session
pub fn bus_scanner(ctx: &mut UnitContext<'_>) -> Step {
    ctx.use_stack(1200);
    Step::Sleep(POLL_INTERVAL_MS)
}
