//! Board diagnostic commands
//!
//! Commands: pinfo, i2c, and the bus-scanner session's scan and probe

use alloc::string::String;
use core::fmt::Write;

use tasksh_shell::{ArgKind, Args, Command, Reply, ShellError};

use super::registry_error;
use crate::apps;
use crate::board::Board;
use crate::config::{I2C_SCAN_FIRST, I2C_SCAN_LAST, SCANNER_PRIORITY, SCANNER_STACK_DEPTH};
use crate::supervisor::{SessionKind, Supervisor};

/// Name of the bus-scanner unit
pub const SCANNER_TASK_NAME: &str = "I2C SCANNER";

const PINS_PER_ROW: u8 = 8;

/// Probe every 7-bit address, writing one line per responding device.
/// Returns the number of devices found.
pub fn scan_bus(board: &mut dyn Board, out: &mut String) -> usize {
    let mut found = 0;
    for addr in I2C_SCAN_FIRST..=I2C_SCAN_LAST {
        if board.i2c_probe(addr) {
            let _ = write!(out, "device at 0x{:02X}\r\n", addr);
            found += 1;
        }
    }
    log::debug!("bus scan found {} device(s)", found);
    found
}

// ============================================================================
// Pinfo Command
// ============================================================================

/// Pinfo command - dumps the level of every GPIO line
pub struct PinfoCommand;

impl Command<Supervisor> for PinfoCommand {
    fn name(&self) -> &'static str {
        "pinfo"
    }
    fn description(&self) -> &'static str {
        "Show the digital level of every GPIO"
    }

    fn execute(&self, _args: &Args, ctx: &mut Supervisor, reply: &mut Reply) -> Result<(), ShellError> {
        let board = ctx.board();
        let out = reply.console();

        for pin in 0..board.pin_count() {
            let level = match board.digital_read(pin) {
                Some(true) => 'H',
                Some(false) => 'L',
                None => '?',
            };
            let _ = write!(out, "{:>3}:{}", pin, level);
            if pin % PINS_PER_ROW == PINS_PER_ROW - 1 {
                out.push_str("\r\n");
            }
        }
        if board.pin_count() % PINS_PER_ROW != 0 {
            out.push_str("\r\n");
        }
        Ok(())
    }
}

pub static PINFO_CMD: PinfoCommand = PinfoCommand;

// ============================================================================
// I2c Command
// ============================================================================

/// I2c command - hands the console to the bus-scanner session
pub struct I2cCommand;

impl Command<Supervisor> for I2cCommand {
    fn name(&self) -> &'static str {
        "i2c"
    }
    fn description(&self) -> &'static str {
        "Switch to the I2C bus scanner"
    }

    fn execute(&self, _args: &Args, ctx: &mut Supervisor, reply: &mut Reply) -> Result<(), ShellError> {
        let slot = ctx
            .registry_mut()
            .spawn(
                apps::bus_scanner,
                SCANNER_PRIORITY,
                SCANNER_STACK_DEPTH,
                SCANNER_TASK_NAME,
            )
            .map_err(registry_error)?;
        let unit = ctx
            .registry()
            .handle(slot)
            .ok_or_else(|| ShellError::ExecutionFailed("scanner task vanished".into()))?;

        ctx.request_handoff(SessionKind::Scanner, unit);
        reply.disable_session();
        let _ = write!(reply, "bus scanner started in slot {}", slot);
        Ok(())
    }
}

pub static I2C_CMD: I2cCommand = I2cCommand;

// ============================================================================
// Scan Command
// ============================================================================

/// Scan command - probes the whole I2C address range
pub struct ScanCommand;

impl Command<Supervisor> for ScanCommand {
    fn name(&self) -> &'static str {
        "scan"
    }
    fn description(&self) -> &'static str {
        "Probe every I2C address"
    }

    fn execute(&self, _args: &Args, ctx: &mut Supervisor, reply: &mut Reply) -> Result<(), ShellError> {
        let found = scan_bus(ctx.board_mut(), reply.console());
        let _ = write!(reply, "{} device(s) found", found);
        Ok(())
    }
}

pub static SCAN_CMD: ScanCommand = ScanCommand;

// ============================================================================
// Probe Command
// ============================================================================

/// Probe command - addresses one I2C device
pub struct ProbeCommand;

impl Command<Supervisor> for ProbeCommand {
    fn name(&self) -> &'static str {
        "probe"
    }
    fn signature(&self) -> &'static [ArgKind] {
        &[ArgKind::UInt]
    }
    fn description(&self) -> &'static str {
        "Probe one I2C address"
    }
    fn usage(&self) -> &'static str {
        "probe <addr>"
    }

    fn execute(&self, args: &Args, ctx: &mut Supervisor, reply: &mut Reply) -> Result<(), ShellError> {
        let addr = args
            .uint(0)
            .and_then(|a| u8::try_from(a).ok())
            .filter(|a| *a <= I2C_SCAN_LAST)
            .ok_or_else(|| ShellError::ExecutionFailed("address must be 0x00..0x7F".into()))?;

        let ack = ctx.board_mut().i2c_probe(addr);
        let _ = write!(reply, "0x{:02X}: {}", addr, if ack { "ack" } else { "no ack" });
        Ok(())
    }
}

pub static PROBE_CMD: ProbeCommand = ProbeCommand;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SimBoard;
    use crate::commands::{create_default_dispatcher, create_scanner_dispatcher};
    use crate::runtime::SimRuntime;
    use alloc::boxed::Box;

    fn supervisor() -> Supervisor {
        Supervisor::new(
            SimRuntime::new(),
            Box::new(SimBoard::new(&[1, 9], &[0x3C, 0x68])),
        )
    }

    #[test]
    fn test_pinfo_rows() {
        let d = create_default_dispatcher();
        let mut sup = supervisor();
        let reply = d.process("pinfo", &mut sup);
        let text = reply.console_text();
        let rows: alloc::vec::Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], "  0:L  1:H  2:L  3:L  4:L  5:L  6:L  7:L");
        assert!(rows[1].starts_with("  8:L  9:H"));
    }

    #[test]
    fn test_i2c_hands_off() {
        let d = create_default_dispatcher();
        let mut sup = supervisor();
        let reply = d.process("i2c", &mut sup);
        assert!(reply.disables_session());
        assert_eq!(reply.response(), "bus scanner started in slot 0");
        assert_eq!(sup.take_handoff(), Some(SessionKind::Scanner));
        assert_eq!(sup.registry().list().rows[0].name, SCANNER_TASK_NAME);
    }

    #[test]
    fn test_i2c_without_slot_keeps_session() {
        let d = create_default_dispatcher();
        let mut sup = supervisor();
        for label in ["a", "b", "c"] {
            let reply = d.process(&alloc::format!("spawn {} 1", label), &mut sup);
            assert!(!reply.response().starts_with("Error"));
        }
        let reply = d.process("i2c", &mut sup);
        assert_eq!(reply.response(), "Error: no free task slots");
        assert!(!reply.disables_session());
        assert_eq!(sup.take_handoff(), None);
    }

    #[test]
    fn test_scan_lists_devices() {
        let d = create_scanner_dispatcher();
        let mut sup = supervisor();
        let reply = d.process("scan", &mut sup);
        assert_eq!(reply.console_text(), "device at 0x3C\r\ndevice at 0x68\r\n");
        assert_eq!(reply.response(), "2 device(s) found");
    }

    #[test]
    fn test_probe() {
        let d = create_scanner_dispatcher();
        let mut sup = supervisor();
        assert_eq!(d.process("probe 0x3c", &mut sup).response(), "0x3C: ack");
        assert_eq!(d.process("probe 16", &mut sup).response(), "0x10: no ack");
        assert_eq!(
            d.process("probe 0x80", &mut sup).response(),
            "Error: address must be 0x00..0x7F"
        );
        assert_eq!(
            d.process("probe -1", &mut sup).response(),
            "Error: argument 1 must be an unsigned integer"
        );
    }
}
