//! Shell Commands
//!
//! Command implementations organized by category, and the tables the two
//! interactive sessions dispatch through.

pub mod diag;
pub mod tasks;

use alloc::string::ToString;
use core::fmt::Write;

use tasksh_registry::RegistryError;
use tasksh_shell::{Args, Command, Dispatcher, Reply, ShellError};

use crate::config::RESPONSE_BUFFER_SIZE;
use crate::supervisor::Supervisor;

pub use diag::{I2C_CMD, PINFO_CMD, PROBE_CMD, SCAN_CMD};
pub use tasks::{KILL_CMD, PS_CMD, SPAWN_CMD};

type Table = [&'static dyn Command<Supervisor>];

/// Commands of the resident shell
pub static SHELL_COMMANDS: [&'static dyn Command<Supervisor>; 6] =
    [&SPAWN_CMD, &PS_CMD, &KILL_CMD, &PINFO_CMD, &I2C_CMD, &HELP_CMD];

/// Commands of the bus-scanner session
pub static SCANNER_COMMANDS: [&'static dyn Command<Supervisor>; 3] =
    [&SCAN_CMD, &PROBE_CMD, &SCANNER_HELP_CMD];

fn table_dispatcher(table: &'static Table) -> Dispatcher<Supervisor> {
    let mut dispatcher = Dispatcher::new(RESPONSE_BUFFER_SIZE);
    for command in table {
        dispatcher.register(*command);
    }
    dispatcher
}

/// Create the dispatcher of the resident shell
pub fn create_default_dispatcher() -> Dispatcher<Supervisor> {
    table_dispatcher(&SHELL_COMMANDS)
}

/// Create the dispatcher of the bus-scanner session
pub fn create_scanner_dispatcher() -> Dispatcher<Supervisor> {
    table_dispatcher(&SCANNER_COMMANDS)
}

/// Surface a registry failure as a command failure
pub(crate) fn registry_error(e: RegistryError) -> ShellError {
    ShellError::ExecutionFailed(e.to_string())
}

// ============================================================================
// Help Command
// ============================================================================

/// Help command - lists the commands of one table
pub struct HelpCommand {
    table: &'static Table,
}

impl Command<Supervisor> for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }
    fn description(&self) -> &'static str {
        "Show this help"
    }

    fn execute(&self, _args: &Args, _ctx: &mut Supervisor, reply: &mut Reply) -> Result<(), ShellError> {
        let out = reply.console();
        out.push_str("Available commands:\r\n");
        for command in self.table {
            let mut names = command.usage().to_string();
            for alias in command.aliases() {
                let _ = write!(names, " | {}", alias);
            }
            let _ = write!(out, "  {:<24}- {}\r\n", names, command.description());
        }
        Ok(())
    }
}

pub static HELP_CMD: HelpCommand = HelpCommand {
    table: &SHELL_COMMANDS,
};

pub static SCANNER_HELP_CMD: HelpCommand = HelpCommand {
    table: &SCANNER_COMMANDS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SimBoard;
    use crate::runtime::SimRuntime;
    use alloc::boxed::Box;

    fn supervisor() -> Supervisor {
        Supervisor::new(SimRuntime::new(), Box::new(SimBoard::default()))
    }

    #[test]
    fn test_default_dispatcher_has_all_commands() {
        let d = create_default_dispatcher();
        for name in ["spawn", "ps", "top", "kill", "pinfo", "i2c", "help"] {
            assert!(d.find(name).is_some(), "missing {}", name);
        }
        assert!(d.find("scan").is_none());
    }

    #[test]
    fn test_scanner_dispatcher() {
        let d = create_scanner_dispatcher();
        for name in ["scan", "probe", "help"] {
            assert!(d.find(name).is_some(), "missing {}", name);
        }
        assert!(d.find("spawn").is_none());
    }

    #[test]
    fn test_help_lists_usage_and_aliases() {
        let d = create_default_dispatcher();
        let mut sup = supervisor();
        let reply = d.process("help", &mut sup);
        let text = reply.console_text();
        assert!(text.starts_with("Available commands:\r\n"));
        assert!(text.contains("spawn <label> <priority>"));
        assert!(text.contains("ps | top"));
        assert!(!text.contains("probe <addr>"));
        assert!(reply.response().is_empty());
    }
}
