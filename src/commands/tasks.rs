//! Task commands
//!
//! Commands: spawn, ps, kill

use core::fmt::Write;

use tasksh_registry::Runtime;
use tasksh_shell::{ArgKind, Args, Command, Reply, ShellError};

use super::registry_error;
use crate::apps;
use crate::config::USER_TASK_STACK_DEPTH;
use crate::supervisor::Supervisor;

// ============================================================================
// Spawn Command
// ============================================================================

/// Spawn command - starts a heartbeat task in the first free slot
pub struct SpawnCommand;

impl Command<Supervisor> for SpawnCommand {
    fn name(&self) -> &'static str {
        "spawn"
    }
    fn signature(&self) -> &'static [ArgKind] {
        &[ArgKind::Str, ArgKind::Int]
    }
    fn description(&self) -> &'static str {
        "Start a task"
    }
    fn usage(&self) -> &'static str {
        "spawn <label> <priority>"
    }

    fn execute(&self, args: &Args, ctx: &mut Supervisor, reply: &mut Reply) -> Result<(), ShellError> {
        let label = args.str(0).unwrap_or_default();
        let priority = args
            .int(1)
            .and_then(|p| u32::try_from(p).ok())
            .ok_or_else(|| ShellError::ExecutionFailed("priority out of range".into()))?;

        let slot = ctx
            .registry_mut()
            .spawn(apps::heartbeat, priority, USER_TASK_STACK_DEPTH, label)
            .map_err(registry_error)?;

        let _ = write!(reply, "spawned '{}' in slot {}", label, slot);
        Ok(())
    }
}

pub static SPAWN_CMD: SpawnCommand = SpawnCommand;

// ============================================================================
// Ps Command
// ============================================================================

/// Ps command - lists registered tasks
pub struct PsCommand;

impl Command<Supervisor> for PsCommand {
    fn name(&self) -> &'static str {
        "ps"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["top"]
    }
    fn description(&self) -> &'static str {
        "List tasks with state and stack headroom"
    }

    fn execute(&self, _args: &Args, ctx: &mut Supervisor, reply: &mut Reply) -> Result<(), ShellError> {
        let registry = ctx.registry();
        let listing = registry.list();
        let current = registry.current_slot();
        let out = reply.console();

        let _ = write!(out, "{}/{}\r\n", listing.free_heap, listing.heap_size);
        out.push_str("  ID  NAME             STATE      PRIORITY  MEM_USAGE\r\n");
        for row in &listing.rows {
            let mark = if current == Some(row.slot) { '*' } else { ' ' };
            let _ = write!(
                out,
                "{} {:>2}  {:<15}  {}  {:>8}  {:>9}\r\n",
                mark,
                row.slot,
                row.name,
                row.state.name(),
                row.priority,
                row.stack_high_water
            );
        }
        if listing.rows.is_empty() {
            out.push_str("(no tasks)\r\n");
        }

        log::trace!(
            "ps: {}/{} slots in use, {} runtime units",
            registry.in_use(),
            registry.capacity(),
            registry.runtime().unit_count()
        );
        Ok(())
    }
}

pub static PS_CMD: PsCommand = PsCommand;

// ============================================================================
// Kill Command
// ============================================================================

/// Kill command - terminates the task in a slot
pub struct KillCommand;

impl Command<Supervisor> for KillCommand {
    fn name(&self) -> &'static str {
        "kill"
    }
    fn signature(&self) -> &'static [ArgKind] {
        &[ArgKind::UInt]
    }
    fn description(&self) -> &'static str {
        "Terminate the task in a slot"
    }
    fn usage(&self) -> &'static str {
        "kill <slot>"
    }

    fn execute(&self, args: &Args, ctx: &mut Supervisor, reply: &mut Reply) -> Result<(), ShellError> {
        let slot = args
            .uint(0)
            .and_then(|s| usize::try_from(s).ok())
            .unwrap_or(usize::MAX);

        let name = ctx
            .registry()
            .handle(slot)
            .map(|h| ctx.registry().runtime().name(h));
        ctx.registry_mut().kill(slot).map_err(registry_error)?;

        let _ = write!(reply, "killed '{}' in slot {}", name.unwrap_or_default(), slot);
        Ok(())
    }
}

pub static KILL_CMD: KillCommand = KillCommand;
