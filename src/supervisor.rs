//! Supervisor state shared by the shell and the scheduler
//!
//! Owns the task registry (and through it the runtime) and the board. The
//! shell dispatches into it, the scheduler ticks it. Interactive sessions are
//! tied to a registered unit: when that unit goes away, the session stops.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use tasksh_registry::{RegistryError, Runtime, SchedState, TaskRegistry};
use tasksh_shell::{Dispatcher, LineHandler, Reply};

use crate::apps;
use crate::board::Board;
use crate::config::{MAX_USER_TASKS, SHELL_PRIORITY, SHELL_STACK_DEPTH};
use crate::runtime::{SimRuntime, UnitId};

pub type Registry = TaskRegistry<SimRuntime, MAX_USER_TASKS>;

/// Name of the resident shell unit
pub const SHELL_TASK_NAME: &str = "USER SHELL";

/// Failure to bring the supervisor up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// The resident shell could not be registered
    ShellSpawn(RegistryError),
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::ShellSpawn(e) => write!(f, "cannot start shell: {}", e),
        }
    }
}

/// Which interactive session should own the input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Scanner,
}

pub struct Supervisor {
    registry: Registry,
    board: Box<dyn Board + Send>,
    /// Unit backing the session currently reading input
    session_unit: Option<UnitId>,
    handoff: Option<(SessionKind, UnitId)>,
}

impl Supervisor {
    pub fn new(runtime: SimRuntime, board: Box<dyn Board + Send>) -> Self {
        Self {
            registry: TaskRegistry::new(runtime),
            board,
            session_unit: None,
            handoff: None,
        }
    }

    /// Register the resident shell unit and bind the session to it
    pub fn boot(&mut self) -> Result<(), BootError> {
        let slot = self
            .registry
            .spawn(
                apps::console_service,
                SHELL_PRIORITY,
                SHELL_STACK_DEPTH,
                SHELL_TASK_NAME,
            )
            .map_err(BootError::ShellSpawn)?;
        self.session_unit = self.registry.handle(slot);
        log::info!("shell registered in slot {}", slot);
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn board(&self) -> &dyn Board {
        self.board.as_ref()
    }

    pub fn board_mut(&mut self) -> &mut dyn Board {
        self.board.as_mut()
    }

    /// `true` while the unit backing the active session is alive.
    /// A session with no backing unit is always alive.
    pub fn session_alive(&self) -> bool {
        match self.session_unit {
            Some(h) => self.registry.runtime().state(h) != SchedState::Deleted,
            None => true,
        }
    }

    /// Run one line through `dispatcher` as the active session's unit
    pub fn dispatch(&mut self, dispatcher: &Dispatcher<Supervisor>, line: &str) -> Reply {
        let unit = self.session_unit;
        let previous = self.registry.runtime_mut().set_current(unit);
        let mut reply = dispatcher.process(line, self);
        self.registry.runtime_mut().set_current(previous);

        if !self.session_alive() {
            log::warn!("session task is gone, input closed");
            reply.disable_session();
        }
        reply
    }

    /// Advance the runtime, reconcile the registry and reclaim exited units.
    /// Returns whatever the units printed.
    pub fn tick(&mut self, now_ms: u64) -> String {
        let runtime = self.registry.runtime_mut();
        runtime.tick(now_ms);
        let freed = self.registry.reap();
        if freed > 0 {
            log::debug!("{} exited task(s) removed from the registry", freed);
        }
        let runtime = self.registry.runtime_mut();
        runtime.cleanup_terminated();
        runtime.take_output()
    }

    /// Ask for the input stream to move to another session backed by `unit`
    pub fn request_handoff(&mut self, kind: SessionKind, unit: UnitId) {
        self.handoff = Some((kind, unit));
    }

    /// Complete a pending handoff, rebinding the active session
    pub fn take_handoff(&mut self) -> Option<SessionKind> {
        let (kind, unit) = self.handoff.take()?;
        self.session_unit = Some(unit);
        log::info!("input handed to {:?} session", kind);
        Some(kind)
    }
}

/// Line handler running every line through a supervisor it borrows
pub struct SupervisorHandler<'a> {
    dispatcher: &'a Dispatcher<Supervisor>,
    supervisor: &'a mut Supervisor,
}

impl<'a> SupervisorHandler<'a> {
    pub fn new(dispatcher: &'a Dispatcher<Supervisor>, supervisor: &'a mut Supervisor) -> Self {
        Self {
            dispatcher,
            supervisor,
        }
    }
}

impl LineHandler for SupervisorHandler<'_> {
    fn handle_line(&mut self, line: &str) -> Reply {
        self.supervisor.dispatch(self.dispatcher, line)
    }
}
