//! Command Dispatcher
//!
//! Static table from command name to handler. The session hands every
//! completed line to a [`LineHandler`]; a dispatcher bound to its context is
//! the usual one.

use alloc::vec::Vec;
use core::fmt::Write;

use crate::args::{coerce, tokenize};
use crate::command::{Command, Reply};
use crate::error::ShellError;

/// Maximum number of commands that can be registered
pub const MAX_COMMANDS: usize = 16;

/// Anything that turns a completed line into a reply
pub trait LineHandler {
    fn handle_line(&mut self, line: &str) -> Reply;
}

/// Registry of available commands for context `C`
pub struct Dispatcher<C: 'static> {
    commands: Vec<&'static dyn Command<C>>,
    response_capacity: usize,
}

impl<C: 'static> Dispatcher<C> {
    /// Create an empty table whose replies hold at most `response_capacity`
    /// bytes of response text
    pub const fn new(response_capacity: usize) -> Self {
        Self {
            commands: Vec::new(),
            response_capacity,
        }
    }

    /// Register a command. Returns `false` if the table is full.
    pub fn register(&mut self, command: &'static dyn Command<C>) -> bool {
        if self.commands.len() >= MAX_COMMANDS {
            log::warn!("command table full, '{}' not registered", command.name());
            return false;
        }
        self.commands.push(command);
        true
    }

    /// Find a command by name or alias
    pub fn find(&self, name: &str) -> Option<&'static dyn Command<C>> {
        self.commands
            .iter()
            .copied()
            .find(|cmd| cmd.name() == name || cmd.aliases().contains(&name))
    }

    /// Get all registered commands
    pub fn commands(&self) -> &[&'static dyn Command<C>] {
        &self.commands
    }

    /// Tokenize, route and run one line.
    ///
    /// Errors never escape: they become an `Error: ...` response. An empty
    /// line yields an empty reply.
    pub fn process(&self, line: &str, ctx: &mut C) -> Reply {
        let mut reply = Reply::new(self.response_capacity);
        if let Err(e) = self.try_process(line, ctx, &mut reply) {
            log::debug!("command '{}' failed: {}", line, e);
            reply.clear_response();
            let _ = write!(reply, "Error: {}", e);
        }
        reply
    }

    fn try_process(&self, line: &str, ctx: &mut C, reply: &mut Reply) -> Result<(), ShellError> {
        let mut tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(());
        }

        let name = tokens.remove(0);
        let command = self
            .find(&name)
            .ok_or(ShellError::UnknownCommand(name))?;
        let args = coerce(tokens, command.signature())?;
        command.execute(&args, ctx, reply)
    }

    /// Pair the table with the context it dispatches into
    pub fn bind<'a>(&'a self, ctx: &'a mut C) -> Bound<'a, C> {
        Bound {
            dispatcher: self,
            ctx,
        }
    }
}

/// A dispatcher together with its context
pub struct Bound<'a, C: 'static> {
    dispatcher: &'a Dispatcher<C>,
    ctx: &'a mut C,
}

impl<C: 'static> LineHandler for Bound<'_, C> {
    fn handle_line(&mut self, line: &str) -> Reply {
        self.dispatcher.process(line, self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{ArgKind, Args};
    use alloc::string::String;

    #[derive(Default)]
    struct Counter {
        total: i64,
        log: Vec<String>,
    }

    struct AddCommand;

    impl Command<Counter> for AddCommand {
        fn name(&self) -> &'static str {
            "add"
        }
        fn aliases(&self) -> &'static [&'static str] {
            &["plus"]
        }
        fn signature(&self) -> &'static [ArgKind] {
            &[ArgKind::Str, ArgKind::Int]
        }
        fn description(&self) -> &'static str {
            "Add a labelled amount"
        }

        fn execute(&self, args: &Args, ctx: &mut Counter, reply: &mut Reply) -> Result<(), ShellError> {
            let label = args.str(0).unwrap_or_default();
            let amount = args.int(1).unwrap_or_default();
            ctx.total += amount;
            ctx.log.push(String::from(label));
            write!(reply, "{} -> {}", label, ctx.total).ok();
            Ok(())
        }
    }

    struct FailCommand;

    impl Command<Counter> for FailCommand {
        fn name(&self) -> &'static str {
            "fail"
        }
        fn description(&self) -> &'static str {
            "Always fails"
        }

        fn execute(&self, _args: &Args, _ctx: &mut Counter, reply: &mut Reply) -> Result<(), ShellError> {
            write!(reply, "partial").ok();
            Err(ShellError::ExecutionFailed(String::from("it broke")))
        }
    }

    static ADD_CMD: AddCommand = AddCommand;
    static FAIL_CMD: FailCommand = FailCommand;

    fn dispatcher() -> Dispatcher<Counter> {
        let mut d = Dispatcher::new(64);
        d.register(&ADD_CMD);
        d.register(&FAIL_CMD);
        d
    }

    #[test]
    fn test_process_runs_handler() {
        let d = dispatcher();
        let mut ctx = Counter::default();

        let reply = d.process("add apples 3", &mut ctx);
        assert_eq!(reply.response(), "apples -> 3");
        let reply = d.process("plus pears -1", &mut ctx);
        assert_eq!(reply.response(), "pears -> 2");
        assert_eq!(ctx.log, ["apples", "pears"]);
    }

    #[test]
    fn test_unknown_command() {
        let d = dispatcher();
        let mut ctx = Counter::default();
        let reply = d.process("launch", &mut ctx);
        assert_eq!(reply.response(), "Error: unknown command 'launch'");
    }

    #[test]
    fn test_argument_errors_leave_context_untouched() {
        let d = dispatcher();
        let mut ctx = Counter::default();

        let reply = d.process("add apples many", &mut ctx);
        assert_eq!(reply.response(), "Error: argument 2 must be an integer");
        let reply = d.process("add apples", &mut ctx);
        assert_eq!(reply.response(), "Error: expected 2 argument(s), got 1");
        assert_eq!(ctx.total, 0);
        assert!(ctx.log.is_empty());
    }

    #[test]
    fn test_handler_error_replaces_partial_response() {
        let d = dispatcher();
        let mut ctx = Counter::default();
        let reply = d.process("fail", &mut ctx);
        assert_eq!(reply.response(), "Error: it broke");
    }

    #[test]
    fn test_empty_line() {
        let d = dispatcher();
        let mut ctx = Counter::default();
        let reply = d.process("   ", &mut ctx);
        assert!(reply.response().is_empty());
        assert!(reply.console_text().is_empty());
    }

    #[test]
    fn test_register_limit() {
        let mut d: Dispatcher<Counter> = Dispatcher::new(16);
        for _ in 0..MAX_COMMANDS {
            assert!(d.register(&ADD_CMD));
        }
        assert!(!d.register(&FAIL_CMD));
        assert_eq!(d.commands().len(), MAX_COMMANDS);
        assert!(d.find("fail").is_none());
    }

    #[test]
    fn test_bound_handler() {
        let d = dispatcher();
        let mut ctx = Counter::default();
        let mut bound = d.bind(&mut ctx);
        let reply = bound.handle_line("add x 5");
        assert_eq!(reply.response(), "x -> 5");
        assert_eq!(ctx.total, 5);
    }
}
