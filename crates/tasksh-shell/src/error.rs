use alloc::string::String;
use core::fmt;

use crate::args::ArgKind;

/// Errors that can occur while dispatching a command line.
///
/// None of these reach the operator as a value: the dispatcher folds them
/// into an `Error: ...` response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// No command registered under this name or alias
    UnknownCommand(String),
    /// Wrong number of positional arguments
    ArgumentCount { expected: usize, got: usize },
    /// Argument at `index` (0-based) could not be coerced
    ArgumentTypeMismatch { index: usize, expected: ArgKind },
    /// A quoted argument was not closed
    UnterminatedQuote,
    /// The handler ran and reported a failure
    ExecutionFailed(String),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::UnknownCommand(name) => write!(f, "unknown command '{}'", name),
            ShellError::ArgumentCount { expected, got } => {
                write!(f, "expected {} argument(s), got {}", expected, got)
            }
            ShellError::ArgumentTypeMismatch { index, expected } => {
                write!(f, "argument {} must be {}", index + 1, expected)
            }
            ShellError::UnterminatedQuote => f.write_str("unterminated quote"),
            ShellError::ExecutionFailed(msg) => f.write_str(msg),
        }
    }
}
