//! Runtime capability
//!
//! The registry never schedules anything itself. Everything it knows about an
//! execution unit comes through this trait, which a board port implements on
//! top of its real-time kernel.

use alloc::string::String;
use core::fmt;

/// Scheduling state reported by the runtime for one execution unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedState {
    /// Currently executing
    Running,
    /// Runnable, waiting for the CPU
    Ready,
    /// Waiting on a delay or an event
    Blocked,
    /// Explicitly suspended
    Suspended,
    /// Terminated but not yet reclaimed
    Deleted,
    /// The runtime could not classify the unit
    Unknown,
}

impl SchedState {
    /// Fixed-width display name, used for table output
    pub fn name(&self) -> &'static str {
        match self {
            SchedState::Running => "Running  ",
            SchedState::Ready => "Ready    ",
            SchedState::Blocked => "Blocked  ",
            SchedState::Suspended => "Suspended",
            SchedState::Deleted => "Deleted  ",
            SchedState::Unknown => "Unknown  ",
        }
    }
}

impl fmt::Display for SchedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end())
    }
}

/// Why the runtime refused to create an execution unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateError {
    /// Not enough heap for the unit's stack and control block
    OutOfMemory,
    /// The runtime's own unit table is full
    TooManyUnits,
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::OutOfMemory => f.write_str("out of memory"),
            CreateError::TooManyUnits => f.write_str("runtime unit table full"),
        }
    }
}

/// Operations the registry needs from the underlying scheduler.
///
/// Handles are opaque tokens. The runtime owns each unit's stack and memory;
/// the registry only keeps the handle.
pub trait Runtime {
    /// Opaque reference to an execution unit
    type Handle: Copy + Eq + fmt::Debug;

    /// Entry point type accepted by `create`
    type Entry: Copy;

    /// Create a unit running `entry` with the given priority, stack budget
    /// and human-readable label.
    fn create(
        &mut self,
        entry: Self::Entry,
        priority: u32,
        stack_depth: usize,
        label: &str,
    ) -> Result<Self::Handle, CreateError>;

    /// Forcibly terminate a unit. No cleanup runs inside the unit.
    fn delete(&mut self, handle: Self::Handle);

    /// Label the unit was created with (possibly truncated by the runtime)
    fn name(&self, handle: Self::Handle) -> String;

    fn state(&self, handle: Self::Handle) -> SchedState;

    fn priority(&self, handle: Self::Handle) -> u32;

    /// Minimum free stack ever observed for the unit, in bytes
    fn stack_high_water(&self, handle: Self::Handle) -> usize;

    /// Bytes of heap currently free
    fn free_heap(&self) -> usize;

    /// Total heap managed by the runtime
    fn heap_size(&self) -> usize;

    /// The unit currently executing, or `None` for the boot context
    fn current(&self) -> Option<Self::Handle>;
}
