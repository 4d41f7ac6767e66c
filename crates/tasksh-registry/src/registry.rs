//! Fixed-capacity slot table
//!
//! Slots are scanned in ascending index order, so allocation is first-fit and
//! deterministic. Every scan visits at most `N` slots; there is no free list
//! and no generation counter.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::runtime::{CreateError, Runtime, SchedState};

/// Index of a slot in the registry
pub type SlotId = usize;

/// Errors returned by registry operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Every slot is in use; nothing was changed
    OutOfSlots,
    /// The runtime refused to create the unit; the chosen slot stays free
    CreationFailed(CreateError),
    /// Slot out of range or not in use; nothing was changed
    NothingToKill,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::OutOfSlots => f.write_str("no free task slots"),
            RegistryError::CreationFailed(cause) => write!(f, "task creation failed: {}", cause),
            RegistryError::NothingToKill => f.write_str("nothing to kill"),
        }
    }
}

/// One entry of the table. The handle is only present while the slot is in use.
#[derive(Debug, Clone, Copy)]
struct TaskSlot<H> {
    handle: Option<H>,
}

impl<H> TaskSlot<H> {
    const fn empty() -> Self {
        Self { handle: None }
    }

    fn in_use(&self) -> bool {
        self.handle.is_some()
    }
}

/// Snapshot of one in-use slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub slot: SlotId,
    pub name: String,
    pub state: SchedState,
    pub priority: u32,
    /// Minimum free stack ever observed, in bytes
    pub stack_high_water: usize,
}

/// Result of [`TaskRegistry::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListing {
    pub free_heap: usize,
    pub heap_size: usize,
    /// In-use slots in ascending slot order
    pub rows: Vec<TaskRow>,
}

/// Registry of user tasks, `N` slots over runtime `R`
pub struct TaskRegistry<R: Runtime, const N: usize> {
    runtime: R,
    slots: [TaskSlot<R::Handle>; N],
}

impl<R: Runtime, const N: usize> TaskRegistry<R, N> {
    /// Create a registry with every slot free
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            slots: core::array::from_fn(|_| TaskSlot::empty()),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of slots currently in use
    pub fn in_use(&self) -> usize {
        self.slots.iter().filter(|s| s.in_use()).count()
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Handle bound to `slot`, if the slot is in use
    pub fn handle(&self, slot: SlotId) -> Option<R::Handle> {
        self.slots.get(slot).and_then(|s| s.handle)
    }

    fn free_slot(&self) -> Option<SlotId> {
        self.slots.iter().position(|s| !s.in_use())
    }

    /// Spawn a unit into the first free slot.
    pub fn spawn(
        &mut self,
        entry: R::Entry,
        priority: u32,
        stack_depth: usize,
        label: &str,
    ) -> Result<SlotId, RegistryError> {
        let slot = self.free_slot().ok_or(RegistryError::OutOfSlots)?;

        let handle = self
            .runtime
            .create(entry, priority, stack_depth, label)
            .map_err(|e| {
                log::warn!("spawn '{}' failed: {}", label, e);
                RegistryError::CreationFailed(e)
            })?;

        self.slots[slot].handle = Some(handle);
        log::info!("task '{}' spawned in slot {}", label, slot);
        Ok(slot)
    }

    /// Terminate the unit in `slot` and free the slot.
    ///
    /// A slot whose unit already terminated on its own is freed without
    /// touching the stale handle.
    pub fn kill(&mut self, slot: SlotId) -> Result<(), RegistryError> {
        let handle = self.handle(slot).ok_or(RegistryError::NothingToKill)?;

        if self.runtime.state(handle) == SchedState::Deleted {
            log::warn!("slot {} held a task that already exited", slot);
            self.slots[slot].handle = None;
            return Ok(());
        }

        self.runtime.delete(handle);
        self.slots[slot].handle = None;
        log::info!("task in slot {} killed", slot);
        Ok(())
    }

    /// Snapshot of every in-use slot plus the heap header
    pub fn list(&self) -> TaskListing {
        let rows = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, s)| s.handle.map(|h| (slot, h)))
            .map(|(slot, h)| TaskRow {
                slot,
                name: self.runtime.name(h),
                state: self.runtime.state(h),
                priority: self.runtime.priority(h),
                stack_high_water: self.runtime.stack_high_water(h),
            })
            .collect();

        TaskListing {
            free_heap: self.runtime.free_heap(),
            heap_size: self.runtime.heap_size(),
            rows,
        }
    }

    /// Slot of the unit that is executing right now, if it is registered
    pub fn current_slot(&self) -> Option<SlotId> {
        let current = self.runtime.current()?;
        self.slots.iter().position(|s| s.handle == Some(current))
    }

    /// Free every slot whose unit the runtime reports as deleted.
    ///
    /// Units that return from their entry point are not reported to the
    /// registry directly; this is the reconciliation pass. Returns the number
    /// of slots freed.
    pub fn reap(&mut self) -> usize {
        let mut freed = 0;
        for (slot, s) in self.slots.iter_mut().enumerate() {
            if let Some(h) = s.handle {
                if self.runtime.state(h) == SchedState::Deleted {
                    log::debug!("reaping exited task in slot {}", slot);
                    s.handle = None;
                    freed += 1;
                }
            }
        }
        freed
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
