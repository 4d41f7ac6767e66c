//! Simulated real-time runtime
//!
//! A small priority scheduler that stands in for the board's RTOS. Units are
//! plain functions stepped from `tick`; each step reports whether the unit
//! yields, sleeps or exits. Memory is accounted against a fixed heap the same
//! way a kernel charges a stack plus a control block per unit.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use tasksh_registry::{CreateError, Runtime, SchedState};

use crate::config::{
    BASE_STACK_USAGE, HEAP_SIZE, MAX_PRIORITIES, MAX_TASK_NAME_LEN, MAX_UNITS, TCB_SIZE,
};

/// Opaque unit handle. Ids are never reused, so a stale handle can always be
/// told apart from a live one.
pub type UnitId = u32;

/// What a unit wants after one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run again on the next tick
    Yield,
    /// Block for the given number of milliseconds
    Sleep(u64),
    /// Return from the entry point
    Exit,
}

/// Entry point of a unit, called once per step
pub type EntryFn = fn(&mut UnitContext<'_>) -> Step;

/// What a unit sees while it runs
pub struct UnitContext<'a> {
    now_ms: u64,
    runs: u64,
    stack_used: usize,
    output: &'a mut String,
}

impl UnitContext<'_> {
    /// Runtime clock at the start of this step
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of completed steps before this one
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Record stack consumption for this step
    pub fn use_stack(&mut self, bytes: usize) {
        self.stack_used = self.stack_used.max(bytes);
    }
}

impl fmt::Write for UnitContext<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitState {
    Ready,
    Blocked { wake_at: u64 },
    Suspended,
    /// Returned from its entry point, waiting for `cleanup_terminated`
    Exited,
}

struct Unit {
    id: UnitId,
    name: String,
    priority: u32,
    entry: EntryFn,
    stack_depth: usize,
    stack_peak: usize,
    state: UnitState,
    runs: u64,
}

impl Unit {
    fn heap_cost(&self) -> usize {
        self.stack_depth + TCB_SIZE
    }
}

/// Priority scheduler over a fixed heap
pub struct SimRuntime {
    units: Vec<Unit>,
    next_id: UnitId,
    current: Option<UnitId>,
    now_ms: u64,
    heap_size: usize,
    output: String,
}

impl SimRuntime {
    pub fn new() -> Self {
        Self::with_heap(HEAP_SIZE)
    }

    pub fn with_heap(heap_size: usize) -> Self {
        Self {
            units: Vec::new(),
            next_id: 1,
            current: None,
            now_ms: 0,
            heap_size,
            output: String::new(),
        }
    }

    fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    fn heap_used(&self) -> usize {
        self.units.iter().map(Unit::heap_cost).sum()
    }

    /// Number of units the runtime holds, exited ones included
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Mark `id` as the executing unit. Returns the previous one so the
    /// caller can restore it.
    pub fn set_current(&mut self, id: Option<UnitId>) -> Option<UnitId> {
        core::mem::replace(&mut self.current, id)
    }

    pub fn suspend(&mut self, id: UnitId) -> bool {
        match self.unit_mut(id) {
            Some(u) if u.state != UnitState::Exited => {
                u.state = UnitState::Suspended;
                true
            }
            _ => false,
        }
    }

    pub fn resume(&mut self, id: UnitId) -> bool {
        match self.unit_mut(id) {
            Some(u) if u.state == UnitState::Suspended => {
                u.state = UnitState::Ready;
                true
            }
            _ => false,
        }
    }

    /// Advance the clock to `now_ms` and step every runnable unit once,
    /// highest priority first. Returns the number of steps taken.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;

        for unit in self.units.iter_mut() {
            if let UnitState::Blocked { wake_at } = unit.state {
                if wake_at <= now {
                    unit.state = UnitState::Ready;
                }
            }
        }

        let mut runnable: Vec<(u32, UnitId)> = self
            .units
            .iter()
            .filter(|u| u.state == UnitState::Ready)
            .map(|u| (u.priority, u.id))
            .collect();
        // Highest priority first, oldest unit first within a priority
        runnable.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut steps = 0;
        for (_, id) in runnable {
            // An earlier unit in this tick may not have left it runnable
            if self.unit(id).map(|u| u.state) != Some(UnitState::Ready) {
                continue;
            }
            self.step(id, now);
            steps += 1;
        }
        steps
    }

    fn step(&mut self, id: UnitId, now: u64) {
        let Some(unit) = self.unit(id) else {
            return;
        };
        let entry = unit.entry;
        let runs = unit.runs;

        let previous = self.set_current(Some(id));
        let mut ctx = UnitContext {
            now_ms: now,
            runs,
            stack_used: BASE_STACK_USAGE,
            output: &mut self.output,
        };
        let step = entry(&mut ctx);
        let stack_used = ctx.stack_used;
        self.set_current(previous);

        if let Some(unit) = self.unit_mut(id) {
            unit.runs += 1;
            unit.stack_peak = unit.stack_peak.max(stack_used.min(unit.stack_depth));
            unit.state = match step {
                Step::Yield => UnitState::Ready,
                Step::Sleep(ms) => UnitState::Blocked {
                    wake_at: now.saturating_add(ms),
                },
                Step::Exit => {
                    log::debug!("unit {} '{}' exited", unit.id, unit.name);
                    UnitState::Exited
                }
            };
        }
    }

    /// Reclaim units that returned from their entry point.
    /// Returns the number of units removed.
    pub fn cleanup_terminated(&mut self) -> usize {
        let before = self.units.len();
        self.units.retain(|u| u.state != UnitState::Exited);
        before - self.units.len()
    }

    /// Drain text printed by units since the last call
    pub fn take_output(&mut self) -> String {
        core::mem::take(&mut self.output)
    }
}

impl Default for SimRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest prefix of `label` that fits the runtime's name field
fn truncate_name(label: &str) -> String {
    let mut end = label.len().min(MAX_TASK_NAME_LEN - 1);
    while !label.is_char_boundary(end) {
        end -= 1;
    }
    String::from(&label[..end])
}

impl Runtime for SimRuntime {
    type Handle = UnitId;
    type Entry = EntryFn;

    fn create(
        &mut self,
        entry: EntryFn,
        priority: u32,
        stack_depth: usize,
        label: &str,
    ) -> Result<UnitId, CreateError> {
        if self.units.len() >= MAX_UNITS {
            return Err(CreateError::TooManyUnits);
        }
        if stack_depth + TCB_SIZE > self.free_heap() {
            return Err(CreateError::OutOfMemory);
        }

        let priority = if priority >= MAX_PRIORITIES {
            log::warn!(
                "priority {} for '{}' clamped to {}",
                priority,
                label,
                MAX_PRIORITIES - 1
            );
            MAX_PRIORITIES - 1
        } else {
            priority
        };

        let id = self.next_id;
        self.next_id += 1;
        self.units.push(Unit {
            id,
            name: truncate_name(label),
            priority,
            entry,
            stack_depth,
            stack_peak: 0,
            state: UnitState::Ready,
            runs: 0,
        });
        log::debug!("unit {} created, stack {} bytes", id, stack_depth);
        Ok(id)
    }

    fn delete(&mut self, handle: UnitId) {
        self.units.retain(|u| u.id != handle);
        if self.current == Some(handle) {
            self.current = None;
        }
    }

    fn name(&self, handle: UnitId) -> String {
        self.unit(handle).map(|u| u.name.clone()).unwrap_or_default()
    }

    fn state(&self, handle: UnitId) -> SchedState {
        match self.unit(handle) {
            None => SchedState::Deleted,
            Some(u) if u.state == UnitState::Exited => SchedState::Deleted,
            Some(_) if self.current == Some(handle) => SchedState::Running,
            Some(u) => match u.state {
                UnitState::Ready => SchedState::Ready,
                UnitState::Blocked { .. } => SchedState::Blocked,
                UnitState::Suspended => SchedState::Suspended,
                UnitState::Exited => SchedState::Deleted,
            },
        }
    }

    fn priority(&self, handle: UnitId) -> u32 {
        self.unit(handle).map(|u| u.priority).unwrap_or(0)
    }

    fn stack_high_water(&self, handle: UnitId) -> usize {
        self.unit(handle)
            .map(|u| u.stack_depth - u.stack_peak)
            .unwrap_or(0)
    }

    fn free_heap(&self) -> usize {
        self.heap_size.saturating_sub(self.heap_used())
    }

    fn heap_size(&self) -> usize {
        self.heap_size
    }

    fn current(&self) -> Option<UnitId> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    fn idle(_: &mut UnitContext<'_>) -> Step {
        Step::Sleep(1000)
    }

    fn spin(_: &mut UnitContext<'_>) -> Step {
        Step::Yield
    }

    fn once(ctx: &mut UnitContext<'_>) -> Step {
        write!(ctx, "bye").ok();
        Step::Exit
    }

    fn deep(ctx: &mut UnitContext<'_>) -> Step {
        ctx.use_stack(1500);
        Step::Yield
    }

    fn tag_a(ctx: &mut UnitContext<'_>) -> Step {
        write!(ctx, "a").ok();
        Step::Yield
    }

    fn tag_b(ctx: &mut UnitContext<'_>) -> Step {
        write!(ctx, "b").ok();
        Step::Yield
    }

    #[test]
    fn test_create_charges_heap() {
        let mut rt = SimRuntime::with_heap(10_000);
        assert_eq!(rt.free_heap(), 10_000);
        rt.create(idle, 1, 2000, "t").unwrap();
        assert_eq!(rt.free_heap(), 10_000 - 2000 - TCB_SIZE);
        assert_eq!(rt.heap_size(), 10_000);
    }

    #[test]
    fn test_out_of_memory() {
        let mut rt = SimRuntime::with_heap(3000);
        assert_eq!(rt.create(idle, 1, 4000, "big"), Err(CreateError::OutOfMemory));
        assert_eq!(rt.unit_count(), 0);
    }

    #[test]
    fn test_unit_table_full() {
        let mut rt = SimRuntime::new();
        for _ in 0..MAX_UNITS {
            rt.create(idle, 1, 100, "u").unwrap();
        }
        assert_eq!(rt.create(idle, 1, 100, "u"), Err(CreateError::TooManyUnits));
    }

    #[test]
    fn test_priority_clamped() {
        let mut rt = SimRuntime::new();
        let h = rt.create(idle, 99, 100, "hi").unwrap();
        assert_eq!(rt.priority(h), MAX_PRIORITIES - 1);
    }

    #[test]
    fn test_name_truncated() {
        let mut rt = SimRuntime::new();
        let h = rt.create(idle, 1, 100, "a-very-long-task-name").unwrap();
        assert_eq!(rt.name(h), "a-very-long-tas");
    }

    #[test]
    fn test_states_follow_steps() {
        let mut rt = SimRuntime::new();
        let sleeper = rt.create(idle, 1, 100, "sleeper").unwrap();
        assert_eq!(rt.state(sleeper), SchedState::Ready);

        rt.tick(0);
        assert_eq!(rt.state(sleeper), SchedState::Blocked);
        rt.tick(999);
        assert_eq!(rt.state(sleeper), SchedState::Blocked);
        rt.tick(1000);
        // Woken and stepped again in the same tick
        assert_eq!(rt.state(sleeper), SchedState::Blocked);

        assert!(rt.suspend(sleeper));
        assert_eq!(rt.state(sleeper), SchedState::Suspended);
        assert_eq!(rt.tick(5000), 0);
        assert!(rt.resume(sleeper));
        assert_eq!(rt.state(sleeper), SchedState::Ready);
    }

    #[test]
    fn test_current_is_running() {
        let mut rt = SimRuntime::new();
        let h = rt.create(spin, 1, 100, "shell").unwrap();
        let prev = rt.set_current(Some(h));
        assert_eq!(prev, None);
        assert_eq!(rt.state(h), SchedState::Running);
        assert_eq!(rt.current(), Some(h));
        rt.set_current(prev);
        assert_eq!(rt.state(h), SchedState::Ready);
    }

    #[test]
    fn test_exit_then_cleanup() {
        let mut rt = SimRuntime::with_heap(10_000);
        let h = rt.create(once, 1, 1000, "once").unwrap();
        rt.tick(0);
        assert_eq!(rt.take_output(), "bye");
        assert_eq!(rt.state(h), SchedState::Deleted);
        // Memory comes back only once the unit is reclaimed
        assert!(rt.free_heap() < 10_000);
        assert_eq!(rt.cleanup_terminated(), 1);
        assert_eq!(rt.free_heap(), 10_000);
        assert_eq!(rt.state(h), SchedState::Deleted);
    }

    #[test]
    fn test_delete_frees_and_ids_not_reused() {
        let mut rt = SimRuntime::new();
        let a = rt.create(idle, 1, 100, "a").unwrap();
        rt.delete(a);
        assert_eq!(rt.state(a), SchedState::Deleted);
        let b = rt.create(idle, 1, 100, "b").unwrap();
        assert_ne!(a, b);
        assert_eq!(rt.name(a), "");
    }

    #[test]
    fn test_priority_order() {
        let mut rt = SimRuntime::new();
        rt.create(tag_a, 1, 100, "low").unwrap();
        rt.create(tag_b, 7, 100, "high").unwrap();
        assert_eq!(rt.tick(0), 2);
        assert_eq!(rt.take_output(), "ba");
    }

    #[test]
    fn test_stack_high_water() {
        let mut rt = SimRuntime::new();
        let h = rt.create(deep, 1, 2048, "deep").unwrap();
        assert_eq!(rt.stack_high_water(h), 2048);
        rt.tick(0);
        assert_eq!(rt.stack_high_water(h), 2048 - 1500);
    }
}
