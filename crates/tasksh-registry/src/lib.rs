//! Task Registry
//!
//! Bookkeeping for a bounded set of user-spawned execution units. The registry
//! owns slot allocation and reclamation; creating, running and destroying the
//! units themselves is delegated to a [`Runtime`] implementation.
//!
//! - `runtime.rs` - the capability trait the registry calls into
//! - `registry.rs` - the fixed-capacity slot table and its operations

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod registry;
pub mod runtime;

pub use registry::{RegistryError, SlotId, TaskListing, TaskRegistry, TaskRow};
pub use runtime::{CreateError, Runtime, SchedState};
