//! Persistence boundary for the booking engine.
//!
//! [`ScheduleStore`] is the contract with the (possibly remote) persistence
//! layer. The engine treats every call as an awaited network round-trip and
//! never issues concurrent mutations against the same resource; freshness is
//! obtained by re-fetching immediately before conflict detection rather than
//! by locking.
//!
//! [`MemoryStore`] is the embedded backend used by the server binary and by
//! tests.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::ScheduleStore;
