//! Point-in-time snapshots of the current process.
//!
//! [`ProcessSnapshot`] captures stable host-identity facts once at
//! construction (pid, logical cores, host and domain names) and refreshes
//! resource counters (memory, open handles, threads) only when
//! [`ProcessSnapshot::sample`] is called. [`ProcessSnapshot::record`] exports
//! the whole thing as a flat, serde-serializable record for logging or
//! diagnostics.

pub mod config;
pub mod system;

pub use system::snapshot::{ProcessSnapshot, SnapshotError, SnapshotRecord};
