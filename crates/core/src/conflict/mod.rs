//! Conflict detection for cell mutations.
//!
//! Absence containment and slot occupancy are pure lookups here; the
//! reassignment protocol decides what to do with a hit.

pub mod absence;
pub mod slot;

pub use absence::find_absence;
pub use slot::blocking_entry;
