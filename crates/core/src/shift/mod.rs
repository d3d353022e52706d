//! Shift time arithmetic and type classification.
//!
//! Durations wrap past midnight, overlap checks are half-open, and the
//! classifier resolves a coarse early/middle/late type from whichever
//! signal a cell carries.

pub mod classify;
pub mod window;

pub use classify::{ClassifiedSlot, SlotClassifier};
pub use window::{TimeWindow, MINUTES_PER_DAY};
