//! Assignment grid index.
//!
//! Turns the flat entry list coming from the schedule service into an
//! employee/date lookup structure with deterministic merge behavior.
//!
//! # Example
//!
//! ```ignore
//! use rota_core::grid::ScheduleIndex;
//!
//! let index = ScheduleIndex::build(&entries);
//! let cell = index.cell(employee_id, date);
//! ```

pub mod cell;
pub mod index;

pub use cell::CellState;
pub use index::ScheduleIndex;
