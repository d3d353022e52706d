//! Plan board orchestration.
//!
//! [`PlanBoard`] owns the mutable scheduling state for one plan view and
//! decides every mutation; the traits in [`dispatch`] are the seams to
//! the services that persist what the board decided.

pub mod board;
pub mod dispatch;

pub use board::{BoardError, ConfirmOutcome, PendingProposal, PlanBoard};
pub use dispatch::{
    DispatchError, ScheduleDispatcher, VersionControl, VersionControlError,
};
