//! Optimistic reassignment protocol.
//!
//! A mutation runs through three stages: precondition checks produce a
//! [`ScheduleUpdate`](crate::model::ScheduleUpdate), the ledger tracks
//! it while the caller dispatches, and the settlement either applies
//! the persisted entry or rolls the proposal back. Responses can land
//! out of order; the ledger keeps the grid converging on the newest
//! user action.
//!
//! # Example
//!
//! ```ignore
//! use rota_core::reassign::protocol::propose_move;
//!
//! let update = propose_move(&source, &version, &request, &index, &absences)?;
//! let proposal = ledger.open(source.id, update, Some(source.clone()));
//! ```

pub mod ledger;
pub mod protocol;

pub use ledger::{Proposal, ProposalLedger, ProposalState};
pub use protocol::{propose_clear, propose_edit, propose_move, EditRequest, MoveRequest, RejectReason};
