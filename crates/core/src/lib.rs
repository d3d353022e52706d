pub mod conflict;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod grid;
pub mod lifecycle;
pub mod model;
pub mod reassign;
pub mod shift;
pub mod validation;

pub use engine::board::{BoardError, ConfirmOutcome, PendingProposal, PlanBoard};
pub use engine::dispatch::{
    DispatchError, ScheduleDispatcher, VersionControl, VersionControlError,
};
pub use error::{CoreError, Result};
pub use grid::{CellState, ScheduleIndex};
pub use lifecycle::{LifecycleError, VersionActions};
pub use model::plan_store::{PlanStore, PlanStoreError};
pub use reassign::{EditRequest, MoveRequest, ProposalLedger, RejectReason};
pub use shift::{SlotClassifier, TimeWindow};
