use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::model::{ScheduleEntry, ScheduleUpdate};
use crate::reassign::protocol::RejectReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalState {
    Proposed,
    Confirmed,
    RolledBack,
}

/// One optimistic mutation, tracked from proposal to settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// Monotonic per-ledger ordinal; ordering decides staleness.
    pub id: u64,
    /// Idempotency key handed to the dispatch collaborator.
    pub request_id: Uuid,
    pub schedule_id: i64,
    pub update: ScheduleUpdate,
    /// Cell contents before the proposal, kept for rollback bookkeeping.
    pub prior: Option<ScheduleEntry>,
    pub state: ProposalState,
}

/// Tracks in-flight mutations per schedule entry. At most one proposal
/// per entry is current; opening a newer one supersedes the older, and
/// a superseded proposal's confirmation is discarded when it lands.
#[derive(Debug, Default)]
pub struct ProposalLedger {
    next_id: u64,
    proposals: Vec<Proposal>,
    in_flight: HashMap<i64, u64>,
}

impl ProposalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new proposal for `schedule_id` and returns it. Any
    /// earlier open proposal for the same entry is rolled back.
    pub fn open(
        &mut self,
        schedule_id: i64,
        update: ScheduleUpdate,
        prior: Option<ScheduleEntry>,
    ) -> Proposal {
        self.next_id += 1;
        let id = self.next_id;

        if let Some(superseded) = self.in_flight.insert(schedule_id, id) {
            if let Some(previous) = self.proposal_mut(superseded) {
                if previous.state == ProposalState::Proposed {
                    previous.state = ProposalState::RolledBack;
                }
            }
            debug!(schedule_id, superseded, replacement = id, "proposal superseded");
        }

        let proposal = Proposal {
            id,
            request_id: Uuid::now_v7(),
            schedule_id,
            update,
            prior,
            state: ProposalState::Proposed,
        };
        self.proposals.push(proposal.clone());
        proposal
    }

    /// Settles a confirmation. Succeeds only while the proposal is still
    /// the latest open one for its entry; anything else is stale and
    /// must not touch the grid.
    pub fn confirm(&mut self, proposal_id: u64) -> Result<Proposal, RejectReason> {
        let current = self
            .proposal(proposal_id)
            .map(|proposal| {
                proposal.state == ProposalState::Proposed
                    && self.in_flight.get(&proposal.schedule_id) == Some(&proposal_id)
            })
            .unwrap_or(false);

        if !current {
            return Err(RejectReason::StaleProposal { proposal_id });
        }

        let Some(proposal) = self.proposal_mut(proposal_id) else {
            return Err(RejectReason::StaleProposal { proposal_id });
        };
        proposal.state = ProposalState::Confirmed;
        let settled = proposal.clone();
        self.in_flight.remove(&settled.schedule_id);
        Ok(settled)
    }

    /// Rolls back a failed dispatch. The grid was never touched while
    /// the proposal was open, so this is pure bookkeeping.
    pub fn fail(&mut self, proposal_id: u64) -> Option<Proposal> {
        let proposal = self.proposal_mut(proposal_id)?;
        proposal.state = ProposalState::RolledBack;
        let settled = proposal.clone();

        if self.in_flight.get(&settled.schedule_id) == Some(&proposal_id) {
            self.in_flight.remove(&settled.schedule_id);
        }
        debug!(proposal_id, schedule_id = settled.schedule_id, "proposal rolled back");
        Some(settled)
    }

    pub fn get(&self, proposal_id: u64) -> Option<&Proposal> {
        self.proposal(proposal_id)
    }

    /// The currently open proposal for an entry, if any.
    pub fn open_for(&self, schedule_id: i64) -> Option<&Proposal> {
        self.in_flight
            .get(&schedule_id)
            .and_then(|id| self.proposal(*id))
    }

    pub fn history(&self) -> &[Proposal] {
        &self.proposals
    }

    fn proposal(&self, id: u64) -> Option<&Proposal> {
        self.proposals.iter().find(|proposal| proposal.id == id)
    }

    fn proposal_mut(&mut self, id: u64) -> Option<&mut Proposal> {
        self.proposals.iter_mut().find(|proposal| proposal.id == id)
    }
}
