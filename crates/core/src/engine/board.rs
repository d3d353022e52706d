use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::conflict::find_absence;
use crate::coverage::{self, EmployeeHours, VersionCoverage};
use crate::error::CoreError;
use crate::grid::{CellState, ScheduleIndex};
use crate::lifecycle::{self, LifecycleError, VersionActions};
use crate::model::{AbsenceRecord, ScheduleEntry, ScheduleUpdate, VersionMeta, VersionStatus};
use crate::reassign::ledger::{Proposal, ProposalLedger};
use crate::reassign::protocol::{self, EditRequest, MoveRequest, RejectReason};
use crate::shift::SlotClassifier;
use crate::validation;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Rejected(#[from] RejectReason),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("schedule entry {schedule_id} is not loaded")]
    UnknownEntry { schedule_id: i64 },
    #[error("version {version} is not loaded")]
    UnknownVersion { version: i32 },
    #[error("proposal {proposal_id} was never opened")]
    UnknownProposal { proposal_id: u64 },
}

/// A validated mutation registered with the ledger, waiting for the
/// caller to dispatch it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingProposal {
    pub proposal_id: u64,
    pub request_id: Uuid,
    pub schedule_id: i64,
    pub update: ScheduleUpdate,
}

/// Outcome of feeding a dispatch response back into the board.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// The persisted entry was applied and the index rebuilt.
    Applied(ScheduleEntry),
    /// A newer proposal superseded this one; nothing changed.
    Stale { proposal_id: u64 },
}

/// Mutable scheduling state for one plan view.
///
/// The board owns the entry list, the version table, the cell index for
/// the active version, and the proposal ledger. It never talks to the
/// network: proposals go out through the caller and come back through
/// [`confirm_proposal`](PlanBoard::confirm_proposal) or
/// [`fail_proposal`](PlanBoard::fail_proposal).
#[derive(Debug)]
pub struct PlanBoard {
    entries: Vec<ScheduleEntry>,
    versions: BTreeMap<i32, VersionMeta>,
    active_version: i32,
    index: ScheduleIndex,
    ledger: ProposalLedger,
    classifier: SlotClassifier,
}

impl PlanBoard {
    pub fn new(classifier: SlotClassifier) -> Self {
        Self {
            entries: Vec::new(),
            versions: BTreeMap::new(),
            active_version: 0,
            index: ScheduleIndex::default(),
            ledger: ProposalLedger::new(),
            classifier,
        }
    }

    /// Replaces the loaded entry set. A malformed record is a contract
    /// violation by the schedule service, not an interaction reject.
    pub fn load_entries(&mut self, entries: Vec<ScheduleEntry>) -> crate::error::Result<()> {
        validation::validate_entries(&entries)
            .map_err(|error| CoreError::invalid_entry(format!("{error:#}")))?;
        self.entries = entries;
        self.rebuild_index();
        Ok(())
    }

    /// Merges additional entries into the loaded set, for example the
    /// copies created by a version duplication.
    pub fn ingest_entries(&mut self, entries: Vec<ScheduleEntry>) -> crate::error::Result<()> {
        validation::validate_entries(&entries)
            .map_err(|error| CoreError::invalid_entry(format!("{error:#}")))?;
        for entry in entries {
            self.upsert_entry(entry);
        }
        self.rebuild_index();
        Ok(())
    }

    pub fn load_versions(&mut self, versions: Vec<VersionMeta>) {
        self.versions = versions
            .into_iter()
            .map(|meta| (meta.version, meta))
            .collect();
    }

    pub fn set_active_version(&mut self, version: i32) -> Result<(), BoardError> {
        if !self.versions.contains_key(&version) {
            return Err(BoardError::UnknownVersion { version });
        }
        self.active_version = version;
        self.rebuild_index();
        Ok(())
    }

    pub fn active_version(&self) -> i32 {
        self.active_version
    }

    pub fn index(&self) -> &ScheduleIndex {
        &self.index
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn versions(&self) -> impl Iterator<Item = &VersionMeta> {
        self.versions.values()
    }

    pub fn version(&self, version: i32) -> Option<&VersionMeta> {
        self.versions.get(&version)
    }

    pub fn classifier(&self) -> &SlotClassifier {
        &self.classifier
    }

    // ------------------------------------------------------------------
    // Cell mutations
    // ------------------------------------------------------------------

    pub fn propose_move(
        &mut self,
        request: &MoveRequest,
        absences: &[AbsenceRecord],
    ) -> Result<PendingProposal, BoardError> {
        let source = self.source_entry(request.source_schedule_id)?;
        let version = self.version_meta(source.version)?.clone();

        let update = protocol::propose_move(&source, &version, request, &self.index, absences)?;
        Ok(self.register(source, update))
    }

    pub fn propose_clear(&mut self, schedule_id: i64) -> Result<PendingProposal, BoardError> {
        let source = self.source_entry(schedule_id)?;
        let version = self.version_meta(source.version)?.clone();

        let update = protocol::propose_clear(&source, &version)?;
        Ok(self.register(source, update))
    }

    pub fn propose_edit(&mut self, request: &EditRequest) -> Result<PendingProposal, BoardError> {
        let source = self.source_entry(request.schedule_id)?;
        let version = self.version_meta(source.version)?.clone();

        let update = protocol::propose_edit(&source, &version, request, &self.index)?;
        Ok(self.register(source, update))
    }

    /// Applies a dispatch response. A stale confirmation is swallowed:
    /// logged, reported, and kept away from the grid.
    pub fn confirm_proposal(
        &mut self,
        proposal_id: u64,
        persisted: ScheduleEntry,
    ) -> Result<ConfirmOutcome, BoardError> {
        if self.ledger.get(proposal_id).is_none() {
            return Err(BoardError::UnknownProposal { proposal_id });
        }

        match self.ledger.confirm(proposal_id) {
            Ok(_) => {
                validation::validate_entry(&persisted)
                    .map_err(|error| CoreError::invalid_entry(format!("{error:#}")))?;
                self.upsert_entry(persisted.clone());
                self.rebuild_index();
                Ok(ConfirmOutcome::Applied(persisted))
            }
            Err(RejectReason::StaleProposal { proposal_id }) => {
                debug!(proposal_id, "stale confirmation discarded");
                Ok(ConfirmOutcome::Stale { proposal_id })
            }
            Err(other) => Err(BoardError::Rejected(other)),
        }
    }

    /// Records a failed dispatch and returns the retryable reject the
    /// caller should surface. The grid was never touched in flight.
    pub fn fail_proposal(
        &mut self,
        proposal_id: u64,
        message: impl Into<String>,
    ) -> Result<RejectReason, BoardError> {
        self.ledger
            .fail(proposal_id)
            .ok_or(BoardError::UnknownProposal { proposal_id })?;
        Ok(RejectReason::UpstreamFailure {
            message: message.into(),
        })
    }

    pub fn proposal(&self, proposal_id: u64) -> Option<&Proposal> {
        self.ledger.get(proposal_id)
    }

    pub fn open_proposal_for(&self, schedule_id: i64) -> Option<&Proposal> {
        self.ledger.open_for(schedule_id)
    }

    // ------------------------------------------------------------------
    // Version lifecycle
    // ------------------------------------------------------------------

    pub fn version_actions(&self, version: i32) -> Result<VersionActions, BoardError> {
        let meta = self.version_meta(version)?;
        Ok(lifecycle::version_actions(meta.status))
    }

    /// Records a transition the version service carried out.
    pub fn apply_transition(
        &mut self,
        version: i32,
        target: VersionStatus,
    ) -> Result<(), BoardError> {
        let meta = self
            .versions
            .get_mut(&version)
            .ok_or(BoardError::UnknownVersion { version })?;
        lifecycle::transition(meta, target)?;
        Ok(())
    }

    /// Registers a version the collaborator created or returned.
    pub fn record_version(&mut self, meta: VersionMeta) {
        self.versions.insert(meta.version, meta);
    }

    pub fn next_version(&self) -> i32 {
        lifecycle::next_version(self.versions.keys().copied())
    }

    /// Books a duplicate of `source_version` as the next free number.
    /// The entry copies arrive separately through
    /// [`ingest_entries`](PlanBoard::ingest_entries).
    pub fn duplicate_version(&mut self, source_version: i32) -> Result<VersionMeta, BoardError> {
        let source = self.version_meta(source_version)?.clone();
        let copy = lifecycle::duplicate_of(&source, self.next_version());

        debug!(source = source_version, copy = copy.version, "version duplicated");
        self.versions.insert(copy.version, copy.clone());
        Ok(copy)
    }

    pub fn update_notes(&mut self, version: i32, notes: Option<String>) -> Result<(), BoardError> {
        let meta = self
            .versions
            .get_mut(&version)
            .ok_or(BoardError::UnknownVersion { version })?;
        lifecycle::update_notes(meta, notes)?;
        Ok(())
    }

    /// Drops a version and every entry it owns, and reports how many
    /// entries went with it. Destructive; callers confirm with the user
    /// before getting here.
    pub fn delete_version(&mut self, version: i32) -> Result<usize, BoardError> {
        if self.versions.remove(&version).is_none() {
            return Err(BoardError::UnknownVersion { version });
        }

        let before = self.entries.len();
        self.entries.retain(|entry| entry.version != version);
        let removed = before - self.entries.len();

        debug!(version, removed, "version deleted");

        if version == self.active_version {
            // the board must not keep showing a deleted version
            self.active_version = self.versions.keys().min().copied().unwrap_or(0);
            self.rebuild_index();
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Read models
    // ------------------------------------------------------------------

    pub fn cell_state(
        &self,
        employee_id: i64,
        date: NaiveDate,
        absences: &[AbsenceRecord],
    ) -> CellState {
        let entry = self.index.cell(employee_id, date).cloned();
        let absence = find_absence(employee_id, date, absences).cloned();

        let (shift_type, duration_hours) = match &entry {
            Some(entry) if !entry.is_empty() => {
                let slot = self.classifier.classify(entry, None);
                (slot.shift_type, slot.duration_hours)
            }
            _ => (None, 0.0),
        };

        CellState {
            entry,
            absence,
            shift_type,
            duration_hours,
        }
    }

    pub fn coverage(&self, version: i32) -> Result<VersionCoverage, BoardError> {
        self.version_meta(version)?;

        if version == self.active_version {
            return Ok(coverage::coverage(version, &self.index));
        }

        let entries: Vec<ScheduleEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.version == version)
            .cloned()
            .collect();
        Ok(coverage::coverage(version, &ScheduleIndex::build(&entries)))
    }

    pub fn employee_hours(&self, employee_id: i64, range: (NaiveDate, NaiveDate)) -> EmployeeHours {
        coverage::employee_hours(employee_id, range, &self.index, &self.classifier)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn register(&mut self, source: ScheduleEntry, update: ScheduleUpdate) -> PendingProposal {
        let proposal = self.ledger.open(source.id, update, Some(source));
        PendingProposal {
            proposal_id: proposal.id,
            request_id: proposal.request_id,
            schedule_id: proposal.schedule_id,
            update: proposal.update,
        }
    }

    fn upsert_entry(&mut self, persisted: ScheduleEntry) {
        if persisted.id != 0 {
            if let Some(slot) = self.entries.iter_mut().find(|entry| entry.id == persisted.id) {
                *slot = persisted;
                return;
            }
        }
        if let Some(slot) = self.entries.iter_mut().find(|entry| {
            entry.employee_id == persisted.employee_id
                && entry.date == persisted.date
                && entry.version == persisted.version
        }) {
            *slot = persisted;
            return;
        }
        self.entries.push(persisted);
    }

    fn rebuild_index(&mut self) {
        let active: Vec<ScheduleEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.version == self.active_version)
            .cloned()
            .collect();
        self.index = ScheduleIndex::build(&active);
    }

    fn source_entry(&self, schedule_id: i64) -> Result<ScheduleEntry, BoardError> {
        self.entries
            .iter()
            .find(|entry| entry.id == schedule_id)
            .cloned()
            .ok_or(BoardError::UnknownEntry { schedule_id })
    }

    fn version_meta(&self, version: i32) -> Result<&VersionMeta, BoardError> {
        self.versions
            .get(&version)
            .ok_or(BoardError::UnknownVersion { version })
    }
}
