use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use rota_core::engine::{DispatchError, ScheduleDispatcher, VersionControl, VersionControlError};
use rota_core::lifecycle;
use rota_core::model::{
    AbsenceRecord, Employee, PlanScenario, PlanSettings, PlanStore, PlanStoreError, ScheduleEntry,
    ScheduleUpdate, VersionMeta, VersionStatus,
};
use uuid::Uuid;

use crate::errors::{ScriptError, SeedError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    mutex.lock().map_err(|poisoned| poisoned.to_string())
}

/// In-memory stand-in for the schedule service a live plan board talks
/// to. Directory data is seeded through `&mut self` before the run;
/// everything the dispatch path touches sits behind mutexes so the
/// service can be shared immutably while a scenario executes.
pub struct InMemoryPlanService {
    employees: Vec<Employee>,
    absences: Vec<AbsenceRecord>,
    settings: Option<PlanSettings>,
    entries: Mutex<HashMap<i64, ScheduleEntry>>,
    versions: Mutex<BTreeMap<i32, VersionMeta>>,
    next_schedule_id: Mutex<i64>,
    fail_next_dispatch: Mutex<Option<String>>,
    delivered: Mutex<HashMap<(i64, Uuid), ScheduleEntry>>,
}

impl InMemoryPlanService {
    pub fn new() -> Self {
        Self {
            employees: Vec::new(),
            absences: Vec::new(),
            settings: None,
            entries: Mutex::new(HashMap::new()),
            versions: Mutex::new(BTreeMap::new()),
            next_schedule_id: Mutex::new(1),
            fail_next_dispatch: Mutex::new(None),
            delivered: Mutex::new(HashMap::new()),
        }
    }

    /// Build a service pre-loaded with everything a scenario declares.
    pub fn from_scenario(scenario: &PlanScenario) -> Result<Self, SeedError> {
        let mut service = Self::new();
        service.employees = scenario.employees.clone();
        service.absences = scenario.absences.clone();
        service.settings = scenario.settings.clone();

        for meta in &scenario.versions {
            service.seed_version(meta.clone())?;
        }
        for entry in &scenario.entries {
            service.seed_entry(entry.clone())?;
        }
        Ok(service)
    }

    pub fn seed_employee(&mut self, employee: Employee) {
        self.employees.push(employee);
    }

    pub fn seed_absence(&mut self, absence: AbsenceRecord) {
        self.absences.push(absence);
    }

    pub fn set_settings(&mut self, settings: PlanSettings) {
        self.settings = Some(settings);
    }

    pub fn seed_version(&mut self, meta: VersionMeta) -> Result<(), SeedError> {
        let mut versions =
            lock(&self.versions).map_err(|message| SeedError::LockPoisoned { message })?;
        if versions.contains_key(&meta.version) {
            return Err(SeedError::DuplicateVersion {
                version: meta.version,
            });
        }
        versions.insert(meta.version, meta);
        Ok(())
    }

    /// Seed a schedule entry. An id of 0 gets the next free id; the
    /// assigned id is returned either way.
    pub fn seed_entry(&mut self, mut entry: ScheduleEntry) -> Result<i64, SeedError> {
        {
            let versions =
                lock(&self.versions).map_err(|message| SeedError::LockPoisoned { message })?;
            if !versions.contains_key(&entry.version) {
                return Err(SeedError::UnseededVersion {
                    id: entry.id,
                    version: entry.version,
                });
            }
        }

        let mut entries =
            lock(&self.entries).map_err(|message| SeedError::LockPoisoned { message })?;
        let mut next_id =
            lock(&self.next_schedule_id).map_err(|message| SeedError::LockPoisoned { message })?;

        if entry.id == 0 {
            entry.id = *next_id;
        } else if entries.contains_key(&entry.id) {
            return Err(SeedError::DuplicateEntry { id: entry.id });
        }
        *next_id = (*next_id).max(entry.id + 1);

        let id = entry.id;
        entries.insert(id, entry);
        Ok(id)
    }

    /// Script the next `dispatch_update` call to fail with `message`.
    /// Retries of an already-delivered request are not affected.
    pub fn fail_next_dispatch(&self, message: impl Into<String>) -> Result<(), ScriptError> {
        let mut slot = lock(&self.fail_next_dispatch)
            .map_err(|message| ScriptError::LockPoisoned { message })?;
        *slot = Some(message.into());
        Ok(())
    }

    pub fn entry(&self, schedule_id: i64) -> Result<Option<ScheduleEntry>, ScriptError> {
        let entries =
            lock(&self.entries).map_err(|message| ScriptError::LockPoisoned { message })?;
        Ok(entries.get(&schedule_id).cloned())
    }

    /// Entries currently persisted for `version`, in stable order.
    pub fn entries_for_version(&self, version: i32) -> Result<Vec<ScheduleEntry>, ScriptError> {
        let entries =
            lock(&self.entries).map_err(|message| ScriptError::LockPoisoned { message })?;
        let mut rows: Vec<ScheduleEntry> = entries
            .values()
            .filter(|entry| entry.version == version)
            .cloned()
            .collect();
        rows.sort_by_key(|entry| (entry.employee_id, entry.date, entry.id));
        Ok(rows)
    }

    /// Every persisted entry, in stable order.
    pub fn all_entries(&self) -> Result<Vec<ScheduleEntry>, ScriptError> {
        let entries =
            lock(&self.entries).map_err(|message| ScriptError::LockPoisoned { message })?;
        let mut rows: Vec<ScheduleEntry> = entries.values().cloned().collect();
        rows.sort_by_key(|entry| (entry.version, entry.employee_id, entry.date, entry.id));
        Ok(rows)
    }

    pub fn versions(&self) -> Result<Vec<VersionMeta>, ScriptError> {
        let versions =
            lock(&self.versions).map_err(|message| ScriptError::LockPoisoned { message })?;
        Ok(versions.values().cloned().collect())
    }

    fn transition_version(
        &self,
        version: i32,
        target: VersionStatus,
    ) -> Result<VersionMeta, VersionControlError> {
        let mut versions = lock(&self.versions)
            .map_err(|message| VersionControlError::OperationFailed { message })?;
        let meta = versions
            .get_mut(&version)
            .ok_or(VersionControlError::VersionNotFound { version })?;
        lifecycle::transition(meta, target).map_err(|error| {
            VersionControlError::OperationFailed {
                message: error.to_string(),
            }
        })?;
        Ok(meta.clone())
    }
}

impl Default for InMemoryPlanService {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanStore for InMemoryPlanService {
    fn employees(&self) -> Result<Vec<Employee>, PlanStoreError> {
        Ok(self.employees.clone())
    }

    fn absences_for(&self, employee_id: i64) -> Result<Vec<AbsenceRecord>, PlanStoreError> {
        if !self.employees.iter().any(|e| e.id == employee_id) {
            return Err(PlanStoreError::EmployeeNotFound { id: employee_id });
        }
        Ok(self
            .absences
            .iter()
            .filter(|absence| absence.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn settings(&self) -> Result<PlanSettings, PlanStoreError> {
        self.settings
            .clone()
            .ok_or_else(|| PlanStoreError::SettingsUnavailable {
                message: "no settings seeded".to_string(),
            })
    }
}

impl ScheduleDispatcher for InMemoryPlanService {
    fn dispatch_update(
        &self,
        schedule_id: i64,
        request_id: Uuid,
        update: &ScheduleUpdate,
    ) -> Result<ScheduleEntry, DispatchError> {
        let mut delivered =
            lock(&self.delivered).map_err(|message| DispatchError::Unreachable { message })?;
        if let Some(already) = delivered.get(&(schedule_id, request_id)) {
            return Ok(already.clone());
        }

        if let Some(message) = lock(&self.fail_next_dispatch)
            .map_err(|message| DispatchError::Unreachable { message })?
            .take()
        {
            return Err(DispatchError::Rejected {
                schedule_id,
                message,
            });
        }

        let mut entries =
            lock(&self.entries).map_err(|message| DispatchError::Unreachable { message })?;
        let current = entries
            .get(&schedule_id)
            .ok_or_else(|| DispatchError::Rejected {
                schedule_id,
                message: "unknown schedule entry".to_string(),
            })?;

        let mut persisted = current.clone();
        persisted.employee_id = update.employee_id;
        persisted.date = update.date;
        persisted.shift_id = update.shift_id;
        persisted.shift_start = update.shift_start;
        persisted.shift_end = update.shift_end;
        persisted.break_start = update.break_start;
        persisted.break_end = update.break_end;
        persisted.notes = update.notes.clone();
        if persisted.is_empty() {
            persisted.shift_type_id = None;
        }

        entries.insert(schedule_id, persisted.clone());
        delivered.insert((schedule_id, request_id), persisted.clone());
        Ok(persisted)
    }
}

impl VersionControl for InMemoryPlanService {
    fn create_version(&self, base: Option<i32>) -> Result<VersionMeta, VersionControlError> {
        let mut versions = lock(&self.versions)
            .map_err(|message| VersionControlError::OperationFailed { message })?;
        let mut meta = VersionMeta::draft(lifecycle::next_version(versions.keys().copied()));
        meta.base_version = base;
        versions.insert(meta.version, meta.clone());
        Ok(meta)
    }

    fn publish_version(&self, version: i32) -> Result<VersionMeta, VersionControlError> {
        self.transition_version(version, VersionStatus::Published)
    }

    fn archive_version(&self, version: i32) -> Result<VersionMeta, VersionControlError> {
        self.transition_version(version, VersionStatus::Archived)
    }

    fn delete_version(&self, version: i32) -> Result<(), VersionControlError> {
        let mut versions = lock(&self.versions)
            .map_err(|message| VersionControlError::OperationFailed { message })?;
        if versions.remove(&version).is_none() {
            return Err(VersionControlError::VersionNotFound { version });
        }

        let mut entries = lock(&self.entries)
            .map_err(|message| VersionControlError::OperationFailed { message })?;
        entries.retain(|_, entry| entry.version != version);
        Ok(())
    }

    fn duplicate_version(&self, version: i32) -> Result<VersionMeta, VersionControlError> {
        let mut versions = lock(&self.versions)
            .map_err(|message| VersionControlError::OperationFailed { message })?;
        let source = versions
            .get(&version)
            .cloned()
            .ok_or(VersionControlError::VersionNotFound { version })?;
        let copy = lifecycle::duplicate_of(
            &source,
            lifecycle::next_version(versions.keys().copied()),
        );
        versions.insert(copy.version, copy.clone());
        drop(versions);

        let mut entries = lock(&self.entries)
            .map_err(|message| VersionControlError::OperationFailed { message })?;
        let mut next_id = lock(&self.next_schedule_id)
            .map_err(|message| VersionControlError::OperationFailed { message })?;

        let mut sources: Vec<ScheduleEntry> = entries
            .values()
            .filter(|entry| entry.version == version)
            .cloned()
            .collect();
        sources.sort_by_key(|entry| (entry.employee_id, entry.date, entry.id));

        for mut duplicate in sources {
            duplicate.id = *next_id;
            *next_id += 1;
            duplicate.version = copy.version;
            entries.insert(duplicate.id, duplicate);
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rota_core::model::ShiftType;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn sample_entry(id: i64, employee_id: i64, day: u32, version: i32) -> ScheduleEntry {
        ScheduleEntry {
            id,
            employee_id,
            shift_id: Some(3),
            version,
            date: date(day),
            shift_start: Some(t(9)),
            shift_end: Some(t(17)),
            break_start: None,
            break_end: None,
            shift_type_id: Some(ShiftType::Early),
            notes: None,
        }
    }

    fn sample_update(employee_id: i64, day: u32) -> ScheduleUpdate {
        ScheduleUpdate {
            employee_id,
            date: date(day),
            shift_id: Some(3),
            shift_start: Some(t(9)),
            shift_end: Some(t(17)),
            break_start: None,
            break_end: None,
            notes: None,
        }
    }

    fn seeded_service() -> InMemoryPlanService {
        let mut service = InMemoryPlanService::new();
        service.seed_version(VersionMeta::draft(1)).unwrap();
        service.seed_entry(sample_entry(1, 7, 11, 1)).unwrap();
        service.seed_entry(sample_entry(2, 8, 12, 1)).unwrap();
        service
    }

    #[test]
    fn dispatch_applies_the_update() {
        let service = seeded_service();

        let persisted = service
            .dispatch_update(1, Uuid::now_v7(), &sample_update(9, 13))
            .unwrap();
        assert_eq!(persisted.id, 1);
        assert_eq!(persisted.employee_id, 9);
        assert_eq!(persisted.date, date(13));

        let stored = service.entry(1).unwrap().unwrap();
        assert_eq!(stored.employee_id, 9);
    }

    #[test]
    fn dispatch_is_idempotent_per_request_id() {
        let service = seeded_service();
        let request_id = Uuid::now_v7();

        let first = service
            .dispatch_update(1, request_id, &sample_update(9, 13))
            .unwrap();

        // a scripted failure must not break the retry of a delivered request
        service.fail_next_dispatch("gateway timeout").unwrap();
        let retried = service
            .dispatch_update(1, request_id, &sample_update(9, 13))
            .unwrap();
        assert_eq!(first, retried);

        // the failure script still hits the next fresh request
        let error = service
            .dispatch_update(2, Uuid::now_v7(), &sample_update(10, 14))
            .unwrap_err();
        assert!(matches!(error, DispatchError::Rejected { schedule_id: 2, .. }));
    }

    #[test]
    fn dispatch_rejects_unknown_schedule_ids() {
        let service = seeded_service();
        let error = service
            .dispatch_update(99, Uuid::now_v7(), &sample_update(9, 13))
            .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("unknown schedule entry"));
    }

    #[test]
    fn clearing_an_entry_drops_the_stored_shift_type() {
        let service = seeded_service();
        let empty = ScheduleUpdate {
            employee_id: 7,
            date: date(11),
            shift_id: None,
            shift_start: None,
            shift_end: None,
            break_start: None,
            break_end: None,
            notes: None,
        };

        let persisted = service.dispatch_update(1, Uuid::now_v7(), &empty).unwrap();
        assert!(persisted.is_empty());
        assert_eq!(persisted.shift_type_id, None);
    }

    #[test]
    fn seeding_rejects_duplicates_and_unseeded_versions() {
        let mut service = InMemoryPlanService::new();
        service.seed_version(VersionMeta::draft(1)).unwrap();

        let error = service.seed_version(VersionMeta::draft(1)).unwrap_err();
        assert!(error.to_string().contains("appears twice"));

        let error = service.seed_entry(sample_entry(1, 7, 11, 9)).unwrap_err();
        assert!(error.to_string().contains("was not seeded"));

        service.seed_entry(sample_entry(1, 7, 11, 1)).unwrap();
        let error = service.seed_entry(sample_entry(1, 8, 12, 1)).unwrap_err();
        assert!(matches!(error, SeedError::DuplicateEntry { id: 1 }));
    }

    #[test]
    fn seeding_with_id_zero_assigns_the_next_free_id() {
        let mut service = InMemoryPlanService::new();
        service.seed_version(VersionMeta::draft(1)).unwrap();
        service.seed_entry(sample_entry(5, 7, 11, 1)).unwrap();

        let id = service.seed_entry(sample_entry(0, 8, 12, 1)).unwrap();
        assert_eq!(id, 6);
    }

    #[test]
    fn create_version_numbers_monotonically() {
        let service = InMemoryPlanService::new();

        let first = service.create_version(None).unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.status, VersionStatus::Draft);

        let second = service.create_version(Some(1)).unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(second.base_version, Some(1));
    }

    #[test]
    fn publish_and_archive_follow_the_transition_table() {
        let mut service = InMemoryPlanService::new();
        service.seed_version(VersionMeta::draft(1)).unwrap();

        let published = service.publish_version(1).unwrap();
        assert_eq!(published.status, VersionStatus::Published);

        let error = service.publish_version(1).unwrap_err();
        assert!(error.to_string().contains("cannot go from"));

        let archived = service.archive_version(1).unwrap();
        assert_eq!(archived.status, VersionStatus::Archived);
    }

    #[test]
    fn delete_version_cascades_to_its_entries() {
        let mut service = seeded_service();
        service.seed_version(VersionMeta::draft(2)).unwrap();
        service.seed_entry(sample_entry(3, 7, 13, 2)).unwrap();

        VersionControl::delete_version(&service, 1).unwrap();
        assert!(service.entry(1).unwrap().is_none());
        assert!(service.entry(2).unwrap().is_none());
        assert!(service.entry(3).unwrap().is_some());

        let error = VersionControl::delete_version(&service, 1).unwrap_err();
        assert!(matches!(
            error,
            VersionControlError::VersionNotFound { version: 1 }
        ));
    }

    #[test]
    fn duplicate_version_copies_entries_with_fresh_ids() {
        let service = seeded_service();

        let copy = service.duplicate_version(1).unwrap();
        assert_eq!(copy.version, 2);
        assert_eq!(copy.base_version, Some(1));

        let copies = service.entries_for_version(2).unwrap();
        assert_eq!(copies.len(), 2);
        assert!(copies.iter().all(|entry| entry.version == 2));
        assert!(copies.iter().all(|entry| entry.id > 2));

        // originals untouched
        let originals = service.entries_for_version(1).unwrap();
        assert_eq!(originals.len(), 2);
    }

    #[test]
    fn absences_for_requires_a_known_employee() {
        let mut service = InMemoryPlanService::new();
        service.seed_employee(Employee {
            id: 7,
            first_name: "Mara".to_string(),
            last_name: "Vogel".to_string(),
            employee_group: "TZ".to_string(),
            contracted_hours: 25.0,
            is_active: true,
        });
        service.seed_absence(AbsenceRecord {
            employee_id: 7,
            start_date: date(11),
            end_date: date(12),
            absence_type_id: "vacation".to_string(),
            start_time: None,
            end_time: None,
        });

        assert_eq!(service.absences_for(7).unwrap().len(), 1);
        let error = service.absences_for(8).unwrap_err();
        assert!(matches!(error, PlanStoreError::EmployeeNotFound { id: 8 }));
    }

    #[test]
    fn settings_error_when_nothing_seeded() {
        let service = InMemoryPlanService::new();
        let error = service.settings().unwrap_err();
        assert!(matches!(error, PlanStoreError::SettingsUnavailable { .. }));
    }
}
