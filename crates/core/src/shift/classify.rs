use chrono::Timelike;
use regex::Regex;

use crate::model::{ScheduleEntry, ShiftType, ShiftTypeDef};
use crate::shift::window::TimeWindow;

/// Name fragments that decide a shift type before the hour heuristic
/// gets a say. Checked in order.
const NAME_PATTERN_SOURCES: [(ShiftType, &str); 3] = [
    (ShiftType::Early, r"(?i)early|früh"),
    (ShiftType::Late, r"(?i)late|spät"),
    (ShiftType::Middle, r"(?i)middle|mitte"),
];

const EARLY_START_HOURS: [u32; 2] = [9, 10];
const LATE_END_HOURS: [u32; 2] = [19, 20];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedSlot {
    pub shift_type: Option<ShiftType>,
    pub duration_hours: f64,
}

/// Resolves a cell's coarse shift type and net duration.
///
/// The type comes from the first signal available: an explicit override,
/// the value stored on the entry, a name pattern over the configured
/// shift templates, then the start/end hour heuristic.
#[derive(Debug, Clone)]
pub struct SlotClassifier {
    shift_types: Vec<ShiftTypeDef>,
    name_patterns: Vec<(ShiftType, Result<Regex, String>)>,
}

impl SlotClassifier {
    pub fn new(shift_types: &[ShiftTypeDef]) -> Self {
        let name_patterns = NAME_PATTERN_SOURCES
            .iter()
            .map(|(shift_type, source)| {
                let compiled = Regex::new(source).map_err(|error| {
                    format!("invalid shift name pattern '{}': {}", source, error)
                });
                (*shift_type, compiled)
            })
            .collect();

        Self {
            shift_types: shift_types.to_vec(),
            name_patterns,
        }
    }

    pub fn classify(&self, entry: &ScheduleEntry, explicit: Option<ShiftType>) -> ClassifiedSlot {
        if entry.is_empty() {
            return ClassifiedSlot {
                shift_type: None,
                duration_hours: 0.0,
            };
        }

        let window = TimeWindow::of_entry(entry);
        let duration_hours = window
            .map(|window| window.net_hours(TimeWindow::break_of_entry(entry).as_ref()))
            .unwrap_or(0.0);

        ClassifiedSlot {
            shift_type: self.resolve_type(
                explicit,
                entry.shift_type_id,
                entry.shift_id,
                window.as_ref(),
            ),
            duration_hours,
        }
    }

    pub fn resolve_type(
        &self,
        explicit: Option<ShiftType>,
        stored: Option<ShiftType>,
        shift_id: Option<i64>,
        window: Option<&TimeWindow>,
    ) -> Option<ShiftType> {
        if let Some(explicit) = explicit {
            return Some(explicit);
        }
        if let Some(stored) = stored {
            return Some(stored);
        }
        if let Some(matched) = shift_id.and_then(|id| self.type_from_name(id)) {
            return Some(matched);
        }
        window.map(type_from_hours)
    }

    fn type_from_name(&self, shift_id: i64) -> Option<ShiftType> {
        let name = self
            .shift_types
            .iter()
            .find(|def| def.id == shift_id)
            .map(|def| def.name.as_str())?;

        for (shift_type, compiled) in &self.name_patterns {
            if let Ok(pattern) = compiled {
                if pattern.is_match(name) {
                    return Some(*shift_type);
                }
            }
        }

        None
    }
}

impl Default for SlotClassifier {
    fn default() -> Self {
        Self::new(&[])
    }
}

fn type_from_hours(window: &TimeWindow) -> ShiftType {
    if EARLY_START_HOURS.contains(&window.start.hour()) {
        ShiftType::Early
    } else if LATE_END_HOURS.contains(&window.end.hour()) {
        ShiftType::Late
    } else {
        ShiftType::Middle
    }
}
