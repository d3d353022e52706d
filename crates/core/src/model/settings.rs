use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::schedule::hhmm;

/// Shift template as configured per store. `name` feeds the classifier's
/// pattern matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShiftTypeDef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSettings {
    #[serde(default)]
    pub shift_types: Vec<ShiftTypeDef>,
    /// ISO weekday numbers, 1 = Monday through 7 = Sunday. Empty means
    /// the store never closes.
    #[serde(default)]
    pub opening_days: Vec<u8>,
    #[serde(with = "hhmm")]
    pub store_opening: NaiveTime,
    #[serde(with = "hhmm")]
    pub store_closing: NaiveTime,
}

impl PlanSettings {
    pub fn is_opening_day(&self, date: NaiveDate) -> bool {
        self.opening_days.is_empty()
            || self
                .opening_days
                .contains(&(date.weekday().number_from_monday() as u8))
    }

    pub fn within_opening_hours(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start >= self.store_opening && end <= self.store_closing && start <= end
    }

    pub fn shift_type_name(&self, shift_id: i64) -> Option<&str> {
        self.shift_types
            .iter()
            .find(|def| def.id == shift_id)
            .map(|def| def.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_settings() -> PlanSettings {
        PlanSettings {
            shift_types: vec![
                ShiftTypeDef {
                    id: 1,
                    name: "Frühschicht".to_string(),
                    color: Some("#80c0ff".to_string()),
                },
                ShiftTypeDef {
                    id: 2,
                    name: "Spätschicht".to_string(),
                    color: None,
                },
            ],
            opening_days: vec![1, 2, 3, 4, 5, 6],
            store_opening: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            store_closing: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        }
    }

    #[test]
    fn sunday_is_closed_for_sample_store() {
        let settings = sample_settings();
        // 2024-03-17 is a Sunday
        assert!(!settings.is_opening_day(NaiveDate::from_ymd_opt(2024, 3, 17).unwrap()));
        assert!(settings.is_opening_day(NaiveDate::from_ymd_opt(2024, 3, 18).unwrap()));
    }

    #[test]
    fn empty_opening_days_means_always_open() {
        let mut settings = sample_settings();
        settings.opening_days.clear();
        assert!(settings.is_opening_day(NaiveDate::from_ymd_opt(2024, 3, 17).unwrap()));
    }

    #[test]
    fn opening_hours_bound_shift_windows() {
        let settings = sample_settings();
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        assert!(settings.within_opening_hours(t(9, 0), t(17, 30)));
        assert!(!settings.within_opening_hours(t(8, 0), t(16, 0)));
        assert!(!settings.within_opening_hours(t(12, 0), t(20, 30)));
    }

    #[test]
    fn shift_type_name_lookup() {
        let settings = sample_settings();
        assert_eq!(settings.shift_type_name(2), Some("Spätschicht"));
        assert_eq!(settings.shift_type_name(99), None);
    }
}
