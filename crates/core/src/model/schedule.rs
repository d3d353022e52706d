use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftType {
    Early,
    Middle,
    Late,
}

/// One cell of the assignment grid. An `id` of 0 marks a record the
/// schedule service has not persisted yet. A cell with no `shift_id`
/// keeps its row position but counts as unfilled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    #[serde(default)]
    pub id: i64,
    pub employee_id: i64,
    #[serde(default)]
    pub shift_id: Option<i64>,
    pub version: i32,
    #[serde(with = "date_key")]
    pub date: NaiveDate,
    #[serde(default, with = "opt_hhmm")]
    pub shift_start: Option<NaiveTime>,
    #[serde(default, with = "opt_hhmm")]
    pub shift_end: Option<NaiveTime>,
    #[serde(default, with = "opt_hhmm")]
    pub break_start: Option<NaiveTime>,
    #[serde(default, with = "opt_hhmm")]
    pub break_end: Option<NaiveTime>,
    #[serde(default)]
    pub shift_type_id: Option<ShiftType>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ScheduleEntry {
    pub fn is_empty(&self) -> bool {
        self.shift_id.is_none()
    }
}

/// Outbound mutation payload for a single cell. The schedule service
/// answers with the persisted [`ScheduleEntry`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleUpdate {
    pub employee_id: i64,
    #[serde(with = "date_key")]
    pub date: NaiveDate,
    #[serde(default)]
    pub shift_id: Option<i64>,
    #[serde(default, with = "opt_hhmm")]
    pub shift_start: Option<NaiveTime>,
    #[serde(default, with = "opt_hhmm")]
    pub shift_end: Option<NaiveTime>,
    #[serde(default, with = "opt_hhmm")]
    pub break_start: Option<NaiveTime>,
    #[serde(default, with = "opt_hhmm")]
    pub break_end: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Date keys on the wire sometimes arrive as full ISO datetimes; the
/// time component is dropped.
pub(crate) mod date_key {
    use chrono::NaiveDate;
    use serde::{de::Error as DeError, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(DeError::custom)
    }

    pub(crate) fn parse(raw: &str) -> Result<NaiveDate, String> {
        let date_part = raw
            .split_once('T')
            .or_else(|| raw.split_once(' '))
            .map(|(date, _)| date)
            .unwrap_or(raw);

        NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|error| format!("invalid date key '{raw}': {error}"))
    }
}

/// Times accept both "HH:MM" and "HH:MM:SS" and serialize as "HH:MM".
pub(crate) mod opt_hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error as DeError, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| parse(&value).map_err(DeError::custom))
            .transpose()
    }

    pub(crate) fn parse(raw: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map_err(|error| format!("invalid time '{raw}': {error}"))
    }
}

pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error as DeError, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::opt_hhmm::parse(&raw).map_err(DeError::custom)
    }
}
