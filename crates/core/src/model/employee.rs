use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Contract group code (VZ, TZ, GFB, TL, ...). The set is open; new
    /// codes appear without a core release.
    pub employee_group: String,
    #[serde(default)]
    pub contracted_hours: f64,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl Employee {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Group catalog records come in two shapes; the fields present decide
/// which one a record is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GroupDef {
    EmployeeType {
        id: String,
        name: String,
        min_hours: f64,
        max_hours: f64,
    },
    AbsenceType {
        id: String,
        name: String,
        paid: bool,
    },
}

impl GroupDef {
    pub fn id(&self) -> &str {
        match self {
            GroupDef::EmployeeType { id, .. } => id,
            GroupDef::AbsenceType { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GroupDef::EmployeeType { name, .. } => name,
            GroupDef::AbsenceType { name, .. } => name,
        }
    }
}
