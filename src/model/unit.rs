use serde::{Deserialize, Serialize};

use super::task::Task;

/// Review status of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitStatus {
    Open,
    Submitted,
    Success,
    Rework,
}

impl UnitStatus {
    pub const ALL: [UnitStatus; 4] = [
        UnitStatus::Open,
        UnitStatus::Submitted,
        UnitStatus::Rework,
        UnitStatus::Success,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitStatus::Open => "OPEN",
            UnitStatus::Submitted => "SUBMITTED",
            UnitStatus::Success => "SUCCESS",
            UnitStatus::Rework => "REWORK",
        }
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cleaning job at one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// Free-form display string ("12:00 PM", an ISO date, ...)
    #[serde(default)]
    pub deadline: String,
    pub status: UnitStatus,
    #[serde(default)]
    pub assigned_user_id: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Epoch milliseconds of the last persisted change
    #[serde(default)]
    pub last_updated: i64,
}

impl Unit {
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_user_id.as_deref() == Some(user_id)
    }
}
