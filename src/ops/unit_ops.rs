use regex::Regex;
use serde::Serialize;

use crate::model::task::{Task, TaskType};
use crate::model::unit::{Unit, UnitStatus};
use crate::model::user::User;
use crate::ops::suggest::{TaskSuggester, TaskSuggestion};

/// Error type for unit creation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    #[error("only admins can create units")]
    NotAdmin,
    #[error("unit name cannot be empty")]
    EmptyName,
    #[error("a unit needs at least one task")]
    NoTasks,
    #[error("user not found: {0}")]
    UnknownAssignee(String),
    #[error("{0} is not a cleaner and cannot be assigned a unit")]
    AssigneeNotCleaner(String),
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent, 0 for an empty checklist
    pub percent: u8,
}

pub fn progress(unit: &Unit) -> Progress {
    let total = unit.tasks.len();
    let completed = unit.tasks.iter().filter(|t| t.is_completed).count();
    let percent = if total == 0 {
        0
    } else {
        (completed as f64 * 100.0 / total as f64).round() as u8
    };
    Progress {
        completed,
        total,
        percent,
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Status filter for the unit list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(UnitStatus),
}

impl StatusFilter {
    pub fn matches(self, status: UnitStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => s == status,
        }
    }
}

/// Parse a status filter string (case-insensitive)
pub fn parse_status_filter(s: &str) -> Result<StatusFilter, String> {
    match s.to_ascii_lowercase().as_str() {
        "all" => Ok(StatusFilter::All),
        "open" => Ok(StatusFilter::Only(UnitStatus::Open)),
        "submitted" => Ok(StatusFilter::Only(UnitStatus::Submitted)),
        "rework" => Ok(StatusFilter::Only(UnitStatus::Rework)),
        "success" => Ok(StatusFilter::Only(UnitStatus::Success)),
        _ => Err(format!(
            "unknown status '{}' (expected: all, open, submitted, rework, success)",
            s
        )),
    }
}

/// Units `user` should see: cleaners get their own assignments only.
/// `search` matches against name or address.
pub fn visible_units<'a>(
    user: &User,
    units: &'a [Unit],
    filter: StatusFilter,
    search: Option<&Regex>,
) -> Vec<&'a Unit> {
    units
        .iter()
        .filter(|u| !user.is_cleaner() || u.is_assigned_to(&user.id))
        .filter(|u| filter.matches(u.status))
        .filter(|u| search.is_none_or(|re| re.is_match(&u.name) || re.is_match(&u.address)))
        .collect()
}

/// Display name of the assignee, or "Unassigned"
pub fn assignee_name(unit: &Unit, users: &[User]) -> String {
    unit.assigned_user_id
        .as_deref()
        .and_then(|id| users.iter().find(|u| u.id == id))
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "Unassigned".to_string())
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Form input for a new unit
#[derive(Debug, Clone, Default)]
pub struct UnitDraft {
    pub name: String,
    pub address: String,
    pub deadline: String,
    pub assigned_user_id: Option<String>,
    pub tasks: Vec<Task>,
}

/// Description sent to the suggestion service: name plus " at <address>"
pub fn suggestion_prompt(name: &str, address: &str) -> String {
    if address.trim().is_empty() {
        name.to_string()
    } else {
        format!("{} at {}", name, address)
    }
}

/// Turn suggestions into fresh checklist items with `gen-<i>-<millis>` ids
pub fn tasks_from_suggestions(suggestions: Vec<TaskSuggestion>, now_ms: i64) -> Vec<Task> {
    suggestions
        .into_iter()
        .enumerate()
        .map(|(i, s)| Task::new(format!("gen-{}-{}", i, now_ms), s.title, s.task_type))
        .collect()
}

/// Manually entered tasks get `task-<i>-<millis>` ids
pub fn manual_tasks(entries: &[(TaskType, String)], now_ms: i64) -> Vec<Task> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (kind, title))| Task::new(format!("task-{}-{}", i, now_ms), title.clone(), *kind))
        .collect()
}

/// Ask `suggester` for a checklist for the unit named `name` at `address`.
/// An empty name produces no request and no tasks.
pub async fn generate_tasks<S: TaskSuggester>(
    suggester: &S,
    name: &str,
    address: &str,
    now_ms: i64,
) -> Vec<Task> {
    if name.trim().is_empty() {
        return Vec::new();
    }
    let suggestions = suggester
        .generate_tasks_for_unit(&suggestion_prompt(name, address))
        .await;
    tasks_from_suggestions(suggestions, now_ms)
}

/// Validate a draft and build an OPEN unit with id `u-<millis>`.
pub fn create_unit(creator: &User, draft: UnitDraft, users: &[User], now_ms: i64) -> Result<Unit, UnitError> {
    if !creator.is_admin() {
        return Err(UnitError::NotAdmin);
    }
    if draft.name.trim().is_empty() {
        return Err(UnitError::EmptyName);
    }
    if draft.tasks.is_empty() {
        return Err(UnitError::NoTasks);
    }
    if let Some(ref id) = draft.assigned_user_id {
        let assignee = users
            .iter()
            .find(|u| &u.id == id)
            .ok_or_else(|| UnitError::UnknownAssignee(id.clone()))?;
        if !assignee.is_cleaner() {
            return Err(UnitError::AssigneeNotCleaner(assignee.name.clone()));
        }
    }

    Ok(Unit {
        id: format!("u-{}", now_ms),
        name: draft.name,
        address: draft.address,
        deadline: draft.deadline,
        status: UnitStatus::Open,
        assigned_user_id: draft.assigned_user_id,
        tasks: draft.tasks,
        last_updated: now_ms,
    })
}
