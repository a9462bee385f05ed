use serde::Serialize;
use tracing::info;

use crate::model::unit::{Unit, UnitStatus};
use crate::model::user::{User, UserRole};

/// A review step that moves a unit between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitAction {
    Submit,
    Approve,
    Reject,
    Reopen,
}

impl UnitAction {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitAction::Submit => "submit",
            UnitAction::Approve => "approve",
            UnitAction::Reject => "reject",
            UnitAction::Reopen => "reopen",
        }
    }

    /// Who may perform this action
    pub fn role(self) -> UserRole {
        match self {
            UnitAction::Submit => UserRole::Cleaner,
            UnitAction::Approve | UnitAction::Reject | UnitAction::Reopen => UserRole::Admin,
        }
    }

    /// Statuses the action may start from
    pub fn sources(self) -> &'static [UnitStatus] {
        match self {
            UnitAction::Submit => &[UnitStatus::Open, UnitStatus::Rework],
            UnitAction::Approve | UnitAction::Reject => &[UnitStatus::Submitted],
            UnitAction::Reopen => &[UnitStatus::Success],
        }
    }

    pub fn target(self) -> UnitStatus {
        match self {
            UnitAction::Submit => UnitStatus::Submitted,
            UnitAction::Approve => UnitStatus::Success,
            UnitAction::Reject => UnitStatus::Rework,
            UnitAction::Reopen => UnitStatus::Open,
        }
    }
}

impl std::fmt::Display for UnitAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for lifecycle rules
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("All tasks must be checked before submitting.")]
    IncompleteTasks,
    #[error("All tasks must have at least one photo proof.")]
    MissingPhotoProof,
    #[error("cannot {action} unit {unit}: status is {status}")]
    InvalidTransition {
        unit: String,
        action: UnitAction,
        status: UnitStatus,
    },
    #[error("{user} ({role}) is not allowed to {action} unit {unit}")]
    NotPermitted {
        unit: String,
        user: String,
        role: UserRole,
        action: UnitAction,
    },
    #[error("unit {unit} is read-only for {user} while {status}")]
    ReadOnly {
        unit: String,
        user: String,
        status: UnitStatus,
    },
}

// ---------------------------------------------------------------------------
// Editability
// ---------------------------------------------------------------------------

/// Whether a role may change task data on a unit in `status`.
///
/// Cleaners work only on OPEN and REWORK units. Admins can always correct
/// a checklist.
pub fn can_edit(role: UserRole, status: UnitStatus) -> bool {
    match role {
        UserRole::Admin => true,
        UserRole::Cleaner => matches!(status, UnitStatus::Open | UnitStatus::Rework),
    }
}

/// [`can_edit`] plus ownership: cleaners may only touch units assigned to them.
pub fn can_edit_unit(user: &User, unit: &Unit) -> bool {
    if user.is_cleaner() && !unit.is_assigned_to(&user.id) {
        return false;
    }
    can_edit(user.role, unit.status)
}

pub fn ensure_editable(user: &User, unit: &Unit) -> Result<(), LifecycleError> {
    if can_edit_unit(user, unit) {
        Ok(())
    } else {
        Err(LifecycleError::ReadOnly {
            unit: unit.id.clone(),
            user: user.name.clone(),
            status: unit.status,
        })
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Every task must be complete and carry at least one photo proof.
pub fn validate_submission(unit: &Unit) -> Result<(), LifecycleError> {
    if unit.tasks.iter().any(|t| !t.is_completed) {
        return Err(LifecycleError::IncompleteTasks);
    }
    if unit.tasks.iter().any(|t| !t.has_proof()) {
        return Err(LifecycleError::MissingPhotoProof);
    }
    Ok(())
}

fn permitted(user: &User, unit: &Unit, action: UnitAction) -> bool {
    if user.role != action.role() {
        return false;
    }
    // cleaners only submit their own assignments
    !(user.is_cleaner() && !unit.is_assigned_to(&user.id))
}

/// Apply `action` to `unit` on behalf of `user`.
///
/// Checks role, then source status, then (for submit) the checklist. On any
/// failure the unit is left untouched. Returns the previous status.
pub fn apply(user: &User, unit: &mut Unit, action: UnitAction) -> Result<UnitStatus, LifecycleError> {
    if !permitted(user, unit, action) {
        return Err(LifecycleError::NotPermitted {
            unit: unit.id.clone(),
            user: user.name.clone(),
            role: user.role,
            action,
        });
    }
    if !action.sources().contains(&unit.status) {
        return Err(LifecycleError::InvalidTransition {
            unit: unit.id.clone(),
            action,
            status: unit.status,
        });
    }
    if action == UnitAction::Submit {
        validate_submission(unit)?;
    }

    let previous = unit.status;
    unit.status = action.target();
    info!(unit = %unit.id, user = %user.id, from = %previous, to = %unit.status, "unit {}", action);
    Ok(previous)
}

pub fn submit(user: &User, unit: &mut Unit) -> Result<UnitStatus, LifecycleError> {
    apply(user, unit, UnitAction::Submit)
}

pub fn approve(user: &User, unit: &mut Unit) -> Result<UnitStatus, LifecycleError> {
    apply(user, unit, UnitAction::Approve)
}

/// Send back for rework. Task flags and proofs stay exactly as submitted.
pub fn reject(user: &User, unit: &mut Unit) -> Result<UnitStatus, LifecycleError> {
    apply(user, unit, UnitAction::Reject)
}

/// Return a finished unit to OPEN without resetting any task data.
pub fn reopen(user: &User, unit: &mut Unit) -> Result<UnitStatus, LifecycleError> {
    apply(user, unit, UnitAction::Reopen)
}

/// Actions the detail view should offer `user` for `unit` right now.
/// Submit is offered even when the checklist would fail validation.
pub fn available_actions(user: &User, unit: &Unit) -> Vec<UnitAction> {
    [
        UnitAction::Submit,
        UnitAction::Reject,
        UnitAction::Approve,
        UnitAction::Reopen,
    ]
    .into_iter()
    .filter(|a| permitted(user, unit, *a) && a.sources().contains(&unit.status))
    .collect()
}
