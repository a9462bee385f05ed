use crate::model::task::{MAX_PHOTO_PROOFS, Task};
use crate::model::unit::Unit;
use crate::model::user::User;
use crate::ops::lifecycle::{self, LifecycleError};

/// Error type for checklist operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Result of attaching a photo proof
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofAdded {
    /// Appended; holds the new proof count
    Added(usize),
    /// The task already has the maximum number of proofs; nothing changed
    CapReached,
}

fn editable_task<'a>(user: &User, unit: &'a mut Unit, task_id: &str) -> Result<&'a mut Task, TaskError> {
    lifecycle::ensure_editable(user, unit)?;
    unit.task_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))
}

/// Flip a task's completion flag. Returns the new value.
pub fn toggle_task(user: &User, unit: &mut Unit, task_id: &str) -> Result<bool, TaskError> {
    let task = editable_task(user, unit, task_id)?;
    task.is_completed = !task.is_completed;
    Ok(task.is_completed)
}

/// Append a proof unless the task is already at the cap.
pub fn add_photo(
    user: &User,
    unit: &mut Unit,
    task_id: &str,
    proof: String,
) -> Result<ProofAdded, TaskError> {
    let task = editable_task(user, unit, task_id)?;
    if task.photo_proofs.len() >= MAX_PHOTO_PROOFS {
        return Ok(ProofAdded::CapReached);
    }
    task.photo_proofs.push(proof);
    Ok(ProofAdded::Added(task.photo_proofs.len()))
}

/// Remove the proof at `index`, shifting later proofs left.
/// An out-of-range index removes nothing and returns `None`.
pub fn remove_photo(
    user: &User,
    unit: &mut Unit,
    task_id: &str,
    index: usize,
) -> Result<Option<String>, TaskError> {
    let task = editable_task(user, unit, task_id)?;
    if index >= task.photo_proofs.len() {
        return Ok(None);
    }
    Ok(Some(task.photo_proofs.remove(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::seed::{default_units, default_users};
    use crate::model::unit::UnitStatus;
    use pretty_assertions::assert_eq;

    fn user(id: &str) -> User {
        default_users().into_iter().find(|u| u.id == id).unwrap()
    }

    fn open_unit() -> Unit {
        default_units(0).remove(0)
    }

    #[test]
    fn toggle_twice_restores_flag() {
        let john = user("cleaner-1");
        let mut unit = open_unit();
        assert_eq!(toggle_task(&john, &mut unit, "t1"), Ok(true));
        assert_eq!(toggle_task(&john, &mut unit, "t1"), Ok(false));
        assert!(!unit.task("t1").unwrap().is_completed);
        // other task untouched
        assert!(!unit.task("t2").unwrap().is_completed);
    }

    #[test]
    fn toggle_unknown_task() {
        let mut unit = open_unit();
        assert_eq!(
            toggle_task(&user("cleaner-1"), &mut unit, "t99"),
            Err(TaskError::NotFound("t99".into()))
        );
    }

    #[test]
    fn cleaner_cannot_toggle_submitted_unit() {
        let mut unit = open_unit();
        unit.status = UnitStatus::Submitted;
        let err = toggle_task(&user("cleaner-1"), &mut unit, "t1").unwrap_err();
        assert!(matches!(err, TaskError::Lifecycle(LifecycleError::ReadOnly { .. })));
        assert!(!unit.tasks[0].is_completed);
    }

    #[test]
    fn admin_can_toggle_in_any_status() {
        let mut unit = open_unit();
        unit.status = UnitStatus::Success;
        assert_eq!(toggle_task(&user("admin-1"), &mut unit, "t2"), Ok(true));
    }

    #[test]
    fn sixth_proof_is_ignored() {
        let john = user("cleaner-1");
        let mut unit = open_unit();
        for i in 0..MAX_PHOTO_PROOFS {
            let outcome = add_photo(&john, &mut unit, "t1", format!("p{}", i)).unwrap();
            assert_eq!(outcome, ProofAdded::Added(i + 1));
        }
        let outcome = add_photo(&john, &mut unit, "t1", "p5".into()).unwrap();
        assert_eq!(outcome, ProofAdded::CapReached);
        let proofs = &unit.task("t1").unwrap().photo_proofs;
        assert_eq!(proofs.len(), MAX_PHOTO_PROOFS);
        assert_eq!(proofs.last().unwrap(), "p4");
    }

    #[test]
    fn remove_shifts_left() {
        let john = user("cleaner-1");
        let mut unit = open_unit();
        for p in ["a", "b", "c"] {
            add_photo(&john, &mut unit, "t2", p.into()).unwrap();
        }
        assert_eq!(remove_photo(&john, &mut unit, "t2", 1), Ok(Some("b".into())));
        assert_eq!(unit.task("t2").unwrap().photo_proofs, vec!["a", "c"]);
    }

    #[test]
    fn removing_last_proof_empties_list() {
        let john = user("cleaner-1");
        let mut unit = open_unit();
        add_photo(&john, &mut unit, "t2", "only".into()).unwrap();
        remove_photo(&john, &mut unit, "t2", 0).unwrap();
        assert!(unit.task("t2").unwrap().photo_proofs.is_empty());
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let john = user("cleaner-1");
        let mut unit = open_unit();
        add_photo(&john, &mut unit, "t2", "a".into()).unwrap();
        assert_eq!(remove_photo(&john, &mut unit, "t2", 3), Ok(None));
        assert_eq!(unit.task("t2").unwrap().photo_proofs.len(), 1);
    }

    #[test]
    fn other_cleaner_cannot_add_photo() {
        let mut unit = open_unit();
        let err = add_photo(&user("cleaner-2"), &mut unit, "t1", "p".into()).unwrap_err();
        assert!(matches!(err, TaskError::Lifecycle(_)));
        assert!(unit.task("t1").unwrap().photo_proofs.is_empty());
    }
}
