use serde::Serialize;

use crate::model::task::{Task, TaskType};
use crate::model::unit::{Unit, UnitStatus};
use crate::model::user::{User, UserRole};
use crate::ops::lifecycle::UnitAction;
use crate::ops::unit_ops::Progress;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSummaryJson {
    pub id: String,
    pub name: String,
    pub address: String,
    pub deadline: String,
    pub status: UnitStatus,
    pub assigned_user_id: Option<String>,
    pub assignee: String,
    pub progress: Progress,
    pub last_updated: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_completed: bool,
    pub photo_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDetailJson {
    #[serde(flatten)]
    pub summary: UnitSummaryJson,
    pub editable: bool,
    pub actions: Vec<UnitAction>,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ProofJson {
    pub index: usize,
    pub proof: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn unit_summary_json(unit: &Unit, assignee: String, progress: Progress) -> UnitSummaryJson {
    UnitSummaryJson {
        id: unit.id.clone(),
        name: unit.name.clone(),
        address: unit.address.clone(),
        deadline: unit.deadline.clone(),
        status: unit.status,
        assigned_user_id: unit.assigned_user_id.clone(),
        assignee,
        progress,
        last_updated: unit.last_updated,
    }
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        task_type: task.task_type,
        description: task.description.clone(),
        is_completed: task.is_completed,
        photo_count: task.photo_proofs.len(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn checkbox(task: &Task) -> char {
    if task.is_completed { 'x' } else { ' ' }
}

fn photo_label(count: usize) -> String {
    match count {
        1 => "1 photo attached".to_string(),
        n => format!("{} photos attached", n),
    }
}

/// Format a unit as a one-line list entry
pub fn format_unit_line(unit: &Unit, progress: Progress) -> String {
    let address = if unit.address.is_empty() {
        String::new()
    } else {
        format!(" - {}", unit.address)
    };
    format!(
        "[{}] {}  {}{}  due {}  {}/{} tasks ({}%)",
        unit.status,
        unit.id,
        unit.name,
        address,
        unit.deadline,
        progress.completed,
        progress.total,
        progress.percent
    )
}

/// Format a checklist row
pub fn format_task_line(task: &Task) -> String {
    let photos = if task.has_proof() {
        format!("  ({})", photo_label(task.photo_proofs.len()))
    } else {
        String::new()
    };
    format!(
        "[{}] {} {} <{}>{}",
        checkbox(task),
        task.id,
        task.title,
        task.task_type,
        photos
    )
}

/// Format the unit detail view
pub fn format_unit_detail(
    unit: &Unit,
    assignee: &str,
    progress: Progress,
    editable: bool,
    actions: &[UnitAction],
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("{} ({}) [{}]", unit.name, unit.id, unit.status));
    if !unit.address.is_empty() {
        lines.push(format!("address: {}", unit.address));
    }
    lines.push(format!("assigned: {}", assignee));
    lines.push(format!("deadline: {}", unit.deadline));
    lines.push(format!(
        "progress: {}/{} tasks ({}%)",
        progress.completed, progress.total, progress.percent
    ));

    lines.push(String::new());
    lines.push(format!("tasks ({}):", unit.tasks.len()));
    for task in &unit.tasks {
        lines.push(format_task_line(task));
        if let Some(ref desc) = task.description {
            lines.push(format!("    {}", desc));
        }
    }

    lines.push(String::new());
    if !editable {
        lines.push("read-only".to_string());
    }
    if !actions.is_empty() {
        lines.push(format!(
            "actions: {}",
            actions
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    lines
}

/// Short preview of a proof: URLs verbatim, data URLs as mime + size
pub fn format_proof(index: usize, proof: &str) -> String {
    if let Some(rest) = proof.strip_prefix("data:") {
        let (meta, payload) = rest.split_once(',').unwrap_or((rest, ""));
        let mime = meta.split(';').next().unwrap_or("");
        format!("{}: inline {} ({} bytes encoded)", index, mime, payload.len())
    } else {
        format!("{}: {}", index, proof)
    }
}

pub fn format_user_line(user: &User) -> String {
    format!("{}  {} <{}> {}", user.id, user.name, user.email, user.role)
}

pub fn format_suggestion_line(task_type: TaskType, title: &str) -> String {
    format!("{:<9}  {}", task_type.as_str(), title)
}

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// Parse a role string
pub fn parse_role(s: &str) -> Result<UserRole, String> {
    match s.to_ascii_lowercase().as_str() {
        "admin" => Ok(UserRole::Admin),
        "cleaner" => Ok(UserRole::Cleaner),
        _ => Err(format!("unknown role '{}' (expected: admin, cleaner)", s)),
    }
}

/// Parse a `--task` value: `TYPE:title`, or a bare title for cleaning work
pub fn parse_task_arg(s: &str) -> Result<(TaskType, String), String> {
    let (kind, title) = match s.split_once(':') {
        Some((prefix, rest)) => match TaskType::parse(prefix) {
            Some(kind) => (kind, rest.trim()),
            None => (TaskType::Cleaning, s.trim()),
        },
        None => (TaskType::Cleaning, s.trim()),
    };
    if title.is_empty() {
        return Err(format!("task title cannot be empty: '{}'", s));
    }
    Ok((kind, title.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::seed::default_units;
    use crate::ops::unit_ops::progress;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn unit_line() {
        let unit = default_units(0).remove(1);
        assert_snapshot!(
            format_unit_line(&unit, progress(&unit)),
            @"[REWORK] unit-204  Downtown Loft 204 - 44 Main St  due 02:00 PM  1/2 tasks (50%)"
        );
    }

    #[test]
    fn task_lines() {
        let unit = default_units(0).remove(1);
        assert_snapshot!(
            format_task_line(&unit.tasks[0]),
            @"[x] t3 Vacuum Living Room <CLEANING>  (1 photo attached)"
        );
        assert_snapshot!(
            format_task_line(&unit.tasks[1]),
            @"[ ] t4 Restock Toiletries <INVENTORY>"
        );
    }

    #[test]
    fn detail_view() {
        let unit = default_units(0).remove(0);
        let lines = format_unit_detail(
            &unit,
            "John Cleaner",
            progress(&unit),
            true,
            &[UnitAction::Submit],
        );
        assert_eq!(
            lines,
            vec![
                "Sunset Apt 101 (unit-101) [OPEN]",
                "address: 123 Sunset Blvd",
                "assigned: John Cleaner",
                "deadline: 12:00 PM",
                "progress: 0/2 tasks (0%)",
                "",
                "tasks (2):",
                "[ ] t1 Check Kitchen Inventory <INVENTORY>",
                "[ ] t2 Deep Clean Bathroom <CLEANING>",
                "",
                "actions: submit",
            ]
        );
    }

    #[test]
    fn read_only_detail_has_marker() {
        let unit = default_units(0).remove(0);
        let lines = format_unit_detail(&unit, "John Cleaner", progress(&unit), false, &[]);
        assert_eq!(lines.last().unwrap(), "read-only");
    }

    #[test]
    fn proof_previews() {
        assert_eq!(
            format_proof(0, "https://picsum.photos/id/20/300/300"),
            "0: https://picsum.photos/id/20/300/300"
        );
        assert_eq!(
            format_proof(2, "data:image/png;base64,AAAABBBB"),
            "2: inline image/png (8 bytes encoded)"
        );
    }

    #[test]
    fn task_spec_parsing() {
        assert_eq!(
            parse_task_arg("INVENTORY:Count towels"),
            Ok((TaskType::Inventory, "Count towels".into()))
        );
        assert_eq!(
            parse_task_arg("cleaning: Mop"),
            Ok((TaskType::Cleaning, "Mop".into()))
        );
        assert_eq!(
            parse_task_arg("Check: the fridge"),
            Ok((TaskType::Cleaning, "Check: the fridge".into()))
        );
        assert!(parse_task_arg("INVENTORY:").is_err());
    }

    #[test]
    fn role_parsing() {
        assert_eq!(parse_role("Admin"), Ok(UserRole::Admin));
        assert_eq!(parse_role("cleaner"), Ok(UserRole::Cleaner));
        assert!(parse_role("owner").is_err());
    }
}
