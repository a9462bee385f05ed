use serde::{Deserialize, Serialize};

/// Maximum number of photo proofs a single task can carry
pub const MAX_PHOTO_PROOFS: usize = 5;

/// Kind of work a checklist item represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskType {
    Cleaning,
    Inventory,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Cleaning => "CLEANING",
            TaskType::Inventory => "INVENTORY",
        }
    }

    /// Lenient mapping used for generated tasks: anything that isn't
    /// exactly `INVENTORY` is treated as cleaning work.
    pub fn from_loose(s: &str) -> TaskType {
        if s == "INVENTORY" {
            TaskType::Inventory
        } else {
            TaskType::Cleaning
        }
    }

    /// Strict parse for user input
    pub fn parse(s: &str) -> Option<TaskType> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLEANING" => Some(TaskType::Cleaning),
            "INVENTORY" => Some(TaskType::Inventory),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One checklist item within a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within the owning unit
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    /// Inline image payloads (data URLs) or image URLs, oldest first
    #[serde(default)]
    pub photo_proofs: Vec<String>,
}

impl Task {
    /// Create a new, incomplete task with no proofs
    pub fn new(id: impl Into<String>, title: impl Into<String>, task_type: TaskType) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            task_type,
            description: None,
            is_completed: false,
            photo_proofs: Vec::new(),
        }
    }

    pub fn has_proof(&self) -> bool {
        !self.photo_proofs.is_empty()
    }

    pub fn proofs_full(&self) -> bool {
        self.photo_proofs.len() >= MAX_PHOTO_PROOFS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut task = Task::new("t1", "Deep Clean Bathroom", TaskType::Cleaning);
        task.photo_proofs.push("data:image/png;base64,AAAA".into());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "CLEANING");
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["photoProofs"][0], "data:image/png;base64,AAAA");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn missing_optional_fields_default() {
        let task: Task =
            serde_json::from_str(r#"{"id":"t9","title":"Mop","type":"INVENTORY"}"#).unwrap();
        assert_eq!(task.task_type, TaskType::Inventory);
        assert!(!task.is_completed);
        assert!(task.photo_proofs.is_empty());
    }

    #[test]
    fn loose_type_mapping() {
        assert_eq!(TaskType::from_loose("INVENTORY"), TaskType::Inventory);
        assert_eq!(TaskType::from_loose("inventory"), TaskType::Cleaning);
        assert_eq!(TaskType::from_loose(" INVENTORY"), TaskType::Cleaning);
        assert_eq!(TaskType::from_loose("LAUNDRY"), TaskType::Cleaning);
        assert_eq!(TaskType::from_loose(""), TaskType::Cleaning);
    }

    #[test]
    fn strict_type_parse() {
        assert_eq!(TaskType::parse("cleaning"), Some(TaskType::Cleaning));
        assert_eq!(TaskType::parse("Inventory"), Some(TaskType::Inventory));
        assert_eq!(TaskType::parse("laundry"), None);
    }
}
