//! Default records written on first run.

use crate::model::task::{Task, TaskType};
use crate::model::unit::{Unit, UnitStatus};
use crate::model::user::{User, UserRole};

fn user(id: &str, name: &str, role: UserRole, email: &str, avatar: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        role,
        email: email.to_string(),
        avatar_url: Some(avatar.to_string()),
    }
}

pub fn default_users() -> Vec<User> {
    vec![
        user(
            "admin-1",
            "Sarah Boss",
            UserRole::Admin,
            "admin@clean.com",
            "https://picsum.photos/id/64/100/100",
        ),
        user(
            "cleaner-1",
            "John Cleaner",
            UserRole::Cleaner,
            "john@clean.com",
            "https://picsum.photos/id/91/100/100",
        ),
        user(
            "cleaner-2",
            "Jane Duster",
            UserRole::Cleaner,
            "jane@clean.com",
            "https://picsum.photos/id/177/100/100",
        ),
    ]
}

pub fn default_units(now_ms: i64) -> Vec<Unit> {
    let vacuumed = Task {
        is_completed: true,
        photo_proofs: vec!["https://picsum.photos/id/20/300/300".to_string()],
        ..Task::new("t3", "Vacuum Living Room", TaskType::Cleaning)
    };

    vec![
        Unit {
            id: "unit-101".to_string(),
            name: "Sunset Apt 101".to_string(),
            address: "123 Sunset Blvd".to_string(),
            deadline: "12:00 PM".to_string(),
            status: UnitStatus::Open,
            assigned_user_id: Some("cleaner-1".to_string()),
            tasks: vec![
                Task::new("t1", "Check Kitchen Inventory", TaskType::Inventory),
                Task::new("t2", "Deep Clean Bathroom", TaskType::Cleaning),
            ],
            last_updated: now_ms,
        },
        Unit {
            id: "unit-204".to_string(),
            name: "Downtown Loft 204".to_string(),
            address: "44 Main St".to_string(),
            deadline: "02:00 PM".to_string(),
            status: UnitStatus::Rework,
            assigned_user_id: Some("cleaner-1".to_string()),
            tasks: vec![
                vacuumed,
                Task::new("t4", "Restock Toiletries", TaskType::Inventory),
            ],
            last_updated: now_ms,
        },
    ]
}
