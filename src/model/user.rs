use serde::{Deserialize, Serialize};

/// What a user is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Cleaner,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Cleaner => "CLEANER",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account. Users come from seed data and are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    /// Login key, compared case-insensitively
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_cleaner(&self) -> bool {
        self.role == UserRole::Cleaner
    }

    pub fn email_matches(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> User {
        User {
            id: "admin-1".into(),
            name: "Sarah Boss".into(),
            role: UserRole::Admin,
            email: "admin@clean.com".into(),
            avatar_url: None,
        }
    }

    #[test]
    fn email_match_ignores_case() {
        let user = admin();
        assert!(user.email_matches("ADMIN@CLEAN.COM"));
        assert!(user.email_matches("Admin@Clean.com"));
        assert!(!user.email_matches("admin@clean.co"));
        assert!(!user.email_matches(" admin@clean.com"));
    }

    #[test]
    fn role_serializes_upper_case() {
        let json = serde_json::to_value(admin()).unwrap();
        assert_eq!(json["role"], "ADMIN");
        assert!(json.get("avatarUrl").is_none());
    }
}
