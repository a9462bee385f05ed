use serde::{Deserialize, Serialize};

/// Configuration from `.cleancommand/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub workspace: WorkspaceInfo,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for WorkspaceInfo {
    fn default() -> Self {
        WorkspaceInfo {
            name: default_name(),
        }
    }
}

/// Settings for the task-suggestion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        SuggestionConfig {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SuggestionConfig {
    /// Resolve the API key from the configured environment variable.
    /// Unset and empty both mean "no credential".
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Default: see src/cli/handlers/init.rs
fn default_name() -> String {
    "CleanCommand".to_string()
}

/// Default: see src/cli/handlers/init.rs
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Default: see src/cli/handlers/init.rs
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Default: see src/cli/handlers/init.rs
fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

/// Default: see src/cli/handlers/init.rs
fn default_timeout_secs() -> u64 {
    30
}
