use std::fs;
use std::path::Path;

use crate::io::workspace::WorkspaceError;
use crate::model::config::WorkspaceConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// Keys accepted by `ccmd config set`
pub const SETTABLE_KEYS: &[&str] = &[
    "workspace.name",
    "suggestions.model",
    "suggestions.endpoint",
    "suggestions.api_key_env",
    "suggestions.timeout_secs",
];

/// Read the workspace config. A missing file yields the defaults.
pub fn read_config(data_dir: &Path) -> Result<WorkspaceConfig, WorkspaceError> {
    let config_path = data_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(WorkspaceConfig::default());
    }
    let text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read the raw config document for round-trip-safe editing.
pub fn read_config_doc(data_dir: &Path) -> Result<toml_edit::DocumentMut, WorkspaceError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&config_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(WorkspaceError::ReadError {
                path: config_path,
                source: e,
            });
        }
    };
    Ok(text.parse()?)
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let config_path = data_dir.join(CONFIG_FILE);
    fs::write(&config_path, doc.to_string()).map_err(|e| WorkspaceError::WriteError {
        path: config_path,
        source: e,
    })
}

/// Set a dotted `table.key` in the document. Returns an error message for
/// unknown keys or values of the wrong shape.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, value: &str) -> Result<(), String> {
    if !SETTABLE_KEYS.contains(&key) {
        return Err(format!(
            "unknown config key '{}' (expected one of: {})",
            key,
            SETTABLE_KEYS.join(", ")
        ));
    }
    let (table, field) = key
        .split_once('.')
        .ok_or_else(|| format!("malformed key '{}'", key))?;

    if !doc.contains_key(table) {
        doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    if field == "timeout_secs" {
        let secs: i64 = value
            .parse()
            .ok()
            .filter(|n: &i64| *n > 0)
            .ok_or_else(|| format!("timeout_secs must be a positive integer, got '{}'", value))?;
        doc[table][field] = toml_edit::value(secs);
    } else {
        doc[table][field] = toml_edit::value(value);
    }
    Ok(())
}
