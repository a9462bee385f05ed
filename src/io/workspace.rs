use std::fs;
use std::path::{Path, PathBuf};

use crate::io::config_io;
use crate::io::storage::{Storage, StorageError};
use crate::io::store::FileStore;
use crate::model::config::WorkspaceConfig;

/// Name of the directory that marks a CleanCommand workspace
pub const WORKSPACE_DIR: &str = ".cleancommand";

/// Error type for workspace discovery and loading
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a cleancommand workspace: no .cleancommand/ directory found (run `ccmd init`)")]
    NotAWorkspace,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An opened workspace: its config plus record storage
#[derive(Debug)]
pub struct Workspace {
    /// Directory containing `.cleancommand/`
    pub root: PathBuf,
    /// The `.cleancommand/` directory itself
    pub data_dir: PathBuf,
    pub config: WorkspaceConfig,
    pub storage: Storage<FileStore>,
}

/// Walk up from `start` looking for a `.cleancommand/` directory.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(WORKSPACE_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Open the workspace rooted at `root`, seeding storage if this is its first use.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let data_dir = root.join(WORKSPACE_DIR);
    if !data_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }

    let config = config_io::read_config(&data_dir)?;
    let storage = Storage::new(FileStore::new(&data_dir))?;

    Ok(Workspace {
        root: root.to_path_buf(),
        data_dir,
        config,
        storage,
    })
}

/// Create `.cleancommand/` under `root` with the given config text.
/// Existing record files are left alone.
pub fn create_workspace(root: &Path, config_text: &str) -> Result<PathBuf, WorkspaceError> {
    let data_dir = root.join(WORKSPACE_DIR);
    fs::create_dir_all(&data_dir).map_err(|e| WorkspaceError::WriteError {
        path: data_dir.clone(),
        source: e,
    })?;
    let config_path = data_dir.join(config_io::CONFIG_FILE);
    fs::write(&config_path, config_text).map_err(|e| WorkspaceError::WriteError {
        path: config_path,
        source: e,
    })?;
    Storage::new(FileStore::new(&data_dir))?;
    Ok(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn discover_from_nested_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(WORKSPACE_DIR)).unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let found = discover_workspace(&nested).unwrap();
        assert_eq!(found, tmp.path());
    }

    #[test]
    fn discover_without_workspace_fails() {
        // Relative paths pop down to "", which resolves against the package
        // root; that directory has no .cleancommand/.
        assert!(!Path::new(WORKSPACE_DIR).exists());
        let err = discover_workspace(Path::new("no-such-dir/inner")).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotAWorkspace));
    }

    #[test]
    fn create_then_load_seeds_records() {
        let tmp = TempDir::new().unwrap();
        let data_dir = create_workspace(tmp.path(), "[workspace]\nname = \"Test Crew\"\n").unwrap();
        assert!(data_dir.join("cleancommand_units.json").exists());
        assert!(data_dir.join("cleancommand_users.json").exists());
        assert!(!data_dir.join("cleancommand_session.json").exists());

        let ws = load_workspace(tmp.path()).unwrap();
        assert_eq!(ws.config.workspace.name, "Test Crew");
        assert_eq!(ws.storage.get_units().unwrap().len(), 2);
    }

    #[test]
    fn load_without_config_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(WORKSPACE_DIR)).unwrap();
        let ws = load_workspace(tmp.path()).unwrap();
        assert_eq!(ws.config.suggestions.model, "gemini-2.5-flash");
    }
}
