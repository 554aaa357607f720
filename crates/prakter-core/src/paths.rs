use crate::error::{PrakterError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const README_MD: &str = "README.md";
pub const CHANGELOG_JSON: &str = "CHANGELOG.json";
pub const TODO_JSON: &str = "TODO.json";

pub const PRAKTER_DIR: &str = ".prakter";
pub const CONFIG_FILE: &str = ".prakter/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn readme_path(root: &Path) -> PathBuf {
    root.join(README_MD)
}

pub fn changelog_path(root: &Path) -> PathBuf {
    root.join(CHANGELOG_JSON)
}

pub fn todo_path(root: &Path) -> PathBuf {
    root.join(TODO_JSON)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Fail with `MissingWorkspace` unless `root` is an existing directory.
pub fn require_workspace(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(PrakterError::MissingWorkspace(root.to_path_buf()))
    }
}
