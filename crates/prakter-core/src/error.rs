use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrakterError {
    #[error("no workspace folder found at {}", .0.display())]
    MissingWorkspace(PathBuf),

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid change type '{0}': expected feature, fix or chore")]
    InvalidChangeType(String),

    #[error("invalid file kind '{0}': expected readme, changelog or todo")]
    InvalidFileKind(String),

    #[error("unknown category '{0}'")]
    InvalidCategory(String),

    #[error("content generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrakterError>;
