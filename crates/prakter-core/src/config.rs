use crate::error::{PrakterError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

/// External program used to generate initial file content. It receives the
/// prompt on stdin and must print the content on stdout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_categories")]
    pub todo_categories: Vec<String>,
    /// When set, `create-files` behaves like `create-files-with-generation`.
    #[serde(default)]
    pub use_generation: bool,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_categories() -> Vec<String> {
    ["Bugs", "Features", "Improvements", "Ideas"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            todo_categories: default_categories(),
            use_generation: false,
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    /// Load `.prakter/config.yaml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        tracing::debug!(path = %path.display(), categories = cfg.todo_categories.len(), "loaded config");
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.todo_categories.iter().any(|c| c == category)
    }

    pub fn require_category(&self, category: &str) -> Result<()> {
        if self.has_category(category) {
            Ok(())
        } else {
            Err(PrakterError::InvalidCategory(category.to_string()))
        }
    }
}
