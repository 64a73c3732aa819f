use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

fn default_storage_key() -> String {
    "etimo_history".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct HistoryConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Overrides the platform data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            data_dir: None,
        }
    }
}

impl HistoryConfig {
    /// Directory holding persisted entries. `None` when no override is set
    /// and the platform has no home directory.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Some(dir.clone());
        }

        ProjectDirs::from("com", "etimo", "etimo").map(|dirs| dirs.data_local_dir().to_path_buf())
    }
}
