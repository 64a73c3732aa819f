use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use self::history::HistoryConfig;
use self::lookup::LookupConfig;

pub mod history;
pub mod lookup;

fn default_seed_word() -> String {
    "aluno".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    pub lookup: LookupConfig,
    pub history: HistoryConfig,

    /// Word looked up automatically at startup. Empty disables the seed lookup
    #[serde(default = "default_seed_word")]
    pub seed_word: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup: LookupConfig::default(),
            history: HistoryConfig::default(),
            seed_word: default_seed_word(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_vars(|key| env::var(key).ok());
        config
    }

    /// Load a JSON config file, then layer the environment on top
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading config from {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("failed to open config file {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        config.apply_vars(|key| env::var(key).ok());
        Ok(config)
    }

    /// Override fields from variables resolved by `var`
    pub fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(api_key) = var("API_KEY").filter(|v| !v.trim().is_empty()) {
            self.lookup.api_key = api_key.trim().to_string();
        }

        if let Some(api_url) = var("GEMINI_API_URL") {
            self.lookup.api_url = api_url;
        }

        if let Some(model) = var("GEMINI_MODEL") {
            self.lookup.model = model;
        }

        if let Some(language) = var("ETIMO_TARGET_LANGUAGE") {
            self.lookup.target_language = language;
        }

        if let Some(timeout) = var("HTTP_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.lookup.timeout_seconds = timeout;
        }

        if let Some(seed) = var("ETIMO_SEED_WORD") {
            self.seed_word = seed;
        }

        if let Some(dir) = var("ETIMO_DATA_DIR") {
            self.history.data_dir = Some(PathBuf::from(dir));
        }
    }
}
