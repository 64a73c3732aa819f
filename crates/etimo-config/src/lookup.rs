use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_target_language() -> String {
    "Português do Brasil".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct LookupConfig {
    /// Credential for the inference service. Read from `API_KEY`, never written back to disk
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Language the explanation is written in
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_api_url(),
            model: default_model(),
            target_language: default_target_language(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
