use serde::{Deserialize, Serialize};

/// Etymology of a single word, as returned by the inference service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtymologyRecord {
    pub word: String,
    /// Source language and root
    pub origin: String,
    /// Popular misconception about the word, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub myth: Option<String>,
    pub truth: String,
    /// Historical evolution
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Success(EtymologyRecord),
    /// Carries the user-facing message only
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub status: SearchStatus,
}

impl SearchState {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, SearchStatus::Loading)
    }

    pub fn result(&self) -> Option<&EtymologyRecord> {
        match &self.status {
            SearchStatus::Success(record) => Some(record),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            SearchStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub state: SearchState,
    pub history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Submit(String),
    /// Re-submit a recent search by its position (0-based)
    SelectHistory(usize),
    Retry,
    ClearHistory,
    Quit,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    UiEvent(UiEvent),
    Render(Snapshot),
    Shutdown,
}
