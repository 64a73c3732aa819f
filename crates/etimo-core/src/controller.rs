use etimo_lookup::LookupError;
use etimo_types::{EtymologyRecord, SearchState, SearchStatus, Snapshot};

use crate::history::HistoryStore;
use crate::preprocess::{DefaultPreprocessor, Preprocessor};
use crate::storage::KeyValueStore;

/// The only message a failed lookup ever shows; details go to the log
pub const LOOKUP_FAILED_MESSAGE: &str =
    "Não foi possível buscar a etimologia agora. Tente novamente em instantes.";

/// Search state machine: `Idle -> Loading -> Success | Error`.
///
/// The controller never performs the lookup itself. An accepted `submit`
/// returns the word to look up and the caller reports the outcome through
/// [`SearchController::resolve`]. While `Loading`, every submission is refused,
/// so at most one lookup is in flight.
pub struct SearchController<S: KeyValueStore> {
    state: SearchState,
    history: HistoryStore<S>,
    /// Word of the most recent accepted submission
    last_word: Option<String>,
}

impl<S: KeyValueStore> SearchController<S> {
    pub fn new(history: HistoryStore<S>) -> Self {
        Self {
            state: SearchState::default(),
            history,
            last_word: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Start a lookup for `input`. Returns the normalized word to look up,
    /// or `None` when the input is blank or a lookup is already in flight.
    pub fn submit(&mut self, input: &str) -> Option<String> {
        if self.is_loading() {
            tracing::debug!("Ignoring submission while a lookup is in flight");
            return None;
        }

        let word = DefaultPreprocessor.process(input);
        if word.is_empty() {
            tracing::debug!("Ignoring blank submission");
            return None;
        }

        self.begin(word)
    }

    /// Re-submit the recent search at `index`
    pub fn submit_history(&mut self, index: usize) -> Option<String> {
        let Some(word) = self.history.get(index).map(str::to_string) else {
            tracing::debug!("No history entry at {}", index);
            return None;
        };

        self.submit(&word)
    }

    /// Re-issue the last word. Only valid from `Error`
    pub fn retry(&mut self) -> Option<String> {
        if !matches!(self.state.status, SearchStatus::Error(_)) {
            tracing::debug!("Retry ignored outside of error state");
            return None;
        }

        let word = self.last_word.clone()?;
        self.begin(word)
    }

    /// Apply the outcome of the in-flight lookup for `word`
    pub fn resolve(&mut self, word: &str, outcome: Result<EtymologyRecord, LookupError>) {
        if !self.is_loading() || self.last_word.as_deref() != Some(word) {
            tracing::warn!("Dropping stale lookup result for '{}'", word);
            return;
        }

        match outcome {
            Ok(record) => {
                tracing::info!("Lookup succeeded for '{}'", word);
                self.history.record(word);
                self.state.status = SearchStatus::Success(record);
            }
            Err(e) => {
                tracing::error!("Lookup failed for '{}': {}", word, e);
                self.state.status = SearchStatus::Error(LOOKUP_FAILED_MESSAGE.to_string());
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            history: self.history.entries().to_vec(),
        }
    }

    fn begin(&mut self, word: String) -> Option<String> {
        tracing::info!("Looking up '{}'", word);
        self.state.query = word.clone();
        self.state.status = SearchStatus::Loading;
        self.last_word = Some(word.clone());
        Some(word)
    }
}
