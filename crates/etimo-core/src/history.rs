use crate::storage::KeyValueStore;

pub const MAX_HISTORY: usize = 10;

/// Recent searches, most recent first, mirrored to a `KeyValueStore`.
///
/// Entries are unique under case-insensitive comparison and capped at
/// [`MAX_HISTORY`]. Storage failures never reach the caller: the in-memory
/// list stays authoritative for the session and the failure is logged.
pub struct HistoryStore<S: KeyValueStore> {
    storage: S,
    key: String,
    entries: Vec<String>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Read the persisted list. Missing or malformed data yields an empty history
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = match storage.get(&key) {
            Ok(Some(data)) => match serde_json::from_str::<Vec<String>>(&data) {
                Ok(entries) => normalize(entries),
                Err(e) => {
                    tracing::warn!("Failed to parse history, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history, starting empty: {}", e);
                Vec::new()
            }
        };

        tracing::debug!("Loaded {} history entries", entries.len());
        Self {
            storage,
            key,
            entries,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, word: &str) -> &[String] {
        let lowered = word.to_lowercase();
        self.entries.retain(|entry| entry.to_lowercase() != lowered);
        self.entries.insert(0, word.to_string());
        self.entries.truncate(MAX_HISTORY);

        self.persist();
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();

        if let Err(e) = self.storage.remove(&self.key) {
            tracing::error!("Failed to remove persisted history: {}", e);
        }
    }

    fn persist(&self) {
        let data = match serde_json::to_string(&self.entries) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Failed to serialize history: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key, &data) {
            tracing::error!("Failed to persist history: {}", e);
        }
    }
}

/// Re-establish the list invariants on data read from disk
fn normalize(entries: Vec<String>) -> Vec<String> {
    let mut seen = Vec::<String>::with_capacity(MAX_HISTORY);
    let mut result = Vec::with_capacity(MAX_HISTORY);

    for entry in entries {
        if entry.trim().is_empty() {
            continue;
        }

        let lowered = entry.to_lowercase();
        if seen.contains(&lowered) {
            continue;
        }

        seen.push(lowered);
        result.push(entry);

        if result.len() == MAX_HISTORY {
            break;
        }
    }

    result
}
