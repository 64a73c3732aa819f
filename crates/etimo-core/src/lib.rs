pub mod controller;
pub mod history;
pub mod preprocess;
pub mod storage;

pub use controller::{LOOKUP_FAILED_MESSAGE, SearchController};
pub use history::{HistoryStore, MAX_HISTORY};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
