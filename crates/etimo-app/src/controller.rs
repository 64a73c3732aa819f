use std::io::BufRead;
use std::sync::Arc;

use etimo_core::{KeyValueStore, SearchController};
use etimo_lookup::EtymologyLookup;
use etimo_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::spawn_input_reader;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(64), // one snapshot per event
            ui_to_app: kanal::bounded_async(64), // typed commands
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new() -> Self {
        Self {
            channels: ChannelSet::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Start the event loop and the terminal front end.
    /// The input reader runs on its own thread and is not part of the set.
    pub fn spawn_tasks<S, R, W>(
        &self,
        search: SearchController<S>,
        lookup: Arc<dyn EtymologyLookup>,
        seed_word: Option<String>,
        input: R,
        output: W,
    ) -> JoinSet<anyhow::Result<()>>
    where
        S: KeyValueStore + 'static,
        R: BufRead + Send + 'static,
        W: std::io::Write + Send + 'static,
    {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            search,
            lookup,
            seed_word,
            self.channels.ui_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
            self.cancel_token.child_token(),
        ));

        // UI loop
        tasks.spawn(ui_loop(self.channels.app_to_ui.1.clone(), output));

        spawn_input_reader(input, self.channels.ui_to_app.0.clone().to_sync());

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Default for AppController {
    fn default() -> Self {
        Self::new()
    }
}
