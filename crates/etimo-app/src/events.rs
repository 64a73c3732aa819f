use std::sync::Arc;

use etimo_core::{KeyValueStore, SearchController};
use etimo_lookup::{EtymologyLookup, LookupError};
use etimo_types::{AppEvent, EtymologyRecord, UiEvent};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

/// Everything the event loop reacts to, on one channel
enum LoopEvent {
    App(AppEvent),
    LookupFinished {
        word: String,
        outcome: Result<EtymologyRecord, LookupError>,
    },
}

/// App's main loop. Owns the search controller until shutdown
pub async fn event_loop<S: KeyValueStore + 'static>(
    mut controller: SearchController<S>,
    lookup: Arc<dyn EtymologyLookup>,
    seed_word: Option<String>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (loop_tx, loop_rx) = kanal::bounded_async::<LoopEvent>(64);

    tokio::spawn(forward_ui_events(ui_to_app_rx, loop_tx.clone()));

    let provider = lookup.metadata();
    tracing::info!("[EVENT_LOOP] Using {} ({})", provider.name, provider.model);

    if let Some(seed) = seed_word {
        if let Some(word) = controller.submit(&seed) {
            spawn_lookup(lookup.clone(), word, loop_tx.clone());
        }
    }
    publish(&controller, &app_to_ui_tx).await?;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled");
                break;
            }
            event = loop_rx.recv() => event?,
        };

        match event {
            LoopEvent::App(AppEvent::UiEvent(UiEvent::Quit)) | LoopEvent::App(AppEvent::Shutdown) => {
                tracing::info!("[EVENT_LOOP] Quit requested");
                break;
            }
            LoopEvent::App(AppEvent::UiEvent(event)) => {
                tracing::debug!("[EVENT_LOOP] UI event: {:?}", event);
                if let Some(word) = handle_ui_event(&mut controller, event) {
                    spawn_lookup(lookup.clone(), word, loop_tx.clone());
                }
            }
            LoopEvent::App(AppEvent::Render(_)) => {
                // Render events only flow towards the UI
                continue;
            }
            LoopEvent::LookupFinished { word, outcome } => {
                controller.resolve(&word, outcome);
            }
        }

        publish(&controller, &app_to_ui_tx).await?;
    }

    let _ = app_to_ui_tx.send(AppEvent::Shutdown).await;
    Ok(())
}

/// Apply a UI event; returns the word to look up when a lookup starts
fn handle_ui_event<S: KeyValueStore>(
    controller: &mut SearchController<S>,
    event: UiEvent,
) -> Option<String> {
    match event {
        UiEvent::Submit(text) => controller.submit(&text),
        UiEvent::SelectHistory(index) => controller.submit_history(index),
        UiEvent::Retry => controller.retry(),
        UiEvent::ClearHistory => {
            controller.clear_history();
            None
        }
        UiEvent::Quit => None,
    }
}

fn spawn_lookup(lookup: Arc<dyn EtymologyLookup>, word: String, loop_tx: AsyncSender<LoopEvent>) {
    tokio::spawn(async move {
        let outcome = lookup.lookup(&word).await;
        if let Err(e) = loop_tx.send(LoopEvent::LookupFinished { word, outcome }).await {
            tracing::error!("Failed to deliver lookup result: {}", e);
        }
    });
}

async fn forward_ui_events(ui_to_app_rx: AsyncReceiver<AppEvent>, loop_tx: AsyncSender<LoopEvent>) {
    while let Ok(event) = ui_to_app_rx.recv().await {
        if loop_tx.send(LoopEvent::App(event)).await.is_err() {
            return;
        }
    }

    // Input side hung up, treat as quit
    let _ = loop_tx.send(LoopEvent::App(AppEvent::Shutdown)).await;
}

async fn publish<S: KeyValueStore>(
    controller: &SearchController<S>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    app_to_ui_tx
        .send(AppEvent::Render(controller.snapshot()))
        .await?;
    Ok(())
}
