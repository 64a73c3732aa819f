use std::io::BufRead;
use std::thread::JoinHandle;

use etimo_types::{AppEvent, UiEvent};
use kanal::Sender;

/// Parse one line of terminal input
pub fn parse_command(line: &str) -> Option<UiEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(command) = line.strip_prefix(':') else {
        return Some(UiEvent::Submit(line.to_string()));
    };

    match command.trim() {
        "q" | "quit" => Some(UiEvent::Quit),
        "r" | "retry" => Some(UiEvent::Retry),
        "c" | "clear" => Some(UiEvent::ClearHistory),
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => Some(UiEvent::SelectHistory(n - 1)),
            _ => {
                tracing::warn!("Unknown command: :{}", other);
                None
            }
        },
    }
}

/// Read commands on a plain thread so a pending read never holds up runtime shutdown.
/// End of input is reported as `Quit`.
pub fn spawn_input_reader<R>(reader: R, ui_to_app_tx: Sender<AppEvent>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            };

            let Some(event) = parse_command(&line) else {
                continue;
            };

            let quit = event == UiEvent::Quit;
            if ui_to_app_tx.send(AppEvent::UiEvent(event)).is_err() || quit {
                return;
            }
        }

        let _ = ui_to_app_tx.send(AppEvent::UiEvent(UiEvent::Quit));
    })
}
