use std::fmt;
use std::io::Write;

use etimo_types::{AppEvent, EtymologyRecord, SearchStatus, Snapshot};
use kanal::AsyncReceiver;

/// Word whose folk etymology gets an extra debunking block
pub const REFERENCE_WORD: &str = "aluno";

const ALUNO_DEBUNK: &str = "Conclusão sobre \"Aluno\"\n  \
    A palavra aluno NÃO significa \"sem luz\". Essa é uma falsa etimologia.\n  \
    A verdadeira raiz vem do latim alumnus, que deriva de alere (\"alimentar\", \"nutrir\").\n  \
    ✗ a (sem) + lumen (luz)\n  \
    ✓ alere (nutrir/alimentar)";

const HELP: &str = "Digite uma palavra. :<n> repete uma busca recente, :r tenta de novo, \
    :c limpa o histórico, :q sai.";

/// Canned block shown next to the result for the reference word
pub fn debunk_block(record: &EtymologyRecord) -> Option<&'static str> {
    (record.word.trim().to_lowercase() == REFERENCE_WORD).then_some(ALUNO_DEBUNK)
}

/// Terminal view of a snapshot
pub struct View<'a>(pub &'a Snapshot);

impl fmt::Display for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;

        writeln!(f, "EtimoAI | A verdade por trás de cada sílaba")?;
        writeln!(f)?;

        match &snapshot.state.status {
            SearchStatus::Idle => {
                writeln!(f, "Pronto para mergulhar no passado das palavras?")?;
            }
            SearchStatus::Loading => {
                writeln!(
                    f,
                    "Buscando a etimologia de \"{}\"...",
                    snapshot.state.query
                )?;
            }
            SearchStatus::Error(message) => {
                writeln!(f, "Oops! Algo deu errado.")?;
                writeln!(f, "  {message}")?;
                writeln!(f, "  Digite :r para tentar novamente.")?;
            }
            SearchStatus::Success(record) => {
                write_record(f, record)?;
                if let Some(block) = debunk_block(record) {
                    writeln!(f)?;
                    writeln!(f, "{block}")?;
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Histórico")?;
        if snapshot.history.is_empty() {
            writeln!(f, "  Nenhuma pesquisa recente.")?;
        } else {
            for (i, word) in snapshot.history.iter().enumerate() {
                let marker = if *word == snapshot.state.query { '*' } else { ' ' };
                writeln!(f, " {marker}{:>2}. {word}", i + 1)?;
            }
        }

        writeln!(f)?;
        write!(f, "{HELP}")
    }
}

fn write_record(f: &mut fmt::Formatter<'_>, record: &EtymologyRecord) -> fmt::Result {
    writeln!(f, "Etimologia de {}", record.word)?;
    writeln!(f, "  Raiz: {}", record.origin)?;

    if let Some(myth) = &record.myth {
        writeln!(f)?;
        writeln!(f, "O Mito Comum")?;
        writeln!(f, "  \"{myth}\"")?;
    }

    writeln!(f)?;
    writeln!(f, "A Origem Real")?;
    writeln!(f, "  {}", record.truth)?;

    writeln!(f)?;
    writeln!(f, "Evolução e Contexto")?;
    writeln!(f, "  {}", record.context)?;

    if let Some(fun_fact) = &record.fun_fact {
        writeln!(f)?;
        writeln!(f, "Você sabia?")?;
        writeln!(f, "  {fun_fact}")?;
    }

    Ok(())
}

/// Draw every snapshot the app sends until shutdown
pub async fn ui_loop<W: Write + Send>(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    mut out: W,
) -> anyhow::Result<()> {
    while let Ok(event) = app_to_ui_rx.recv().await {
        match event {
            AppEvent::Render(snapshot) => {
                writeln!(out, "\n{}", View(&snapshot))?;
                write!(out, "> ")?;
                out.flush()?;
            }
            AppEvent::Shutdown => {
                writeln!(out)?;
                break;
            }
            AppEvent::UiEvent(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use etimo_types::SearchState;

    use super::*;

    fn record(word: &str) -> EtymologyRecord {
        EtymologyRecord {
            word: word.to_string(),
            origin: "latim alumnus".to_string(),
            myth: None,
            truth: "Vem de alere.".to_string(),
            context: "Usado desde o século XVI.".to_string(),
            fun_fact: None,
        }
    }

    fn snapshot(status: SearchStatus, history: &[&str]) -> Snapshot {
        Snapshot {
            state: SearchState {
                query: "aluno".to_string(),
                status,
            },
            history: history.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn debunk_block_only_for_reference_word() {
        assert!(debunk_block(&record("aluno")).is_some());
        assert!(debunk_block(&record("ALUNO")).is_some());
        assert!(debunk_block(&record("alumno")).is_none());
    }

    #[test]
    fn idle_view() {
        let view = View(&snapshot(SearchStatus::Idle, &[])).to_string();
        assert!(view.contains("Pronto para mergulhar"));
        assert!(view.contains("Nenhuma pesquisa recente."));
    }

    #[test]
    fn loading_view_shows_query() {
        let view = View(&snapshot(SearchStatus::Loading, &[])).to_string();
        assert!(view.contains("Buscando a etimologia de \"aluno\""));
    }

    #[test]
    fn error_view_shows_message_and_retry_hint() {
        let view = View(&snapshot(SearchStatus::Error("falhou".into()), &[])).to_string();
        assert!(view.contains("falhou"));
        assert!(view.contains(":r"));
    }

    #[test]
    fn success_view_skips_absent_optionals() {
        let view = View(&snapshot(SearchStatus::Success(record("saudade")), &["saudade"])).to_string();

        assert!(view.contains("Raiz: latim alumnus"));
        assert!(view.contains("A Origem Real"));
        assert!(!view.contains("O Mito Comum"));
        assert!(!view.contains("Você sabia?"));
        assert!(!view.contains("Conclusão sobre"));
        assert!(view.contains(" 1. saudade"));
    }

    #[test]
    fn success_view_renders_optionals_and_debunk() {
        let mut rec = record("aluno");
        rec.myth = Some("a + lumen".to_string());
        rec.fun_fact = Some("alumnus também deu 'alumni'".to_string());

        let view = View(&snapshot(SearchStatus::Success(rec), &["aluno"])).to_string();

        assert!(view.contains("\"a + lumen\""));
        assert!(view.contains("Você sabia?"));
        assert!(view.contains("Conclusão sobre \"Aluno\""));
        assert!(view.contains("* 1. aluno"));
    }

    #[tokio::test]
    async fn ui_loop_draws_until_shutdown() {
        let (tx, rx) = kanal::unbounded_async::<AppEvent>();
        tx.send(AppEvent::Render(snapshot(SearchStatus::Idle, &[])))
            .await
            .unwrap();
        tx.send(AppEvent::Shutdown).await.unwrap();

        let mut out = Vec::new();
        ui_loop(rx, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Pronto para mergulhar"));
        assert!(text.contains("> "));
    }
}
