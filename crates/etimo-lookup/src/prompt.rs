use etimo_types::EtymologyRecord;
use serde_json::{Value, json};

use crate::UpstreamError;

pub fn build_prompt(word: &str, target_language: &str) -> String {
    format!(
        "Explique detalhadamente a etimologia da palavra \"{word}\". \
         Foque em desmentir mitos populares se existirem (como o de que 'aluno' significa 'sem luz') \
         e apresente a origem científica (latim, grego, etc). Responda em {target_language}."
    )
}

/// Structured output schema declared to the service, field-for-field with `EtymologyRecord`
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING" },
            "origin": { "type": "STRING", "description": "Língua e raiz original" },
            "myth": { "type": "STRING", "description": "Mitos comuns sobre essa palavra" },
            "truth": { "type": "STRING", "description": "A explicação etimológica real" },
            "context": { "type": "STRING", "description": "Evolução histórica" },
            "funFact": { "type": "STRING", "description": "Uma curiosidade linguística" }
        },
        "required": ["word", "origin", "truth", "context"]
    })
}

/// Parse the structured payload returned by the service
pub fn parse_record(text: &str) -> Result<EtymologyRecord, UpstreamError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(UpstreamError::EmptyResponse);
    }

    let mut record: EtymologyRecord = serde_json::from_str(text)
        .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;

    let required = [
        ("word", &record.word),
        ("origin", &record.origin),
        ("truth", &record.truth),
        ("context", &record.context),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(UpstreamError::MalformedResponse(format!(
            "required field `{field}` is empty"
        )));
    }

    record.myth = record.myth.filter(|v| !v.trim().is_empty());
    record.fun_fact = record.fun_fact.filter(|v| !v.trim().is_empty());

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_word_and_language() {
        let prompt = build_prompt("salário", "Português do Brasil");
        assert!(prompt.contains("\"salário\""));
        assert!(prompt.contains("mitos populares"));
        assert!(prompt.ends_with("Responda em Português do Brasil."));
    }

    #[test]
    fn schema_matches_record_fields() {
        let schema = response_schema();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["word", "origin", "myth", "truth", "context", "funFact"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
        assert_eq!(
            schema["required"],
            json!(["word", "origin", "truth", "context"])
        );
    }

    #[test]
    fn parses_record_without_optionals() {
        let record =
            parse_record(r#"{"word":"aluno","origin":"latim","truth":"alumnus","context":"..."}"#)
                .unwrap();
        assert_eq!(record.origin, "latim");
        assert!(record.myth.is_none());
        assert!(record.fun_fact.is_none());
    }

    #[test]
    fn blank_optionals_become_absent() {
        let record = parse_record(
            r#"{"word":"aluno","origin":"latim","myth":" ","truth":"t","context":"c","funFact":""}"#,
        )
        .unwrap();
        assert!(record.myth.is_none());
        assert!(record.fun_fact.is_none());
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(parse_record("  \n"), Err(UpstreamError::EmptyResponse)));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = parse_record(r#"{"word":"aluno","origin":"latim","truth":"t"}"#).unwrap_err();
        assert!(matches!(err, UpstreamError::MalformedResponse(_)));
    }

    #[test]
    fn empty_required_field_is_rejected() {
        let err = parse_record(r#"{"word":"aluno","origin":"","truth":"t","context":"c"}"#)
            .unwrap_err();
        match err {
            UpstreamError::MalformedResponse(msg) => assert!(msg.contains("origin")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_is_rejected() {
        assert!(matches!(
            parse_record("a palavra vem do latim"),
            Err(UpstreamError::MalformedResponse(_))
        ));
    }
}
