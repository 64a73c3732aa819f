use std::time::Duration;

use async_trait::async_trait;
use etimo_config::lookup::LookupConfig;
use etimo_types::EtymologyRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prompt::{build_prompt, parse_record, response_schema};
use crate::{EtymologyLookup, LookupError, ProviderMetadata, UpstreamError};

/// Gemini `generateContent` client with structured JSON output
#[derive(Clone)]
pub struct GeminiLookup {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
    target_language: String,
}

impl GeminiLookup {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            target_language: config.target_language.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }
}

#[async_trait]
impl EtymologyLookup for GeminiLookup {
    async fn lookup(&self, word: &str) -> Result<EtymologyRecord, LookupError> {
        if self.api_key.is_empty() {
            return Err(LookupError::Configuration(
                "API_KEY not found, set it in the environment".to_string(),
            ));
        }

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(word, &self.target_language)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        tracing::debug!("Requesting etymology of '{}' from {}", word, self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == 429 {
            return Err(UpstreamError::RateLimitExceeded.into());
        }

        if status == 401 || status == 403 {
            return Err(UpstreamError::AuthenticationError.into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::ApiError(format!("HTTP {status}: {body}")).into());
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        let text = body.text().ok_or(UpstreamError::EmptyResponse)?;
        let record = parse_record(&text)?;

        tracing::debug!("Received etymology for '{}'", record.word);
        Ok(record)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Gemini".to_string(),
            model: self.model.clone(),
            requires_api_key: true,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, `None` when there is no text
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    use super::*;

    fn config(api_key: &str, api_url: &str) -> LookupConfig {
        LookupConfig {
            api_key: api_key.to_string(),
            api_url: api_url.to_string(),
            timeout_seconds: 5,
            ..LookupConfig::default()
        }
    }

    /// Serves one canned HTTP response and hands back the raw request
    async fn serve_once(status: &'static str, body: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        });

        (format!("http://{addr}/v1beta"), rx)
    }

    fn candidate_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_network() {
        // Port 9 on an unroutable host: any network attempt would error differently
        let lookup = GeminiLookup::new(&config("", "http://192.0.2.1:9")).unwrap();

        let result = timeout(Duration::from_secs(1), lookup.lookup("aluno"))
            .await
            .expect("lookup should fail immediately");

        assert!(matches!(result, Err(LookupError::Configuration(_))));
    }

    #[tokio::test]
    async fn parses_structured_candidate() {
        let payload = r#"{"word":"aluno","origin":"latim","truth":"alumnus","context":"..."}"#;
        let (url, request_rx) = serve_once("200 OK", candidate_body(payload)).await;
        let lookup = GeminiLookup::new(&config("test-key", &url)).unwrap();

        let record = lookup.lookup("aluno").await.unwrap();
        assert_eq!(record.word, "aluno");
        assert!(record.myth.is_none());
        assert!(record.fun_fact.is_none());

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-3-flash-preview:generateContent"));
        assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains("\"responseMimeType\":\"application/json\""));
        assert!(request.contains("\\\"aluno\\\""));
    }

    #[tokio::test]
    async fn empty_candidate_is_upstream_error() {
        let (url, _rx) = serve_once("200 OK", r#"{"candidates":[]}"#.to_string()).await;
        let lookup = GeminiLookup::new(&config("test-key", &url)).unwrap();

        let err = lookup.lookup("aluno").await.unwrap_err();
        assert!(matches!(err, LookupError::Upstream(UpstreamError::EmptyResponse)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn unparseable_text_is_upstream_error() {
        let (url, _rx) = serve_once("200 OK", candidate_body("não sei")).await;
        let lookup = GeminiLookup::new(&config("test-key", &url)).unwrap();

        let err = lookup.lookup("aluno").await.unwrap_err();
        assert!(matches!(
            err,
            LookupError::Upstream(UpstreamError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_upstream() {
        let (url, _rx) = serve_once("429 Too Many Requests", "{}".to_string()).await;
        let lookup = GeminiLookup::new(&config("test-key", &url)).unwrap();

        let err = lookup.lookup("aluno").await.unwrap_err();
        assert!(matches!(
            err,
            LookupError::Upstream(UpstreamError::RateLimitExceeded)
        ));
    }

    #[tokio::test]
    async fn rejected_key_maps_to_upstream() {
        let (url, _rx) = serve_once("403 Forbidden", "{}".to_string()).await;
        let lookup = GeminiLookup::new(&config("bad-key", &url)).unwrap();

        let err = lookup.lookup("aluno").await.unwrap_err();
        assert!(matches!(
            err,
            LookupError::Upstream(UpstreamError::AuthenticationError)
        ));
    }

    #[test]
    fn text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));
    }
}
