//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local chat API.
//!
//! # Features
//!
//! - Async HTTP communication with the `/api/chat` endpoint
//! - Per-request model and sampling options
//! - Request pacing and optional retries from a [`ThrottlePolicy`]
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use headcount_llm::OllamaProvider;
//! use headcount_domain::{GenerationRequest, LlmProvider};
//! use std::time::Duration;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", Duration::from_secs(300)).unwrap();
//! let reply = provider.generate(&GenerationRequest::new("mistral", "Say hello")).unwrap();
//! println!("{}", reply);
//! ```

use crate::throttle::{RequestClock, ThrottlePolicy};
use crate::LlmError;
use headcount_domain::{GenerationRequest, LlmProvider, SamplingOptions};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (5 minutes; large local models are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    client: reqwest::Client,
    throttle: ThrottlePolicy,
    clock: RequestClock,
    runtime: OnceLock<tokio::runtime::Runtime>,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessageOut<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "SamplingOptions::is_empty")]
    options: SamplingOptions,
}

#[derive(Serialize)]
struct ChatMessageOut<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatMessageIn>,
}

#[derive(Deserialize)]
struct ChatMessageIn {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `timeout`: Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Other` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
            throttle: ThrottlePolicy::default(),
            clock: RequestClock::default(),
            runtime: OnceLock::new(),
        })
    }

    /// Create a provider on `http://localhost:11434` with the default timeout
    pub fn default_endpoint() -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Set the throttle policy
    pub fn with_throttle(mut self, throttle: ThrottlePolicy) -> Self {
        self.throttle = throttle;
        self
    }

    /// The active throttle policy
    pub fn throttle(&self) -> &ThrottlePolicy {
        &self.throttle
    }

    /// Block for the configured pause between two variant runs
    pub fn cool_down(&self) {
        let pause = self.throttle.variant_cooldown();
        if !pause.is_zero() {
            info!("Cooling down for {}s before the next variant", pause.as_secs());
            std::thread::sleep(pause);
        }
    }

    /// Send a chat request to Ollama
    ///
    /// # Errors
    ///
    /// - `ModelNotAvailable` when Ollama answers 404
    /// - `RateLimitExceeded` when Ollama answers 429
    /// - `Communication` for network failures and other error statuses
    /// - `InvalidResponse` when the body is not a chat response or the
    ///   message content is empty
    pub async fn chat(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let mut attempt = 1;
        loop {
            let wait = self.clock.reserve(self.throttle.min_interval());
            if !wait.is_zero() {
                debug!("Throttling request for {} ms", wait.as_millis());
                tokio::time::sleep(wait).await;
            }

            match self.send_once(request).await {
                Err(e) if e.is_retryable() && attempt < self.throttle.max_attempts => {
                    let delay = self.throttle.backoff_delay(attempt);
                    warn!(
                        "Attempt {}/{} failed for model '{}': {}; retrying in {} ms",
                        attempt,
                        self.throttle.max_attempts,
                        request.model,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessageOut {
                role: "user",
                content: &request.prompt,
            }],
            stream: false,
            options: request.sampling,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(request.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        match chat.message {
            Some(message) if !message.content.trim().is_empty() => Ok(message.content),
            _ => Err(LlmError::InvalidResponse("No valid response from LLM".to_string())),
        }
    }

    fn runtime(&self) -> Result<&tokio::runtime::Runtime, LlmError> {
        if let Some(runtime) = self.runtime.get() {
            return Ok(runtime);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;
        // A concurrent initializer may have won; either runtime is fine.
        let _ = self.runtime.set(runtime);
        self.runtime
            .get()
            .ok_or_else(|| LlmError::Other("Runtime unavailable".to_string()))
    }
}

impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    fn generate(&self, request: &GenerationRequest) -> Result<String, Self::Error> {
        // Blocking wrapper for the async client
        self.runtime()?.block_on(self.chat(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one HTTP response per connection, in order, and hand back each request body
    fn scripted_server(replies: Vec<(&'static str, &'static str)>) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status_line, body) in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let body_start = loop {
                    let n = stream.read(&mut chunk).unwrap();
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                };
                let headers = String::from_utf8_lossy(&buf[..body_start]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while buf.len() < body_start + content_length {
                    let n = stream.read(&mut chunk).unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let _ = tx.send(String::from_utf8_lossy(&buf[body_start..]).to_string());

                let response = format!(
                    "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        (format!("http://{}", addr), rx)
    }

    fn one_shot_server(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        scripted_server(vec![(status_line, body)])
    }

    fn provider(endpoint: &str) -> OllamaProvider {
        OllamaProvider::new(endpoint, Duration::from_secs(5))
            .unwrap()
            .with_throttle(ThrottlePolicy::unthrottled())
    }

    #[test]
    fn test_ollama_provider_creation() {
        let provider = provider("http://localhost:11434/");
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.throttle().max_attempts, 1);
    }

    #[test]
    fn test_generate_returns_message_content() {
        let (endpoint, rx) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"{"model":"mistral","message":{"role":"assistant","content":"{\"number_of_people\": 3}"},"done":true}"#,
        );
        let request = GenerationRequest::new("mistral", "count people").with_sampling(SamplingOptions {
            temperature: Some(0.7),
            top_k: Some(50),
            ..Default::default()
        });

        let reply = provider(&endpoint).generate(&request).unwrap();
        assert_eq!(reply, r#"{"number_of_people": 3}"#);

        let sent: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
        assert_eq!(sent["model"], "mistral");
        assert_eq!(sent["stream"], false);
        assert_eq!(sent["messages"][0]["role"], "user");
        assert_eq!(sent["messages"][0]["content"], "count people");
        assert_eq!(sent["options"]["top_k"], 50);
        assert!(sent["options"].get("top_p").is_none());
    }

    #[test]
    fn test_options_omitted_when_unset() {
        let (endpoint, rx) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"{"message":{"role":"assistant","content":"ok"},"done":true}"#,
        );
        provider(&endpoint)
            .generate(&GenerationRequest::new("phi4", "p"))
            .unwrap();

        let sent: serde_json::Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
        assert!(sent.get("options").is_none());
    }

    #[test]
    fn test_empty_content_is_invalid_response() {
        let (endpoint, _rx) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"{"message":{"role":"assistant","content":"  "},"done":true}"#,
        );
        let err = provider(&endpoint)
            .generate(&GenerationRequest::new("mistral", "p"))
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_not_found_maps_to_model_not_available() {
        let (endpoint, _rx) = one_shot_server(
            "HTTP/1.1 404 Not Found",
            r#"{"error":"model 'nope' not found"}"#,
        );
        let err = provider(&endpoint)
            .generate(&GenerationRequest::new("nope", "p"))
            .unwrap_err();
        match err {
            LlmError::ModelNotAvailable(model) => assert_eq!(model, "nope"),
            other => panic!("Expected ModelNotAvailable, got {:?}", other),
        }
    }

    #[test]
    fn test_server_error_maps_to_communication() {
        let (endpoint, _rx) = one_shot_server("HTTP/1.1 500 Internal Server Error", r#"{"error":"boom"}"#);
        let err = provider(&endpoint)
            .generate(&GenerationRequest::new("mistral", "p"))
            .unwrap_err();
        assert!(matches!(err, LlmError::Communication(_)));
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        // Nothing listens on port 1
        let err = provider("http://127.0.0.1:1")
            .generate(&GenerationRequest::new("mistral", "p"))
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_chat_retries_communication_errors() {
        let (endpoint, rx) = scripted_server(vec![
            ("HTTP/1.1 503 Service Unavailable", r#"{"error":"loading model"}"#),
            ("HTTP/1.1 200 OK", r#"{"message":{"role":"assistant","content":"done"},"done":true}"#),
        ]);
        let throttle = ThrottlePolicy {
            max_attempts: 2,
            backoff_base_ms: 10,
            ..ThrottlePolicy::unthrottled()
        };
        let provider = OllamaProvider::new(endpoint, Duration::from_secs(5))
            .unwrap()
            .with_throttle(throttle);

        let reply = provider.chat(&GenerationRequest::new("mistral", "p")).await.unwrap();
        assert_eq!(reply, "done");
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[tokio::test]
    async fn test_chat_does_not_retry_missing_model() {
        let (endpoint, rx) = scripted_server(vec![("HTTP/1.1 404 Not Found", "{}")]);
        let throttle = ThrottlePolicy {
            max_attempts: 3,
            backoff_base_ms: 10,
            ..ThrottlePolicy::unthrottled()
        };
        let provider = OllamaProvider::new(endpoint, Duration::from_secs(5))
            .unwrap()
            .with_throttle(throttle);

        let err = provider.chat(&GenerationRequest::new("nope", "p")).await.unwrap_err();
        assert!(matches!(err, LlmError::ModelNotAvailable(_)));
        assert_eq!(rx.try_iter().count(), 1);
    }

    // Integration test (requires running Ollama)
    #[test]
    #[ignore]
    fn test_ollama_generate_integration() {
        let provider = OllamaProvider::default_endpoint().unwrap();
        let result = provider.generate(&GenerationRequest::new("mistral", "Say 'hello' and nothing else"));
        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
