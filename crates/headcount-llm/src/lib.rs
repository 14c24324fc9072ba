//! Headcount LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `headcount-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama chat API integration
//!
//! # Examples
//!
//! ```
//! use headcount_llm::MockProvider;
//! use headcount_domain::{GenerationRequest, LlmProvider};
//!
//! let provider = MockProvider::new(r#"{"filename": "a.txt", "number_of_people": 2}"#);
//! let result = provider.generate(&GenerationRequest::new("mistral", "prompt")).unwrap();
//! assert!(result.contains("number_of_people"));
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod throttle;

use headcount_domain::{GenerationRequest, LlmProvider};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use throttle::ThrottlePolicy;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid or empty response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether the service could not be reached or refused the request
    ///
    /// Transport failures are fatal to the current document. Only
    /// `InvalidResponse` means a response arrived but was unusable.
    pub fn is_transport(&self) -> bool {
        !matches!(self, LlmError::InvalidResponse(_))
    }

    /// Whether a retry could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Responses are matched by prompt fragment: the first registered fragment
/// contained in the prompt wins, otherwise the default response is returned.
/// Prompts embed the document filename, so registering the filename is
/// enough to script a per-document answer.
///
/// # Examples
///
/// ```
/// use headcount_llm::MockProvider;
/// use headcount_domain::{GenerationRequest, LlmProvider};
///
/// let mut provider = MockProvider::default();
/// provider.add_response("a.txt", "first");
/// provider.add_response("b.txt", "second");
///
/// let request = GenerationRequest::new("m", "... b.txt ...");
/// assert_eq!(provider.generate(&request).unwrap(), "second");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, MockReply)>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for prompts containing `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.into(), MockReply::Text(response.into())));
    }

    /// Fail with a communication error for prompts containing `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.into(), MockReply::Fail));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Reset the recorded requests
    pub fn reset_call_count(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn generate(&self, request: &GenerationRequest) -> Result<String, Self::Error> {
        self.requests.lock().unwrap().push(request.clone());

        let responses = self.responses.lock().unwrap();
        let reply = responses
            .iter()
            .find(|(fragment, _)| request.prompt.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail) => Err(LlmError::Communication("Mock transport error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::new("mock", prompt)
    }

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate(&request("any prompt"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_fragment_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate(&request("say hello")).unwrap(), "world");
        assert_eq!(provider.generate(&request("foo!")).unwrap(), "bar");
        assert_eq!(
            provider.generate(&request("unknown")).unwrap(),
            "Default mock response"
        );
    }

    #[test]
    fn test_first_registered_fragment_wins() {
        let mut provider = MockProvider::default();
        provider.add_response("a.txt", "first");
        provider.add_response("txt", "second");
        assert_eq!(provider.generate(&request("file a.txt")).unwrap(), "first");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.generate(&request("prompt1")).unwrap();
        provider.generate(&request("prompt2")).unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requests()[1].prompt, "prompt2");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error_is_transport() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let err = provider.generate(&request("a bad prompt")).unwrap_err();
        assert!(matches!(err, LlmError::Communication(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate(&request("test")).unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_error_classification() {
        assert!(!LlmError::InvalidResponse("empty".into()).is_transport());
        assert!(LlmError::ModelNotAvailable("phi4".into()).is_transport());
        assert!(LlmError::Other("Runtime unavailable".into()).is_transport());
        assert!(!LlmError::ModelNotAvailable("phi4".into()).is_retryable());
        assert!(LlmError::RateLimitExceeded.is_retryable());
    }
}
