//! Text-completion backends (the black-box "prompt in, text out" call).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::result::BackendError;

/// One-shot text completion.
///
/// Implementations must not retry; a failed call is reported as-is and the
/// user decides whether to try again.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

#[async_trait]
impl<B> CompletionBackend for Arc<B>
where
    B: CompletionBackend + ?Sized,
{
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        (**self).complete(prompt).await
    }
}

/// Backend that replays canned responses in order, for tests/dev.
///
/// Records every prompt it receives. Once the script runs out, further calls
/// fail with `BackendError::InvalidResponse`.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, BackendError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn with_failure(self, err: BackendError) -> Self {
        self.push(Err(err));
        self
    }

    pub fn push(&self, response: Result<String, BackendError>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| BackendError::InvalidResponse("script lock poisoned".to_string()))?
            .pop_front();

        next.unwrap_or_else(|| Err(BackendError::InvalidResponse("script exhausted".to_string())))
    }
}

#[cfg(feature = "http")]
mod gemini {
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    use super::CompletionBackend;
    use crate::result::BackendError;

    pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

    /// Google Gemini `generateContent` backend.
    #[derive(Debug, Clone)]
    pub struct GeminiBackend {
        client: reqwest::Client,
        endpoint: String,
        model: String,
        api_key: String,
    }

    impl GeminiBackend {
        pub fn new(api_key: impl Into<String>) -> Self {
            Self {
                client: reqwest::Client::new(),
                endpoint: DEFAULT_ENDPOINT.to_string(),
                model: DEFAULT_MODEL.to_string(),
                api_key: api_key.into(),
            }
        }

        pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
            self.endpoint = endpoint.into();
            self
        }

        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }

        fn url(&self) -> String {
            format!(
                "{}/models/{}:generateContent",
                self.endpoint.trim_end_matches('/'),
                self.model
            )
        }
    }

    #[derive(Serialize)]
    struct GenerateRequest<'a> {
        contents: [RequestContent<'a>; 1],
    }

    #[derive(Serialize)]
    struct RequestContent<'a> {
        parts: [RequestPart<'a>; 1],
    }

    #[derive(Serialize)]
    struct RequestPart<'a> {
        text: &'a str,
    }

    #[derive(Deserialize)]
    struct GenerateResponse {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }

    #[derive(Deserialize)]
    struct Candidate {
        content: Option<ResponseContent>,
    }

    #[derive(Deserialize)]
    struct ResponseContent {
        #[serde(default)]
        parts: Vec<ResponsePart>,
    }

    #[derive(Deserialize)]
    struct ResponsePart {
        text: Option<String>,
    }

    #[async_trait]
    impl CompletionBackend for GeminiBackend {
        async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
            let body = GenerateRequest {
                contents: [RequestContent {
                    parts: [RequestPart { text: prompt }],
                }],
            };

            let resp = self
                .client
                .post(self.url())
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await
                .map_err(|e| BackendError::Network(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(status_error(status.as_u16(), body));
            }

            let parsed: GenerateResponse = resp
                .json()
                .await
                .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

            first_text(parsed)
        }
    }

    fn status_error(status: u16, body: String) -> BackendError {
        match status {
            429 => BackendError::Quota,
            _ => BackendError::Api { status, body },
        }
    }

    /// First text part of the first candidate that has one.
    fn first_text(response: GenerateResponse) -> Result<String, BackendError> {
        response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| BackendError::InvalidResponse("no text candidate".to_string()))
    }

}

#[cfg(feature = "http")]
pub use gemini::{GeminiBackend, DEFAULT_ENDPOINT, DEFAULT_MODEL};
