mod llm;
mod ocr;

pub use llm::GeminiClient;
pub use ocr::OcrSpaceClient;

use async_trait::async_trait;

/// Failures raised by the OCR and text-generation backends.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed upstream envelope: {0}")]
    Envelope(String),
}

/// Transcribes a base64-encoded image into raw text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn transcribe(&self, image_b64: &str) -> Result<String, UpstreamError>;
}

/// Generates free-form text from a prompt. Replies are raw model output
/// and may wrap JSON in prose or code fences.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError>;
}

pub(crate) fn build_http_client(
    timeout: std::time::Duration,
) -> Result<reqwest::Client, UpstreamError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}
