use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{build_http_client, OcrEngine, UpstreamError};
use crate::config::UpstreamConfig;

/// Client for the ocr.space parse endpoint.
pub struct OcrSpaceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OcrSpaceClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            http: build_http_client(config.request_timeout)?,
            endpoint: config.ocr_endpoint.trim_end_matches('/').to_string(),
            api_key: config.ocr_api_key.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OcrEnvelope {
    #[serde(rename = "IsErroredOnProcessing", default)]
    is_errored_on_processing: bool,
    #[serde(rename = "ParsedResults", default)]
    parsed_results: Vec<ParsedResult>,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: String,
}

#[async_trait]
impl OcrEngine for OcrSpaceClient {
    async fn transcribe(&self, image_b64: &str) -> Result<String, UpstreamError> {
        let params = [
            ("apikey", self.api_key.as_str()),
            ("filetype", "png"),
            (
                "base64image",
                &format!("data:image/jpeg;base64,{image_b64}"),
            ),
        ];

        let response = self.http.post(&self.endpoint).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let envelope = response.json::<OcrEnvelope>().await?;
        if envelope.is_errored_on_processing {
            let detail = envelope
                .error_message
                .map(|value| value.to_string())
                .unwrap_or_else(|| "unspecified OCR failure".to_string());
            return Err(UpstreamError::Envelope(detail));
        }

        let transcript = envelope
            .parsed_results
            .into_iter()
            .next()
            .map(|result| result.parsed_text)
            .ok_or_else(|| UpstreamError::Envelope("no parsed results returned".to_string()))?;

        debug!(chars = transcript.len(), "ocr transcript received");
        Ok(transcript)
    }
}
