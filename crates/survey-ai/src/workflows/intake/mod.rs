mod fields;
mod parser;
mod validator;

pub use fields::{to_canonical_json, FieldMap, FieldValue};
pub use parser::{parse_fields, ParserInput};
pub use validator::{validate_answers, SurveyAnswers, ValidationResult, REQUIRED_FIELDS};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::clients::{OcrEngine, UpstreamError};

/// Raw material for one survey submission. Image inputs reference a
/// temporary file owned by the transport layer.
#[derive(Debug, Clone)]
pub enum SurveyInput {
    Text(String),
    Image(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Rejected { message: String },
    Incomplete { reason: String },
    Validated(ValidationResult),
}

/// A profile with more fields missing than present is not worth scoring.
pub const MAX_MISSING_FIELDS: usize = 2;

pub const NO_INPUT_MESSAGE: &str =
    "No valid input provided. Please provide either text or image.";
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse input data.";
pub const INCOMPLETE_REASON: &str = ">50% fields missing";

#[derive(Debug, thiserror::Error)]
enum TranscriptionError {
    #[error("unable to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Turns one submission into a validated survey record.
///
/// Single pass, no retries: text is parsed directly, images go through
/// the injected OCR engine first. Both paths feed the same parser and
/// validator.
pub struct SurveyIntake {
    ocr: Box<dyn OcrEngine>,
}

impl SurveyIntake {
    pub fn new(ocr: Box<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    pub async fn process(&self, input: Option<SurveyInput>) -> SubmissionOutcome {
        let Some(input) = input else {
            return SubmissionOutcome::Rejected {
                message: NO_INPUT_MESSAGE.to_string(),
            };
        };

        let fields = match input {
            SurveyInput::Text(text) => parse_fields(ParserInput::Text(text)),
            SurveyInput::Image(path) => match self.transcribe(&path).await {
                Ok(transcript) => parse_fields(ParserInput::Text(transcript)),
                Err(err) => {
                    warn!(error = %err, "image transcription failed");
                    None
                }
            },
        };

        let Some(fields) = fields else {
            return SubmissionOutcome::Rejected {
                message: PARSE_FAILURE_MESSAGE.to_string(),
            };
        };

        let result = validate_answers(Some(&fields));
        if result.missing_fields.len() > MAX_MISSING_FIELDS {
            info!(
                missing = result.missing_fields.len(),
                "submission below completeness threshold"
            );
            return SubmissionOutcome::Incomplete {
                reason: INCOMPLETE_REASON.to_string(),
            };
        }

        SubmissionOutcome::Validated(result)
    }

    async fn transcribe(&self, path: &Path) -> Result<String, TranscriptionError> {
        let bytes = std::fs::read(path)?;
        let encoded = BASE64.encode(&bytes);
        Ok(self.ocr.transcribe(&encoded).await?)
    }
}
