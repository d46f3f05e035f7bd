use metrics_exporter_prometheus::PrometheusHandle;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use survey_ai::workflows::assessment::RiskAssessor;
use survey_ai::workflows::intake::SurveyIntake;
use tempfile::NamedTempFile;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) intake: Arc<SurveyIntake>,
    pub(crate) assessor: Arc<RiskAssessor>,
}

/// Uploaded image staged on disk for the OCR path. The backing file is
/// removed when the upload is discarded or dropped; a failed removal is
/// logged and the request continues.
pub(crate) struct UploadedImage {
    file: NamedTempFile,
}

impl UploadedImage {
    pub(crate) fn from_bytes(bytes: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("survey-upload-")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }

    pub(crate) fn discard(self) {
        if let Err(err) = self.file.close() {
            warn!(error = %err, "failed to remove uploaded image");
        }
    }
}
