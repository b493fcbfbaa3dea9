//! Upload → preview → submit → result, as an explicit state machine.

use analyzers::{Classification, ClassificationRequest, ClassificationResult};
use chrono::{DateTime, Utc};
use parsers::image_parser::ImageParser;
use serde::Serialize;
use thiserror::Error;

use crate::intake::{IntakeError, IntakePolicy, Notice, SelectedFile};
use crate::preview::{PreviewHandle, PreviewStore};
use crate::service::ClassifyService;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRow {
    pub label: String,
    pub value: String,
}

impl MetadataRow {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// What the results view shows for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub file_name: String,
    pub file_size: String,
    pub file_type: String,
    pub image_preview_url: String,
    pub classification: Classification,
    pub explanation: String,
    pub entropy: f64,
    pub metadata: Vec<MetadataRow>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    fn assemble(file: &SelectedFile, preview: &PreviewHandle, result: ClassificationResult) -> Self {
        Self {
            file_name: file.name.clone(),
            file_size: file.size_label(),
            file_type: file.mime_type.clone(),
            image_preview_url: preview.url().to_string(),
            classification: result.classification,
            explanation: result.explanation,
            entropy: result.entropy,
            metadata: vec![
                MetadataRow::new("Dimensions", ImageParser::dimensions_label(file.bytes())),
                MetadataRow::new("Color Depth", "24-bit (mocked)"),
                MetadataRow::new("Compression Type", "Lossless (mocked)"),
            ],
            analyzed_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
pub enum SessionState {
    Idle,
    FileSelected {
        file: SelectedFile,
        preview: PreviewHandle,
    },
    Submitting {
        file: SelectedFile,
        preview: PreviewHandle,
    },
    Succeeded {
        file: SelectedFile,
        preview: PreviewHandle,
        result: AnalysisResult,
    },
    Failed {
        file: SelectedFile,
        preview: PreviewHandle,
        error: String,
    },
}

impl SessionState {
    pub fn file(&self) -> Option<&SelectedFile> {
        match self {
            SessionState::Idle => None,
            SessionState::FileSelected { file, .. }
            | SessionState::Submitting { file, .. }
            | SessionState::Succeeded { file, .. }
            | SessionState::Failed { file, .. } => Some(file),
        }
    }

    pub fn preview_url(&self) -> Option<&str> {
        match self {
            SessionState::Idle => None,
            SessionState::FileSelected { preview, .. }
            | SessionState::Submitting { preview, .. }
            | SessionState::Succeeded { preview, .. }
            | SessionState::Failed { preview, .. } => Some(preview.url()),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            SessionState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::Submitting { .. })
    }

    fn into_selection(self) -> Option<(SelectedFile, PreviewHandle)> {
        match self {
            SessionState::Idle => None,
            SessionState::FileSelected { file, preview }
            | SessionState::Submitting { file, preview }
            | SessionState::Succeeded { file, preview, .. }
            | SessionState::Failed { file, preview, .. } => Some((file, preview)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Please select an image file.")]
    NoFileSelected,

    #[error("An analysis is already in progress.")]
    SubmissionInProgress,

    #[error("{0}")]
    AnalysisFailed(String),
}

impl SessionError {
    pub fn notice(&self) -> Notice {
        let title = match self {
            SessionError::AnalysisFailed(_) => "Analysis Failed",
            _ => "Error",
        };
        Notice {
            title: title.to_string(),
            description: self.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ClientSession {
    policy: IntakePolicy,
    previews: PreviewStore,
    state: SessionState,
}

impl ClientSession {
    pub fn new(policy: IntakePolicy) -> Self {
        Self {
            policy,
            previews: PreviewStore::new(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    /// Accepts a new file, replacing (and releasing) whatever was selected.
    /// A rejected file leaves the session exactly as it was.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), IntakeError> {
        if let Err(err) = self.policy.check(&file) {
            log::warn!("rejected {}: {}", file.name, err);
            return Err(err);
        }

        // Drop the previous state first so its preview is released before the
        // new one is registered.
        self.state = SessionState::Idle;
        let preview = self.previews.acquire(file.shared_bytes());
        log::debug!("selected {} ({}, {})", file.name, file.size_label(), file.mime_type);
        self.state = SessionState::FileSelected { file, preview };
        Ok(())
    }

    pub fn clear(&mut self) {
        self.state = SessionState::Idle;
    }

    fn take_selection(&mut self) -> Option<(SelectedFile, PreviewHandle)> {
        std::mem::replace(&mut self.state, SessionState::Idle).into_selection()
    }

    pub async fn submit<S: ClassifyService>(
        &mut self,
        service: &S,
    ) -> Result<AnalysisResult, SessionError> {
        if matches!(self.state, SessionState::Submitting { .. }) {
            return Err(SessionError::SubmissionInProgress);
        }
        let (file, preview) = self
            .take_selection()
            .ok_or(SessionError::NoFileSelected)?;

        let request = ClassificationRequest::new(file.to_data_uri().to_string());
        self.state = SessionState::Submitting { file, preview };

        let outcome = service.classify(request).await;

        let (file, preview) = self
            .take_selection()
            .ok_or(SessionError::NoFileSelected)?;

        match outcome {
            Ok(classification) => {
                let result = AnalysisResult::assemble(&file, &preview, classification);
                self.state = SessionState::Succeeded {
                    file,
                    preview,
                    result: result.clone(),
                };
                Ok(result)
            }
            Err(err) => {
                let message = err.to_string();
                self.state = SessionState::Failed {
                    file,
                    preview,
                    error: message.clone(),
                };
                Err(SessionError::AnalysisFailed(message))
            }
        }
    }
}
