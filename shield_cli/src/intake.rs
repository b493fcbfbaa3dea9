//! Client-side checks run before anything is sent for classification.

use std::path::Path;
use std::sync::Arc;

use parsers::DataUri;
use thiserror::Error;

pub const DEFAULT_MAX_UPLOAD_MB: u64 = 100;

const MEGABYTE: u64 = 1024 * 1024;

/// A file the user picked, as the browser would describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime_type = parsers::mime::detect(path, &bytes);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn to_data_uri(&self) -> DataUri {
        DataUri::from_bytes(&self.mime_type, &self.bytes)
    }

    /// Size in megabytes to two decimals, e.g. `"2.00 MB"`.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / MEGABYTE as f64)
    }
}

/// Transient user-facing message for a rejected action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("File too large: {size} bytes exceeds the {max_bytes} byte limit")]
    TooLarge { size: u64, max_bytes: u64 },

    #[error("Invalid file type: {mime_type}")]
    InvalidType { mime_type: String },
}

impl IntakeError {
    pub fn notice(&self) -> Notice {
        match self {
            IntakeError::TooLarge { max_bytes, .. } => Notice {
                title: "File too large".to_string(),
                description: format!(
                    "Please upload an image smaller than {}MB.",
                    max_bytes / MEGABYTE
                ),
            },
            IntakeError::InvalidType { .. } => Notice {
                title: "Invalid file type".to_string(),
                description: "Please upload a valid image file (e.g., PNG, JPG, GIF).".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakePolicy {
    pub max_bytes: u64,
}

impl IntakePolicy {
    pub fn with_max_mb(megabytes: u64) -> Self {
        Self {
            max_bytes: megabytes.saturating_mul(MEGABYTE),
        }
    }

    pub fn check(&self, file: &SelectedFile) -> Result<(), IntakeError> {
        if file.size > self.max_bytes {
            return Err(IntakeError::TooLarge {
                size: file.size,
                max_bytes: self.max_bytes,
            });
        }
        if !file.mime_type.starts_with("image/") {
            return Err(IntakeError::InvalidType {
                mime_type: file.mime_type.clone(),
            });
        }
        Ok(())
    }
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self::with_max_mb(DEFAULT_MAX_UPLOAD_MB)
    }
}
