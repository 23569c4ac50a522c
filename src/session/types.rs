use crate::classifier::ClassifyError;
use crate::model::{Grouping, ImportItem};
use crate::path::PathError;
use crate::transfer::TransferError;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Notifications for the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    BusyChanged(bool),
    /// The working set changed as one atomic mutation
    ListUpdated,
    /// At least one item of an upload batch reached the remote
    UploadSucceeded,
    /// One message per rejected or failed file
    Error(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("No item with id {0}")]
    UnknownItem(Uuid),
    #[error("{grouping} is not an allowed grouping for {file}")]
    GroupingNotAllowed { file: String, grouping: Grouping },
    #[error("{value} is not a known {field}")]
    NotInCatalog { field: &'static str, value: String },
    #[error("Background task failed: {0}")]
    Background(String),
    #[error("Session service is not running")]
    ServiceStopped,
}

/// An import failure that is not a classifier rejection.
///
/// `Walk` is reported per dropped path and the rest of the batch continues;
/// `Classify` fails the whole batch.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("could not be read: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

impl ImportError {
    /// Name of the dropped path the failure is attributed to
    pub fn file_name(&self) -> String {
        match self {
            ImportError::Walk { path, .. } => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            ImportError::Classify(_) => "dropped files".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Result of one upload attempt; consumed immediately, never persisted
#[derive(Debug)]
pub enum TransferOutcome {
    Success { id: Uuid, location: String },
    Failure { id: Uuid, reason: UploadError },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub accepted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    /// Paths that could not be walked
    pub unreadable: usize,
    /// The batch itself failed before any file was merged
    pub failed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub failed: usize,
}

/// Point-in-time view of the session for display
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub items: Vec<ImportItem>,
    pub busy: bool,
    pub successful_upload: bool,
}

/// `<file> not imported: <reason>`
pub fn not_imported(file_name: &str, reason: impl Display) -> String {
    format!("{} not imported: {}", file_name, reason)
}
