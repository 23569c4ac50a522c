use media_uploader::transfer::{Transfer, TransferError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory transfer for testing
///
/// Records every attempt in order, fails files whose name contains one of the
/// configured markers, and tracks how many transfers ran at the same time.
#[derive(Default)]
pub struct MockTransfer {
    failing: Vec<String>,
    attempts: Mutex<Vec<PathBuf>>,
    uploaded: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every file whose name contains any of `markers`
    pub fn failing(markers: &[&str]) -> Self {
        Self {
            failing: markers.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Local paths in the order transfers were attempted
    pub fn attempts(&self) -> Vec<PathBuf> {
        self.attempts.lock().unwrap().clone()
    }

    /// Remote paths that were accepted
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transfer for MockTransfer {
    async fn transfer(
        &self,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<String, TransferError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.attempts.lock().unwrap().push(local_path.to_path_buf());

        tokio::time::sleep(Duration::from_millis(5)).await;

        let name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let result = if self.failing.iter().any(|marker| name.contains(marker)) {
            Err(TransferError::Rejected(format!("{} refused", name)))
        } else {
            self.uploaded.lock().unwrap().push(remote_path.to_string());
            Ok(format!("mock://{}", remote_path))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
