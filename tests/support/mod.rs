#![allow(dead_code)]

pub mod fixtures;
pub mod mock_transfer;

pub use fixtures::*;
pub use mock_transfer::MockTransfer;

use media_uploader::catalog::Catalogs;
use media_uploader::classifier::FileProcessingRouter;
use media_uploader::grouping::GroupingAdvisor;
use media_uploader::path::ContentPathResolver;
use media_uploader::session::{Collaborators, Session, SessionEvent};
use media_uploader::transfer::TransferClient;
use media_uploader::wav::WavMetadataReader;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Production classifier, advisor and resolver around a mock transfer
pub fn collaborators(transfer: Arc<MockTransfer>) -> Collaborators {
    Collaborators {
        classifier: Arc::new(FileProcessingRouter::new()),
        advisor: GroupingAdvisor::new(Arc::new(WavMetadataReader::new())),
        resolver: Arc::new(ContentPathResolver::new()),
        transfer: TransferClient::new(transfer),
        catalogs: Catalogs::default(),
    }
}

/// A session driven directly by the test, with its raw event stream
pub fn new_session(
    transfer: Arc<MockTransfer>,
) -> (Session, mpsc::UnboundedReceiver<SessionEvent>) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    (Session::new(collaborators(transfer), events_tx), events_rx)
}

/// Everything emitted so far
pub fn drain(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub fn error_messages(events: &[SessionEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Error(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}
