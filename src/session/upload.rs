use super::state::Session;
use super::types::{not_imported, SessionEvent, TransferOutcome, UploadError, UploadSummary};
use crate::model::ImportItem;
use crate::path::PathResolver;
use crate::transfer::TransferClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Resolve and transfer one item
async fn upload_item(
    item: &ImportItem,
    resolver: &dyn PathResolver,
    transfer: &TransferClient,
) -> Result<String, UploadError> {
    let remote_path = resolver.build(item)?;
    let location = transfer
        .transfer_file(item.source_path(), &remote_path)
        .await?;
    Ok(location)
}

/// Transfer items strictly one after another.
///
/// A failing item emits its error message and the sequence moves on. All
/// outcomes are returned together once the last transfer has finished.
async fn run_uploads(
    items: Vec<ImportItem>,
    resolver: Arc<dyn PathResolver>,
    transfer: TransferClient,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
) -> Vec<TransferOutcome> {
    let mut outcomes = Vec::with_capacity(items.len());

    for item in &items {
        match upload_item(item, resolver.as_ref(), &transfer).await {
            Ok(location) => {
                info!("Uploaded {} to {}", item.file_name(), location);
                outcomes.push(TransferOutcome::Success {
                    id: item.id,
                    location,
                });
            }
            Err(reason) => {
                warn!("Upload of {:?} failed: {}", item.source_path(), reason);
                let _ = events_tx.send(SessionEvent::Error(not_imported(
                    &item.file_name(),
                    &reason,
                )));
                outcomes.push(TransferOutcome::Failure {
                    id: item.id,
                    reason,
                });
            }
        }
    }

    outcomes
}

impl Session {
    /// Upload every staged item in display order.
    ///
    /// Transfers run sequentially on a background task. Successful items are
    /// removed from the working set in one mutation after the whole batch
    /// finishes; failed items stay and can be retried by uploading again.
    pub async fn upload_all(&mut self) -> UploadSummary {
        self.set_busy(true);

        let items = self.working_set.items().to_vec();
        info!("Uploading {} item(s)", items.len());

        let batch = tokio::spawn(run_uploads(
            items,
            self.collaborators.resolver.clone(),
            self.collaborators.transfer.clone(),
            self.events_tx.clone(),
        ))
        .await;

        let outcomes = match batch {
            Ok(outcomes) => outcomes,
            Err(e) => {
                error!("Upload task failed: {}", e);
                self.emit_not_imported("upload batch", &e);
                Vec::new()
            }
        };

        let mut summary = UploadSummary::default();
        let mut uploaded: Vec<Uuid> = Vec::new();
        for outcome in &outcomes {
            match outcome {
                TransferOutcome::Success { id, .. } => uploaded.push(*id),
                TransferOutcome::Failure { .. } => summary.failed += 1,
            }
        }

        summary.uploaded = self.working_set.remove_ids(&uploaded);
        self.emit(SessionEvent::ListUpdated);
        if !uploaded.is_empty() {
            self.mark_upload_succeeded();
        }

        self.set_busy(false);
        summary
    }
}
