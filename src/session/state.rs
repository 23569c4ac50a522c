use super::types::{not_imported, SessionError, SessionEvent, SessionSnapshot};
use super::working_set::WorkingSet;
use crate::catalog::Catalogs;
use crate::classifier::Classifier;
use crate::grouping::GroupingAdvisor;
use crate::model::{Grouping, ImportItem, ItemEdit};
use crate::path::PathResolver;
use crate::transfer::TransferClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// External collaborators a session drives
#[derive(Clone)]
pub struct Collaborators {
    pub classifier: Arc<dyn Classifier>,
    pub advisor: GroupingAdvisor,
    pub resolver: Arc<dyn PathResolver>,
    pub transfer: TransferClient,
    pub catalogs: Catalogs,
}

/// Interactive-side state: the working set and the flags the UI observes.
///
/// Blocking work (directory walks, classification, metadata reads, transfers)
/// runs on background tasks; their results come back through one-shot join
/// handles and are applied here. Every mutating operation takes `&mut self`,
/// so an import or upload can never start while another is in flight on the
/// same session.
pub struct Session {
    pub(super) working_set: WorkingSet,
    pub(super) collaborators: Collaborators,
    pub(super) events_tx: mpsc::UnboundedSender<SessionEvent>,
    busy: bool,
    successful_upload: bool,
}

impl Session {
    pub fn new(
        collaborators: Collaborators,
        events_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            working_set: WorkingSet::new(),
            collaborators,
            events_tx,
            busy: false,
            successful_upload: false,
        }
    }

    pub fn items(&self) -> &[ImportItem] {
        self.working_set.items()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn successful_upload(&self) -> bool {
        self.successful_upload
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.collaborators.catalogs
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            items: self.working_set.items().to_vec(),
            busy: self.busy,
            successful_upload: self.successful_upload,
        }
    }

    pub(super) fn emit(&self, event: SessionEvent) {
        let _ = self.events_tx.send(event);
    }

    pub(super) fn emit_not_imported(&self, file_name: &str, reason: impl std::fmt::Display) {
        self.emit(SessionEvent::Error(not_imported(file_name, reason)));
    }

    pub(super) fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            self.busy = busy;
            self.emit(SessionEvent::BusyChanged(busy));
        }
    }

    pub(super) fn mark_upload_succeeded(&mut self) {
        self.successful_upload = true;
        self.emit(SessionEvent::UploadSucceeded);
    }

    /// Drop every staged item
    pub fn clear(&mut self) {
        self.working_set.clear();
        self.emit(SessionEvent::ListUpdated);
    }

    /// Groupings the user may choose for an item; reads file metadata off-thread
    pub async fn allowed_groupings(&self, id: Uuid) -> Result<Vec<Grouping>, SessionError> {
        let item = self
            .working_set
            .get(id)
            .cloned()
            .ok_or(SessionError::UnknownItem(id))?;
        let advisor = self.collaborators.advisor.clone();

        tokio::task::spawn_blocking(move || advisor.allowed_groupings(&item))
            .await
            .map_err(|e| SessionError::Background(e.to_string()))
    }

    /// Apply a user edit to a staged item.
    ///
    /// An extension edit that changes the container flag clears a grouping
    /// the item is no longer allowed to have.
    pub async fn edit_item(&mut self, id: Uuid, edit: ItemEdit) -> Result<(), SessionError> {
        if self.working_set.get(id).is_none() {
            return Err(SessionError::UnknownItem(id));
        }

        let catalogs = &self.collaborators.catalogs;
        match &edit {
            ItemEdit::Language(value) if !catalogs.accepts_language(value) => {
                return Err(SessionError::NotInCatalog {
                    field: "language",
                    value: value.clone(),
                });
            }
            ItemEdit::Book(value) if !catalogs.accepts_book(value) => {
                return Err(SessionError::NotInCatalog {
                    field: "book",
                    value: value.clone(),
                });
            }
            ItemEdit::ResourceType(value) if !catalogs.accepts_resource_type(value) => {
                return Err(SessionError::NotInCatalog {
                    field: "resource type",
                    value: value.clone(),
                });
            }
            ItemEdit::Grouping(grouping) => {
                let allowed = self.allowed_groupings(id).await?;
                if !allowed.contains(grouping) {
                    let file = self
                        .working_set
                        .get(id)
                        .map(|item| item.file_name())
                        .unwrap_or_default();
                    return Err(SessionError::GroupingNotAllowed {
                        file,
                        grouping: *grouping,
                    });
                }
            }
            _ => {}
        }

        let item = self
            .working_set
            .get_mut(id)
            .ok_or(SessionError::UnknownItem(id))?;
        debug!("Editing {}: {:?}", item.file_name(), edit);
        let was_container = item.is_container;

        match edit {
            ItemEdit::Language(value) => item.language = Some(value),
            ItemEdit::ResourceType(value) => item.resource_type = Some(value),
            ItemEdit::Book(value) => item.book = Some(value),
            ItemEdit::Extension(extension) => {
                item.extension = extension;
                item.is_container = extension.is_container();
            }
            ItemEdit::Quality(quality) => item.quality = quality,
            ItemEdit::Grouping(grouping) => item.grouping = Some(grouping),
        }
        let revalidate = item.is_container != was_container && item.grouping.is_some();

        // The container flag changes the allowed set
        if revalidate {
            let allowed = self.allowed_groupings(id).await?;
            if let Some(item) = self.working_set.get_mut(id) {
                if item.grouping.is_some_and(|g| !allowed.contains(&g)) {
                    info!(
                        "Clearing grouping of {}: no longer allowed after extension change",
                        item.file_name()
                    );
                    item.grouping = None;
                }
            }
        }

        // Language and book take part in the display order
        self.working_set.sort();
        Ok(())
    }
}
