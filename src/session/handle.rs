use super::events::EventHandle;
use super::service::SessionCommand;
use super::types::{ImportSummary, SessionError, SessionEvent, SessionSnapshot, UploadSummary};
use crate::model::{Grouping, ItemEdit};
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Handle for sending commands to a running session and subscribing to its events
#[derive(Clone)]
pub struct SessionHandle {
    commands_tx: mpsc::UnboundedSender<SessionCommand>,
    event_handle: EventHandle,
}

impl SessionHandle {
    pub fn new(
        commands_tx: mpsc::UnboundedSender<SessionCommand>,
        event_handle: EventHandle,
    ) -> Self {
        Self {
            commands_tx,
            event_handle,
        }
    }

    fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands_tx
            .send(command)
            .map_err(|_| SessionError::ServiceStopped)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx))?;
        rx.await.map_err(|_| SessionError::ServiceStopped)
    }

    /// Queue dropped paths for import; results arrive as events
    pub fn import_paths(&self, paths: Vec<PathBuf>) -> Result<(), SessionError> {
        self.send(SessionCommand::Import { paths, done: None })
    }

    /// Import and wait for the batch to be merged
    pub async fn import_paths_and_wait(
        &self,
        paths: Vec<PathBuf>,
    ) -> Result<ImportSummary, SessionError> {
        self.request(|done| SessionCommand::Import {
            paths,
            done: Some(done),
        })
        .await
    }

    /// Queue an upload of every staged item; results arrive as events
    pub fn upload(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Upload { done: None })
    }

    pub async fn upload_and_wait(&self) -> Result<UploadSummary, SessionError> {
        self.request(|done| SessionCommand::Upload { done: Some(done) })
            .await
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Clear)
    }

    pub async fn allowed_groupings(&self, id: Uuid) -> Result<Vec<Grouping>, SessionError> {
        self.request(|reply| SessionCommand::AllowedGroupings { id, reply })
            .await?
    }

    pub async fn edit_item(&self, id: Uuid, edit: ItemEdit) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Edit { id, edit, reply })
            .await?
    }

    /// Current items and flags, taken after every previously sent command has run
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Snapshot { reply })
            .await
    }

    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown)
    }

    /// Every event emitted from now on.
    ///
    /// Events are not replayed: subscribe before sending the commands whose
    /// events you want to observe.
    pub fn subscribe_all(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.event_handle.subscribe_all()
    }

    /// Error messages emitted from now on; like `subscribe_all`, nothing
    /// emitted before the call is delivered.
    pub fn subscribe_errors(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.event_handle.subscribe_errors()
    }
}
