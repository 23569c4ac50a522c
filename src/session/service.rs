// # Session Service
//
// Owns a Session on its own task and executes commands one at a time. This is
// the "interactive thread" of the pipeline: the working set and the flags are
// only ever touched here, while the blocking work each command needs runs on
// background tasks spawned by the Session itself.

use super::events::EventHandle;
use super::handle::SessionHandle;
use super::state::{Collaborators, Session};
use super::types::{ImportSummary, SessionError, SessionSnapshot, UploadSummary};
use crate::model::{Grouping, ItemEdit};
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use uuid::Uuid;

/// Requests sent from a SessionHandle to the service task
#[derive(Debug)]
pub enum SessionCommand {
    Import {
        paths: Vec<PathBuf>,
        done: Option<oneshot::Sender<ImportSummary>>,
    },
    Upload {
        done: Option<oneshot::Sender<UploadSummary>>,
    },
    Clear,
    AllowedGroupings {
        id: Uuid,
        reply: oneshot::Sender<Result<Vec<Grouping>, SessionError>>,
    },
    Edit {
        id: Uuid,
        edit: ItemEdit,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

pub struct SessionService {
    session: Session,
    commands_rx: mpsc::UnboundedReceiver<SessionCommand>,
}

impl SessionService {
    /// Start the session worker on the shared runtime, returning a handle for sending commands
    pub fn start(
        runtime_handle: tokio::runtime::Handle,
        collaborators: Collaborators,
    ) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let service = SessionService {
            session: Session::new(collaborators, events_tx),
            commands_rx,
        };

        runtime_handle.spawn(service.listen_for_commands());

        let event_handle = EventHandle::new(events_rx, runtime_handle);
        SessionHandle::new(commands_tx, event_handle)
    }

    async fn listen_for_commands(mut self) {
        info!("SessionService: Worker started");

        while let Some(command) = self.commands_rx.recv().await {
            match command {
                SessionCommand::Import { paths, done } => {
                    let summary = self.session.import_paths(paths).await;
                    if let Some(done) = done {
                        let _ = done.send(summary);
                    }
                }
                SessionCommand::Upload { done } => {
                    let summary = self.session.upload_all().await;
                    if let Some(done) = done {
                        let _ = done.send(summary);
                    }
                }
                SessionCommand::Clear => self.session.clear(),
                SessionCommand::AllowedGroupings { id, reply } => {
                    let _ = reply.send(self.session.allowed_groupings(id).await);
                }
                SessionCommand::Edit { id, edit, reply } => {
                    let _ = reply.send(self.session.edit_item(id, edit).await);
                }
                SessionCommand::Snapshot { reply } => {
                    let _ = reply.send(self.session.snapshot());
                }
                SessionCommand::Shutdown => break,
            }
        }

        info!("SessionService: Worker stopped");
    }
}
