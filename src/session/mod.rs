// # Session Module
//
// Import and upload orchestration around an in-memory working set:
//
// - **WorkingSet**: Ordered, de-duplicated items staged for upload
// - **Session**: Owns the working set and flags; runs import and upload batches
// - **SessionService**: Task that owns a Session and serializes commands
// - **EventHandle**: Fans busy/list/success/error events out to subscribers
//
// Public API:
// - `SessionService::start`: Start the service, returning a `SessionHandle`
// - `Session`: Drive the pipeline directly from an owning task
// - `SessionEvent`: Notifications for the UI layer

mod events;
mod handle;
mod import;
mod service;
mod state;
mod types;
mod upload;
mod working_set;

pub use events::EventHandle;
pub use handle::SessionHandle;
pub use import::{flatten_paths, FlattenedPaths};
pub use service::{SessionCommand, SessionService};
pub use state::{Collaborators, Session};
pub use types::{
    not_imported, ImportError, ImportSummary, SessionError, SessionEvent, SessionSnapshot,
    TransferOutcome, UploadError, UploadSummary,
};
pub use working_set::WorkingSet;
