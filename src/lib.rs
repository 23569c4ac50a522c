// Library exports for the binary, integration tests and UI front-ends

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod grouping;
pub mod model;
pub mod path;
pub mod session;
pub mod transfer;
pub mod wav;

pub use session::{Session, SessionEvent, SessionHandle, SessionService};
