//! Keeps the local wedding document and the remote store in step.
//!
//! [`SyncMachine`] holds the rules and no I/O; [`SyncSession`] runs it on a
//! tokio task against a [`DocumentStore`](crate::store::DocumentStore).

mod machine;
mod session;

pub use machine::{RemoteOutcome, SyncMachine, SyncState};
pub use session::{SyncEvent, SyncSession};
