//! Error types for the director.

use thiserror::Error;

use mt_core::{IntentError, ParticipantId, SnapshotError};

/// Result type for director operations.
pub type DirectorResult<T> = Result<T, DirectorError>;

/// Errors surfaced by the director.
#[derive(Debug, Error)]
pub enum DirectorError {
    /// No montage test is running.
    #[error("No active montage")]
    NoActiveTest,

    /// The engine refused an intent.
    #[error("{0}")]
    Intent(#[from] IntentError),

    /// The host could not make the roll. The approval stays queued.
    #[error("roll failed: {0}")]
    Roll(#[from] RollError),

    /// Reading the persisted snapshot failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The intent channel has no receiver any more.
    #[error("intent inbox closed")]
    InboxClosed,
}

/// Failure of the host's roll collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollError {
    /// The host has no way to roll for this participant.
    #[error("cannot roll for {0}")]
    Unavailable(ParticipantId),

    /// The roll was attempted and failed.
    #[error("{0}")]
    Failed(String),
}

/// Snapshot store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored snapshot is unreadable.
    #[error("{0}")]
    Snapshot(#[from] SnapshotError),
}
