//! Error types for the montage engine.

use thiserror::Error;

use crate::domain::Characteristic;

/// Why an intent or abstention was refused.
///
/// These are returned to the submitting party as warnings; the state is left
/// untouched whenever one is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// The participant is not seated in this montage test.
    #[error("Participant not found")]
    ParticipantNotFound,

    /// The participant already chose an action this round.
    #[error("Already acted this round")]
    AlreadyActed,

    /// Tests and assists must name a characteristic.
    #[error("Characteristic required")]
    CharacteristicRequired,

    /// The characteristic was already spent earlier in this montage.
    #[error("Characteristic already used this montage ({0})")]
    CharacteristicExhausted(Characteristic),
}

/// Errors from encoding or decoding a persisted snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot JSON could not be read or written.
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
