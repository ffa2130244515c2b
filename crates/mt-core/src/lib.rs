//! Montage test rules engine.
//!
//! A montage test is a multi-round group challenge: heroes take turns making
//! tests against a shared pool of successes and failures until a success
//! limit, a failure limit, or the round limit is reached. This crate holds the
//! pure rule math ([`rules`]), the domain model ([`domain`]), and the round
//! state machine ([`MontageState`]). It has no knowledge of how rolls are made
//! or where state is stored; see `mt-director` for that.

/// Domain types: difficulty, outcomes, action kinds, configuration, roster.
pub mod domain;
/// Validation and serialization errors.
pub mod error;
/// Host-side hero candidates and the eligibility/perk checks run on them.
pub mod hero;
/// Threshold, outcome, and reward math.
pub mod rules;
/// Persisted layout of a montage test.
pub mod snapshot;
/// The round-by-round state machine.
pub mod state;

pub use domain::{
    ActionKind, ApprovalId, Characteristic, Difficulty, MontageConfig, Outcome, Participant,
    ParticipantId, ParticipantRoundState, PendingApproval, UserId, Visibility,
};
pub use error::{IntentError, SnapshotError};
pub use hero::{HeroCandidate, HeroItem, HeroOwner, HeroRecord};
pub use rules::{Limits, compute_limits, compute_outcome, victory_count};
pub use snapshot::MontageSnapshot;
pub use state::MontageState;
