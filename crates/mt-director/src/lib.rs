//! Authoritative coordinator for montage tests.
//!
//! The [`Director`] is the single owner of a running [`MontageState`]. It takes
//! intents from participants (directly or through the [`inbox`] channel),
//! approves or rejects them, calls out to the host for rolls, persists a
//! snapshot after every change, tells observers, and announces the outcome.
//!
//! [`MontageState`]: mt_core::MontageState

pub mod announce;
pub mod director;
pub mod error;
pub mod inbox;
pub mod roll;
pub mod settings;
pub mod store;
pub mod view;

pub use announce::{Announcement, Announcer, TracingAnnouncer};
pub use director::{ApproveResult, Director, RoundAdvance, StateObserver};
pub use error::{DirectorError, DirectorResult, RollError, StoreError};
pub use inbox::{Inbox, IntentMessage, IntentSender};
pub use roll::{RollCollaborator, TierSource};
pub use settings::DirectorSettings;
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
pub use view::{DirectorView, PlayerView};
