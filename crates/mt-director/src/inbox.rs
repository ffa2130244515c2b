//! Intent transport from participants to the director.
//!
//! Players without director rights cannot touch the state. They send an
//! [`IntentMessage`] through an [`IntentSender`]; the director drains the
//! [`Inbox`] and applies the messages one at a time, in arrival order.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use mt_core::{ActionKind, Characteristic, ParticipantId};

use crate::error::{DirectorError, DirectorResult};

/// A message from a participant to the director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IntentMessage {
    /// Submit an action (or an abstention) for the current round.
    #[serde(rename_all = "camelCase")]
    SubmitIntent {
        /// Acting participant.
        actor_id: ParticipantId,
        /// Chosen action.
        action_type: ActionKind,
        /// Characteristic for tests and assists.
        #[serde(default)]
        characteristic: Option<Characteristic>,
        /// Narrative contribution.
        #[serde(default)]
        narrative: Option<String>,
    },
}

/// Create a connected sender/inbox pair.
pub fn channel() -> (IntentSender, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IntentSender { tx }, Inbox { rx })
}

/// Sending half, held by participants. Cheap to clone.
#[derive(Debug, Clone)]
pub struct IntentSender {
    tx: mpsc::UnboundedSender<IntentMessage>,
}

impl IntentSender {
    /// Queue a message for the director.
    pub fn send(&self, message: IntentMessage) -> DirectorResult<()> {
        self.tx
            .send(message)
            .map_err(|_| DirectorError::InboxClosed)
    }
}

/// Receiving half, held by the director.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::UnboundedReceiver<IntentMessage>,
}

impl Inbox {
    /// Next queued message, without waiting.
    pub fn try_next(&mut self) -> Option<IntentMessage> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next message. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<IntentMessage> {
        self.rx.recv().await
    }
}
