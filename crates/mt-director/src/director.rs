//! The authoritative montage coordinator.

use mt_core::{
    ActionKind, ApprovalId, Characteristic, HeroCandidate, Limits, MontageConfig, MontageState,
    Outcome, ParticipantId,
};
use tracing::{error, info, warn};

use crate::announce::{Announcement, Announcer};
use crate::error::{DirectorError, DirectorResult};
use crate::inbox::{Inbox, IntentMessage};
use crate::roll::{RollCollaborator, TierSource};
use crate::settings::DirectorSettings;
use crate::store::SnapshotStore;

/// Told whenever the director's state changes (`None` once a test ends).
pub trait StateObserver {
    /// React to a change.
    fn state_changed(&mut self, state: Option<&MontageState>);
}

impl<F: FnMut(Option<&MontageState>)> StateObserver for F {
    fn state_changed(&mut self, state: Option<&MontageState>) {
        self(state)
    }
}

/// What happened after trying to close a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAdvance {
    /// Someone still has to act or an approval is outstanding.
    NotReady,
    /// A new round started.
    Advanced(u32),
    /// The test ended. `None` only if the test could not be decided.
    Concluded(Option<Outcome>),
}

/// What an approval did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproveResult {
    /// Unknown approval or no running test; nothing changed.
    Ignored,
    /// The approval was resolved.
    Resolved {
        /// Whether the action counted as a success; `None` for abstentions,
        /// which change no tally.
        success: Option<bool>,
        /// Round progress after resolution.
        advance: RoundAdvance,
    },
}

/// Owns the running montage test and sequences every change to it.
pub struct Director<R, S, A> {
    state: Option<MontageState>,
    roller: R,
    store: S,
    announcer: A,
    settings: DirectorSettings,
    observers: Vec<Box<dyn StateObserver>>,
}

impl<R, S, A> Director<R, S, A>
where
    R: RollCollaborator,
    S: SnapshotStore,
    A: Announcer,
{
    /// Create a director with no running test.
    pub fn new(roller: R, store: S, announcer: A, settings: DirectorSettings) -> Self {
        Self {
            state: None,
            roller,
            store,
            announcer,
            settings,
            observers: Vec::new(),
        }
    }

    /// Restore the running test from the store. Returns whether one was found.
    pub fn load(&mut self) -> DirectorResult<bool> {
        self.state = self.store.load()?.map(MontageState::from_snapshot);
        Ok(self.state.is_some())
    }

    /// The running test.
    pub fn state(&self) -> Option<&MontageState> {
        self.state.as_ref()
    }

    /// The director's settings.
    pub fn settings(&self) -> &DirectorSettings {
        &self.settings
    }

    /// The snapshot store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The announcer.
    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    /// The roll collaborator.
    pub fn roller(&self) -> &R {
        &self.roller
    }

    /// Register an observer.
    pub fn subscribe(&mut self, observer: impl StateObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self) {
        let state = self.state.as_ref();
        for observer in &mut self.observers {
            observer.state_changed(state);
        }
    }

    fn persist(&mut self) {
        let Some(state) = &self.state else {
            return;
        };
        let snapshot = state.to_snapshot();
        if let Err(err) = self.store.save(Some(&snapshot)) {
            warn!(%err, "montage state persist failed");
        }
    }

    fn changed(&mut self) {
        self.persist();
        self.notify();
    }

    fn state_mut(&mut self) -> DirectorResult<&mut MontageState> {
        self.state.as_mut().ok_or(DirectorError::NoActiveTest)
    }

    /// Start a new test, replacing any running one. Returns its limits.
    pub fn start_test<I>(&mut self, config: MontageConfig, candidates: I) -> Limits
    where
        I: IntoIterator,
        I::Item: HeroCandidate,
    {
        let state = MontageState::create(config, candidates);
        info!(
            title = %state.config().title,
            difficulty = %state.config().difficulty,
            participants = state.participants().len(),
            success_limit = state.limits().success_limit,
            failure_limit = state.limits().failure_limit,
            "montage test started"
        );
        let limits = state.limits();
        self.state = Some(state);
        self.changed();
        limits
    }

    /// Submit an action on a participant's behalf.
    pub fn submit_intent(
        &mut self,
        participant: &ParticipantId,
        kind: ActionKind,
        characteristic: Option<Characteristic>,
        narrative: Option<String>,
    ) -> DirectorResult<ApprovalId> {
        let state = self.state_mut()?;
        match state.submit_intent(participant, kind, characteristic, narrative) {
            Ok(id) => {
                info!(%participant, action = %kind, approval = %id.short(), "intent queued");
                self.changed();
                Ok(id)
            }
            Err(err) => {
                warn!(%participant, %err, "intent refused");
                Err(err.into())
            }
        }
    }

    /// Abstain on a participant's behalf.
    pub fn abstain(&mut self, participant: &ParticipantId) -> DirectorResult<()> {
        let state = self.state_mut()?;
        match state.abstain(participant) {
            Ok(()) => {
                info!(%participant, "participant abstained");
                self.changed();
                self.try_advance_round();
                Ok(())
            }
            Err(err) => {
                warn!(%participant, %err, "abstention refused");
                Err(err.into())
            }
        }
    }

    /// Apply one transported message.
    ///
    /// Abstentions go straight to [`abstain`](Self::abstain); everything else
    /// is submitted for approval.
    pub fn handle_message(&mut self, message: IntentMessage) -> DirectorResult<Option<ApprovalId>> {
        let IntentMessage::SubmitIntent {
            actor_id,
            action_type,
            characteristic,
            narrative,
        } = message;
        match action_type {
            ActionKind::Abstain => self.abstain(&actor_id).map(|()| None),
            kind => self
                .submit_intent(&actor_id, kind, characteristic, narrative)
                .map(Some),
        }
    }

    /// Apply every message waiting in the inbox, oldest first.
    pub fn drain_inbox(&mut self, inbox: &mut Inbox) -> Vec<DirectorResult<Option<ApprovalId>>> {
        std::iter::from_fn(|| inbox.try_next())
            .map(|message| self.handle_message(message))
            .collect()
    }

    /// Reject a pending approval so the participant can choose again.
    pub fn reject(&mut self, approval_id: ApprovalId) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let rejected = state.reject_approval(approval_id);
        if rejected {
            info!(approval = %approval_id.short(), "approval rejected");
            self.changed();
        }
        rejected
    }

    /// Approve a pending action and resolve it.
    ///
    /// Abilities succeed automatically. Tests and assists are rolled by the
    /// host; if the roll fails the approval stays queued and the error is
    /// returned so the director can retry.
    pub async fn approve(&mut self, approval_id: ApprovalId) -> DirectorResult<ApproveResult> {
        let Some(state) = self.state.as_ref() else {
            return Ok(ApproveResult::Ignored);
        };
        let Some(approval) = state.pending(approval_id).cloned() else {
            return Ok(ApproveResult::Ignored);
        };

        let success = match (approval.action_type, approval.characteristic) {
            (ActionKind::Ability, _) => {
                self.state_mut()?.apply_ability_auto_success(approval_id);
                Some(true)
            }
            (ActionKind::Test | ActionKind::Assist, Some(characteristic)) => {
                let Some(participant) = state.participant(&approval.actor_id).cloned() else {
                    return Ok(ApproveResult::Ignored);
                };
                let roll = self
                    .roller
                    .roll(&participant, characteristic, &self.settings.roll_difficulty)
                    .await;
                let tier = match roll {
                    Ok(output) => output.tier(),
                    Err(err) => {
                        error!(
                            participant = %participant.actor_id,
                            %characteristic,
                            %err,
                            "montage roll failed"
                        );
                        return Err(err.into());
                    }
                };
                self.state_mut()?.apply_roll_result(approval_id, tier);
                Some(mt_core::rules::tier_is_success(tier))
            }
            (ActionKind::Test | ActionKind::Assist, None) => return Ok(ApproveResult::Ignored),
            (ActionKind::Abstain, _) => {
                self.state_mut()?.apply_roll_result(approval_id, None);
                None
            }
        };

        info!(
            approval = %approval_id.short(),
            participant = %approval.actor_id,
            action = %approval.action_type,
            ?success,
            "approval resolved"
        );
        self.changed();
        let advance = self.try_advance_round();
        Ok(ApproveResult::Resolved { success, advance })
    }

    /// Close the round if everyone acted and the queue is empty.
    ///
    /// When the round can't advance further the outcome is finalized and,
    /// if decided, announced.
    pub fn try_advance_round(&mut self) -> RoundAdvance {
        let Some(state) = self.state.as_mut() else {
            return RoundAdvance::NotReady;
        };
        if !state.can_advance_round() {
            return RoundAdvance::NotReady;
        }

        if state.advance_round() {
            let round = state.current_round();
            info!(round, "montage round advanced");
            self.changed();
            return RoundAdvance::Advanced(round);
        }

        let outcome = state.finalize_outcome();
        if let Some(outcome) = outcome {
            info!(%outcome, "montage outcome decided");
            self.announce_current();
        }
        self.changed();
        RoundAdvance::Concluded(outcome)
    }

    fn announce_current(&mut self) {
        if let Some(announcement) = self.state.as_ref().and_then(Announcement::from_state) {
            self.announcer.announce(&announcement);
        }
    }

    /// End the running test, announcing its outcome if it has one.
    ///
    /// Pending approvals are dropped. Returns the discarded test's outcome.
    pub fn end_test(&mut self) -> Option<Outcome> {
        let outcome = self.state.as_ref().and_then(MontageState::outcome);
        if outcome.is_some() {
            self.announce_current();
        }
        if let Some(state) = self.state.take() {
            info!(
                title = %state.config().title,
                dropped_approvals = state.pending_approvals().len(),
                "montage test ended"
            );
        }
        if let Err(err) = self.store.save(None) {
            warn!(%err, "montage state clear failed");
        }
        self.notify();
        outcome
    }
}
