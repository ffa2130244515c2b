//! Montage test state machine.
//!
//! [`MontageState`] owns one running test. Intents are validated and queued
//! for approval; approvals are resolved into the success/failure tallies; and
//! rounds advance once everyone has acted and the queue is empty. The caller
//! owns the state and is the only one mutating it, so nothing here locks.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::domain::{
    ActionKind, ApprovalId, Characteristic, MontageConfig, Outcome, Participant, ParticipantId,
    ParticipantRoundState, PendingApproval, UserId,
};
use crate::error::IntentError;
use crate::hero::HeroCandidate;
use crate::rules::{self, Limits};

/// A running montage test.
#[derive(Debug, Clone, PartialEq)]
pub struct MontageState {
    pub(crate) config: MontageConfig,
    pub(crate) limits: Limits,
    pub(crate) participants: Vec<Participant>,
    pub(crate) current_round: u32,
    pub(crate) successes: u32,
    pub(crate) failures: u32,
    pub(crate) round_states: BTreeMap<u32, Vec<ParticipantRoundState>>,
    pub(crate) pending_approvals: Vec<PendingApproval>,
    pub(crate) used_characteristics: BTreeMap<ParticipantId, BTreeSet<Characteristic>>,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) started_at: DateTime<Utc>,
}

impl MontageState {
    /// Start a test, seating every eligible hero among `candidates`.
    ///
    /// Limits come from the config overrides when both are set, otherwise
    /// from the difficulty and the configured group size.
    pub fn create<I>(config: MontageConfig, candidates: I) -> Self
    where
        I: IntoIterator,
        I::Item: HeroCandidate,
    {
        let participants = candidates
            .into_iter()
            .filter(|c| c.is_eligible_hero())
            .map(|c| c.to_participant())
            .collect();

        let limits = match (config.success_limit, config.failure_limit) {
            (Some(success_limit), Some(failure_limit)) => Limits {
                success_limit,
                failure_limit,
            },
            _ => rules::compute_limits(config.difficulty, config.group_size),
        };

        Self {
            config,
            limits,
            participants,
            current_round: 1,
            successes: 0,
            failures: 0,
            round_states: BTreeMap::new(),
            pending_approvals: Vec::new(),
            used_characteristics: BTreeMap::new(),
            outcome: None,
            started_at: Utc::now(),
        }
    }

    /// The test's configuration.
    pub fn config(&self) -> &MontageConfig {
        &self.config
    }

    /// Resolved success and failure limits.
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Seated heroes, in seating order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Current round, starting at 1.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Running success tally.
    pub fn successes(&self) -> u32 {
        self.successes
    }

    /// Running failure tally.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Actions awaiting the director, oldest first.
    pub fn pending_approvals(&self) -> &[PendingApproval] {
        &self.pending_approvals
    }

    /// Every round record materialized so far.
    pub fn round_states(&self) -> &BTreeMap<u32, Vec<ParticipantRoundState>> {
        &self.round_states
    }

    /// Characteristics spent by each participant over the whole test.
    pub fn used_characteristics(&self) -> &BTreeMap<ParticipantId, BTreeSet<Characteristic>> {
        &self.used_characteristics
    }

    /// Final outcome, once decided.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the test has an outcome.
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    /// Victories earned by the current outcome.
    pub fn victories(&self) -> u32 {
        rules::victory_count(self.outcome, self.config.difficulty)
    }

    /// When the test started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Look up a seated participant.
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.actor_id == id)
    }

    /// The participant a (non-privileged) user plays, if any.
    pub fn participant_for_user(&self, user: &UserId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.player_id.as_ref() == Some(user))
    }

    /// Look up a pending approval.
    pub fn pending(&self, id: ApprovalId) -> Option<&PendingApproval> {
        self.pending_approvals.iter().find(|a| a.id == id)
    }

    /// The records for `round`, created (everyone unacted) on first access.
    pub fn round_state(&mut self, round: u32) -> &mut Vec<ParticipantRoundState> {
        let participants = &self.participants;
        self.round_states.entry(round).or_insert_with(|| {
            participants
                .iter()
                .map(|p| ParticipantRoundState::unacted(p.actor_id.clone()))
                .collect()
        })
    }

    /// A participant's record for the current round, if one was materialized.
    pub fn current_record(&self, id: &ParticipantId) -> Option<&ParticipantRoundState> {
        self.round_states
            .get(&self.current_round)
            .and_then(|rs| rs.iter().find(|r| &r.actor_id == id))
    }

    /// Whether a seated participant may still act this round.
    pub fn can_act(&self, id: &ParticipantId) -> bool {
        self.participant(id).is_some() && !self.current_record(id).is_some_and(|r| r.has_acted())
    }

    /// Whether the participant already spent `characteristic` in this test.
    pub fn has_used(&self, id: &ParticipantId, characteristic: Characteristic) -> bool {
        self.used_characteristics
            .get(id)
            .is_some_and(|used| used.contains(&characteristic))
    }

    /// Characteristics the participant can still use, in sheet order.
    pub fn available_characteristics(&self, id: &ParticipantId) -> Vec<Characteristic> {
        Characteristic::ALL
            .into_iter()
            .filter(|c| !self.has_used(id, *c))
            .collect()
    }

    fn check_can_act(&self, id: &ParticipantId) -> Result<(), IntentError> {
        if self.participant(id).is_none() {
            return Err(IntentError::ParticipantNotFound);
        }
        if self.current_record(id).is_some_and(|r| r.has_acted()) {
            return Err(IntentError::AlreadyActed);
        }
        Ok(())
    }

    fn record_mut(&mut self, id: &ParticipantId) -> Option<&mut ParticipantRoundState> {
        let round = self.current_round;
        self.round_state(round).iter_mut().find(|r| &r.actor_id == id)
    }

    /// Submit an action for approval.
    ///
    /// Tallies and spent characteristics are untouched until the approval is
    /// resolved. Nothing changes when an error is returned.
    pub fn submit_intent(
        &mut self,
        participant_id: &ParticipantId,
        kind: ActionKind,
        characteristic: Option<Characteristic>,
        narrative: Option<String>,
    ) -> Result<ApprovalId, IntentError> {
        self.check_can_act(participant_id)?;
        if kind.requires_characteristic() {
            let c = characteristic.ok_or(IntentError::CharacteristicRequired)?;
            if self.has_used(participant_id, c) {
                return Err(IntentError::CharacteristicExhausted(c));
            }
        }

        let actor_name = self
            .participant(participant_id)
            .map(|p| p.actor_name.clone())
            .unwrap_or_default();
        let approval = PendingApproval {
            id: ApprovalId::new(),
            actor_id: participant_id.clone(),
            actor_name,
            action_type: kind,
            characteristic,
            narrative: narrative.clone(),
            submitted_at: Utc::now(),
        };
        let id = approval.id;

        if let Some(record) = self.record_mut(participant_id) {
            record.engage(kind, characteristic, narrative);
        }
        self.pending_approvals.push(approval);
        Ok(id)
    }

    /// Sit the current round out. Needs no approval.
    pub fn abstain(&mut self, participant_id: &ParticipantId) -> Result<(), IntentError> {
        self.check_can_act(participant_id)?;
        if let Some(record) = self.record_mut(participant_id) {
            record.engage(ActionKind::Abstain, None, None);
        }
        Ok(())
    }

    fn take_approval(&mut self, id: ApprovalId) -> Option<PendingApproval> {
        let idx = self.pending_approvals.iter().position(|a| a.id == id)?;
        Some(self.pending_approvals.remove(idx))
    }

    /// Reject a pending approval, letting the participant choose again.
    ///
    /// Returns false for an unknown id.
    pub fn reject_approval(&mut self, approval_id: ApprovalId) -> bool {
        let Some(approval) = self.take_approval(approval_id) else {
            return false;
        };
        if let Some(record) = self.record_mut(&approval.actor_id) {
            record.reset();
        }
        true
    }

    /// Resolve an approval as an automatic success (abilities).
    ///
    /// Returns false for an unknown id.
    pub fn apply_ability_auto_success(&mut self, approval_id: ApprovalId) -> bool {
        if self.take_approval(approval_id).is_none() {
            return false;
        }
        self.successes += 1;
        true
    }

    /// Resolve an approval with the tier of its roll.
    ///
    /// Abilities succeed and abstentions resolve without looking at the tier.
    /// For tests and assists, tier 3 is a success and anything else (or no
    /// tier) a failure; the characteristic is spent only now, so rejected
    /// actions never burn it. Returns false for an unknown id.
    pub fn apply_roll_result(&mut self, approval_id: ApprovalId, tier: Option<u8>) -> bool {
        let Some(approval) = self.take_approval(approval_id) else {
            return false;
        };

        match approval.action_type {
            ActionKind::Ability => {
                self.successes += 1;
                return true;
            }
            ActionKind::Abstain => return true,
            ActionKind::Test | ActionKind::Assist => {}
        }

        if rules::tier_is_success(tier) {
            self.successes += 1;
        } else {
            self.failures += 1;
        }

        if let Some(c) = approval.characteristic {
            self.used_characteristics
                .entry(approval.actor_id)
                .or_default()
                .insert(c);
        }
        true
    }

    fn everyone_acted(&self) -> bool {
        let acted = self
            .round_states
            .get(&self.current_round)
            .map_or(0, |rs| rs.iter().filter(|r| r.has_acted()).count());
        acted >= self.participants.len()
    }

    fn round_limit_reached(&self) -> bool {
        self.current_round >= self.config.max_rounds
    }

    /// Every participant acted this round and nothing awaits approval.
    pub fn can_advance_round(&self) -> bool {
        self.everyone_acted() && self.pending_approvals.is_empty()
    }

    /// Close the current round.
    ///
    /// Returns true when a new round began. Returns false without touching
    /// anything if the round isn't finished, and false after recording the
    /// outcome when the test ended (limit reached or out of rounds).
    ///
    /// A round isn't finished while any approval is queued, and also while
    /// someone has yet to act even when the queue is empty.
    pub fn advance_round(&mut self) -> bool {
        if !self.can_advance_round() {
            return false;
        }

        let round_limit_reached = self.round_limit_reached();
        self.outcome = rules::compute_outcome(
            self.successes,
            self.failures,
            self.limits,
            round_limit_reached,
        );
        if self.outcome.is_some() || round_limit_reached {
            return false;
        }

        self.current_round += 1;
        true
    }

    /// Evaluate and store the outcome now, whatever the queue holds.
    pub fn finalize_outcome(&mut self) -> Option<Outcome> {
        self.outcome = rules::compute_outcome(
            self.successes,
            self.failures,
            self.limits,
            self.round_limit_reached(),
        );
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Difficulty;
    use crate::hero::HeroRecord;

    fn heroes(n: usize) -> Vec<HeroRecord> {
        (1..=n)
            .map(|i| HeroRecord::new(format!("h{i}"), format!("Hero {i}")))
            .collect()
    }

    fn montage(difficulty: Difficulty, n: usize) -> MontageState {
        let config = MontageConfig::new("Crossing the Wastes", n as u32).with_difficulty(difficulty);
        MontageState::create(config, heroes(n))
    }

    fn pid(s: &str) -> ParticipantId {
        ParticipantId::from(s)
    }

    /// Everyone tests with a fresh characteristic; all rolls resolve with `tier`.
    fn play_round(state: &mut MontageState, tier: u8) {
        let ids: Vec<ParticipantId> = state.participants().iter().map(|p| p.actor_id.clone()).collect();
        for id in ids {
            let c = state.available_characteristics(&id)[0];
            let approval = state
                .submit_intent(&id, ActionKind::Test, Some(c), None)
                .unwrap();
            assert!(state.apply_roll_result(approval, Some(tier)));
        }
    }

    #[test]
    fn create_filters_and_derives_limits() {
        let mut npc = HeroRecord::new("n1", "Bandit");
        npc.kind = "npc".to_string();
        let mut candidates = heroes(4);
        candidates.push(npc);

        let state = MontageState::create(MontageConfig::new("Chase", 4), candidates);
        assert_eq!(state.participants().len(), 4);
        assert_eq!(state.limits(), rules::compute_limits(Difficulty::Moderate, 4));
        assert_eq!(state.current_round(), 1);
        assert_eq!((state.successes(), state.failures()), (0, 0));
        assert!(state.round_states().is_empty());
        assert!(state.outcome().is_none());
    }

    #[test]
    fn create_uses_overrides_only_when_both_set() {
        let both = MontageConfig::new("Chase", 5).with_limits(9, 2);
        let state = MontageState::create(both, heroes(5));
        assert_eq!(state.limits().success_limit, 9);
        assert_eq!(state.limits().failure_limit, 2);

        let mut one = MontageConfig::new("Chase", 5);
        one.success_limit = Some(9);
        let state = MontageState::create(one, heroes(5));
        assert_eq!(state.limits().success_limit, 6);
    }

    #[test]
    fn round_state_is_lazy_and_stable() {
        let mut state = montage(Difficulty::Easy, 3);
        assert!(state.round_states().get(&1).is_none());

        let rs = state.round_state(1);
        assert_eq!(rs.len(), 3);
        assert!(rs.iter().all(|r| !r.has_acted()));
        rs[0].narrative = Some("marker".to_string());

        assert_eq!(state.round_state(1)[0].narrative.as_deref(), Some("marker"));
        assert_eq!(state.round_states().len(), 1);
    }

    #[test]
    fn submit_queues_without_touching_tallies() {
        let mut state = montage(Difficulty::Moderate, 2);
        let id = state
            .submit_intent(&pid("h1"), ActionKind::Test, Some(Characteristic::Might), Some("climbs".into()))
            .unwrap();

        let pending = state.pending(id).unwrap();
        assert_eq!(pending.actor_name, "Hero 1");
        assert_eq!(pending.characteristic, Some(Characteristic::Might));

        let record = state.current_record(&pid("h1")).unwrap();
        assert!(record.participating);
        assert_eq!(record.action_type, Some(ActionKind::Test));
        assert_eq!(record.narrative.as_deref(), Some("climbs"));

        assert_eq!((state.successes(), state.failures()), (0, 0));
        assert!(!state.has_used(&pid("h1"), Characteristic::Might));
    }

    #[test]
    fn unknown_participant_leaves_state_unchanged() {
        let mut state = montage(Difficulty::Moderate, 2);
        let before = state.clone();
        let err = state
            .submit_intent(&pid("ghost"), ActionKind::Test, Some(Characteristic::Might), None)
            .unwrap_err();
        assert_eq!(err, IntentError::ParticipantNotFound);
        assert_eq!(err.to_string(), "Participant not found");
        assert_eq!(state, before);

        assert_eq!(state.abstain(&pid("ghost")), Err(IntentError::ParticipantNotFound));
        assert_eq!(state, before);
    }

    #[test]
    fn second_submission_is_already_acted() {
        for second in [ActionKind::Test, ActionKind::Assist, ActionKind::Ability, ActionKind::Abstain] {
            let mut state = montage(Difficulty::Moderate, 2);
            state.submit_intent(&pid("h1"), ActionKind::Ability, None, None).unwrap();
            let before = state.clone();
            let err = state
                .submit_intent(&pid("h1"), second, Some(Characteristic::Reason), None)
                .unwrap_err();
            assert_eq!(err, IntentError::AlreadyActed);
            assert_eq!(state, before);
        }
    }

    #[test]
    fn abstaining_counts_as_acted() {
        let mut state = montage(Difficulty::Moderate, 2);
        state.abstain(&pid("h1")).unwrap();
        assert!(state.pending_approvals().is_empty());
        assert!(!state.can_act(&pid("h1")));
        assert_eq!(state.abstain(&pid("h1")), Err(IntentError::AlreadyActed));
        assert_eq!(
            state.submit_intent(&pid("h1"), ActionKind::Ability, None, None),
            Err(IntentError::AlreadyActed)
        );
    }

    #[test]
    fn tests_and_assists_need_characteristic() {
        let mut state = montage(Difficulty::Moderate, 2);
        assert_eq!(
            state.submit_intent(&pid("h1"), ActionKind::Assist, None, None),
            Err(IntentError::CharacteristicRequired)
        );
        assert!(state.can_act(&pid("h1")));
        assert!(state.submit_intent(&pid("h1"), ActionKind::Ability, None, None).is_ok());
    }

    #[test]
    fn resolved_characteristic_is_spent_for_the_whole_test() {
        let mut state = montage(Difficulty::Easy, 1);
        let id = state
            .submit_intent(&pid("h1"), ActionKind::Test, Some(Characteristic::Agility), None)
            .unwrap();
        assert!(state.apply_roll_result(id, Some(2)));
        assert!(state.advance_round());

        assert_eq!(
            state.submit_intent(&pid("h1"), ActionKind::Assist, Some(Characteristic::Agility), None),
            Err(IntentError::CharacteristicExhausted(Characteristic::Agility))
        );
        assert_eq!(state.available_characteristics(&pid("h1")).len(), 4);
    }

    #[test]
    fn rejection_does_not_burn_characteristic() {
        let mut state = montage(Difficulty::Moderate, 2);
        let id = state
            .submit_intent(&pid("h1"), ActionKind::Test, Some(Characteristic::Presence), Some("bluff".into()))
            .unwrap();
        assert!(state.reject_approval(id));
        assert!(state.pending_approvals().is_empty());

        let record = state.current_record(&pid("h1")).unwrap();
        assert_eq!(record, &ParticipantRoundState::unacted(pid("h1")));

        assert!(
            state
                .submit_intent(&pid("h1"), ActionKind::Test, Some(Characteristic::Presence), None)
                .is_ok()
        );
    }

    #[test]
    fn unknown_approval_ids_are_noops() {
        let mut state = montage(Difficulty::Moderate, 2);
        let before = state.clone();
        assert!(!state.reject_approval(ApprovalId::new()));
        assert!(!state.apply_ability_auto_success(ApprovalId::new()));
        assert!(!state.apply_roll_result(ApprovalId::new(), Some(3)));
        assert_eq!(state, before);
    }

    #[test]
    fn ability_auto_success() {
        let mut state = montage(Difficulty::Moderate, 2);
        let id = state.submit_intent(&pid("h1"), ActionKind::Ability, None, None).unwrap();
        assert!(state.apply_ability_auto_success(id));
        assert_eq!(state.successes(), 1);
        assert!(state.pending_approvals().is_empty());
    }

    #[test]
    fn roll_result_ignores_tier_for_ability_and_abstain() {
        let mut state = montage(Difficulty::Moderate, 2);
        let ability = state.submit_intent(&pid("h1"), ActionKind::Ability, None, None).unwrap();
        let abstain = state.submit_intent(&pid("h2"), ActionKind::Abstain, None, None).unwrap();
        assert!(state.apply_roll_result(ability, Some(1)));
        assert!(state.apply_roll_result(abstain, Some(1)));
        assert_eq!((state.successes(), state.failures()), (1, 0));
    }

    #[test]
    fn missing_tier_is_a_failure() {
        let mut state = montage(Difficulty::Moderate, 2);
        let id = state
            .submit_intent(&pid("h1"), ActionKind::Test, Some(Characteristic::Reason), None)
            .unwrap();
        assert!(state.apply_roll_result(id, None));
        assert_eq!((state.successes(), state.failures()), (0, 1));
        assert!(state.has_used(&pid("h1"), Characteristic::Reason));
    }

    #[test]
    fn pending_queue_blocks_advance() {
        let mut state = montage(Difficulty::Moderate, 2);
        state.abstain(&pid("h1")).unwrap();
        let id = state.submit_intent(&pid("h2"), ActionKind::Ability, None, None).unwrap();

        // Everyone acted, but an approval is outstanding.
        assert!(!state.can_advance_round());
        let before = state.clone();
        assert!(!state.advance_round());
        assert_eq!(state, before);

        assert!(state.apply_ability_auto_success(id));
        assert!(state.can_advance_round());
        assert!(state.advance_round());
        assert_eq!(state.current_round(), 2);
    }

    #[test]
    fn unfinished_round_does_not_advance() {
        let mut state = montage(Difficulty::Moderate, 2);
        state.abstain(&pid("h1")).unwrap();
        assert!(state.pending_approvals().is_empty());
        assert!(!state.can_advance_round());
        let before = state.clone();
        assert!(!state.advance_round());
        assert_eq!(state, before);
        assert_eq!(state.current_round(), 1);
        assert!(state.outcome().is_none());
    }

    #[test]
    fn moderate_five_total_success_scenario() {
        let mut state = montage(Difficulty::Moderate, 5);
        assert_eq!(state.limits(), Limits { success_limit: 6, failure_limit: 4 });

        play_round(&mut state, 3);
        assert!(state.advance_round());
        assert_eq!(state.successes(), 5);

        let id = state
            .submit_intent(&pid("h1"), ActionKind::Test, Some(Characteristic::Presence), None)
            .unwrap();
        assert!(state.apply_roll_result(id, Some(3)));
        for i in 2..=5 {
            state.abstain(&pid(&format!("h{i}"))).unwrap();
        }

        assert!(!state.advance_round());
        assert_eq!(state.outcome(), Some(Outcome::TotalSuccess));
        assert_eq!(state.victories(), 1);
    }

    #[test]
    fn timeout_forces_outcome() {
        let mut state = montage(Difficulty::Easy, 3);
        assert_eq!(state.limits(), Limits { success_limit: 3, failure_limit: 3 });

        let resolve = |state: &mut MontageState, id: &str, c: Characteristic, tier: u8| {
            let approval = state
                .submit_intent(&pid(id), ActionKind::Test, Some(c), None)
                .unwrap();
            assert!(state.apply_roll_result(approval, Some(tier)));
        };

        resolve(&mut state, "h1", Characteristic::Might, 3);
        resolve(&mut state, "h2", Characteristic::Might, 1);
        state.abstain(&pid("h3")).unwrap();
        assert!(state.advance_round());

        resolve(&mut state, "h1", Characteristic::Agility, 2);
        resolve(&mut state, "h2", Characteristic::Agility, 3);
        state.abstain(&pid("h3")).unwrap();

        // 2 successes, 2 failures against 3/3: nothing crossed, but time is up.
        assert_eq!(state.current_round(), state.config().max_rounds);
        assert!(!state.advance_round());
        assert_eq!(state.current_round(), 2);
        assert_eq!(state.outcome(), Some(Outcome::TotalFailure));
    }

    #[test]
    fn failure_limit_ends_early() {
        let mut state = montage(Difficulty::Hard, 3);
        assert_eq!(state.config().max_rounds, 2);
        play_round(&mut state, 1);
        // Hard, three heroes: limits 5/2; three failures end round one.
        assert!(!state.advance_round());
        assert_eq!(state.current_round(), 1);
        assert_eq!(state.outcome(), Some(Outcome::TotalFailure));
        assert_eq!(state.victories(), 0);
    }

    #[test]
    fn finalize_ignores_queue() {
        let mut state = montage(Difficulty::Moderate, 2);
        state.config.max_rounds = 1;
        state.submit_intent(&pid("h1"), ActionKind::Ability, None, None).unwrap();
        state.successes = 2;
        assert_eq!(state.finalize_outcome(), Some(Outcome::PartialSuccess));
        assert_eq!(state.outcome(), Some(Outcome::PartialSuccess));
        assert_eq!(state.pending_approvals().len(), 1);
    }

    #[test]
    fn participant_lookup_by_user() {
        let config = MontageConfig::new("Chase", 2);
        let candidates = vec![
            HeroRecord::new("h1", "Vask").with_owner("alice", false),
            HeroRecord::new("h2", "Kor"),
        ];
        let state = MontageState::create(config, candidates);
        assert_eq!(
            state.participant_for_user(&UserId::from("alice")).map(|p| p.actor_name.as_str()),
            Some("Vask")
        );
        assert!(state.participant_for_user(&UserId::from("bob")).is_none());
    }
}
