//! Read-only projections of a montage test for the director and for players.

use mt_core::{
    ActionKind, ApprovalId, Characteristic, Difficulty, Limits, MontageState, Outcome,
    ParticipantId, UserId, Visibility,
};

/// One roster line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// Participant.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Owning player, if any.
    pub player: Option<UserId>,
    /// Human Determination perk.
    pub perk: bool,
    /// This round's action, if taken.
    pub action: Option<ActionKind>,
    /// Characteristics spent so far.
    pub used: Vec<Characteristic>,
}

/// One approval queue line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRow {
    /// Approval id.
    pub id: ApprovalId,
    /// Submitting participant.
    pub participant: ParticipantId,
    /// Participant name.
    pub name: String,
    /// Requested action.
    pub action: ActionKind,
    /// Characteristic to roll.
    pub characteristic: Option<Characteristic>,
    /// Narrative.
    pub narrative: Option<String>,
}

/// Everything the director sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorView {
    /// Test title.
    pub title: String,
    /// Scene description.
    pub description: String,
    /// Difficulty.
    pub difficulty: Difficulty,
    /// Current round.
    pub round: u32,
    /// Round limit.
    pub max_rounds: u32,
    /// Success tally.
    pub successes: u32,
    /// Failure tally.
    pub failures: u32,
    /// Limits; always shown to the director.
    pub limits: Limits,
    /// Roster with this round's actions.
    pub roster: Vec<RosterRow>,
    /// Approval queue, oldest first.
    pub pending: Vec<ApprovalRow>,
    /// Outcome, once decided.
    pub outcome: Option<Outcome>,
    /// Victories for the outcome.
    pub victories: u32,
}

impl DirectorView {
    /// Project the full state.
    pub fn new(state: &MontageState) -> Self {
        let roster = state
            .participants()
            .iter()
            .map(|p| RosterRow {
                id: p.actor_id.clone(),
                name: p.actor_name.clone(),
                player: p.player_id.clone(),
                perk: p.has_human_assist_perk,
                action: state.current_record(&p.actor_id).and_then(|r| r.action_type),
                used: state
                    .used_characteristics()
                    .get(&p.actor_id)
                    .map(|used| used.iter().copied().collect())
                    .unwrap_or_default(),
            })
            .collect();
        let pending = state
            .pending_approvals()
            .iter()
            .map(|a| ApprovalRow {
                id: a.id,
                participant: a.actor_id.clone(),
                name: a.actor_name.clone(),
                action: a.action_type,
                characteristic: a.characteristic,
                narrative: a.narrative.clone(),
            })
            .collect();
        let config = state.config();

        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            difficulty: config.difficulty,
            round: state.current_round(),
            max_rounds: config.max_rounds,
            successes: state.successes(),
            failures: state.failures(),
            limits: state.limits(),
            roster,
            pending,
            outcome: state.outcome(),
            victories: state.victories(),
        }
    }
}

/// What a player sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    /// Test title.
    pub title: String,
    /// Current round.
    pub round: u32,
    /// Success tally.
    pub successes: u32,
    /// Failure tally.
    pub failures: u32,
    /// Limits, only when the director made them visible.
    pub limits: Option<Limits>,
    /// The viewer's participant, if they play one.
    pub participant: Option<ParticipantId>,
    /// Whether the viewer may act this round.
    pub can_act: bool,
    /// Characteristics the viewer can still use.
    pub available: Vec<Characteristic>,
    /// Outcome, once decided.
    pub outcome: Option<Outcome>,
}

impl PlayerView {
    /// Project the state for `user`.
    pub fn new(state: &MontageState, user: &UserId) -> Self {
        let participant = state
            .participant_for_user(user)
            .map(|p| p.actor_id.clone());
        let (can_act, available) = match &participant {
            Some(id) => (state.can_act(id), state.available_characteristics(id)),
            None => (false, Vec::new()),
        };
        let limits = match state.config().visibility {
            Visibility::Visible => Some(state.limits()),
            Visibility::Hidden => None,
        };

        Self {
            title: state.config().title.clone(),
            round: state.current_round(),
            successes: state.successes(),
            failures: state.failures(),
            limits,
            participant,
            can_act,
            available,
            outcome: state.outcome(),
        }
    }
}
