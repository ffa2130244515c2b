//! Montage test domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How hard a montage test is. Sets the base success and failure limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Base limits 5 successes / 5 failures.
    Easy,
    /// Base limits 6 successes / 4 failures.
    #[default]
    Moderate,
    /// Base limits 7 successes / 3 failures.
    Hard,
}

impl Difficulty {
    /// Parse a difficulty from a user-supplied string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "moderate" | "medium" => Some(Self::Moderate),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

/// Whether players may see the numeric success/failure limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the director sees the limits.
    #[default]
    Hidden,
    /// Everyone sees the limits.
    Visible,
}

/// Final result of a montage test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// The success limit was reached.
    TotalSuccess,
    /// Failures or time ran out, but successes led failures by at least two.
    PartialSuccess,
    /// Failures or time ran out without enough successes.
    TotalFailure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalSuccess => write!(f, "Total Success"),
            Self::PartialSuccess => write!(f, "Partial Success"),
            Self::TotalFailure => write!(f, "Total Failure"),
        }
    }
}

/// What a participant chose to do in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Roll a characteristic test toward the group's pool.
    Test,
    /// Help another hero; rolled like a test.
    Assist,
    /// Use an ability that succeeds without a roll.
    Ability,
    /// Sit the round out.
    Abstain,
}

impl ActionKind {
    /// Parse an action kind from a user-supplied string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "test" => Some(Self::Test),
            "assist" => Some(Self::Assist),
            "ability" => Some(Self::Ability),
            "abstain" | "pass" => Some(Self::Abstain),
            _ => None,
        }
    }

    /// Tests and assists spend a characteristic; other kinds don't.
    pub fn requires_characteristic(self) -> bool {
        matches!(self, Self::Test | Self::Assist)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Assist => write!(f, "assist"),
            Self::Ability => write!(f, "ability"),
            Self::Abstain => write!(f, "abstain"),
        }
    }
}

/// A hero characteristic. Each may be spent once per participant per montage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Characteristic {
    /// Strength and toughness.
    Might,
    /// Speed and coordination.
    Agility,
    /// Logic and learning.
    Reason,
    /// Perception and instinct.
    Intuition,
    /// Force of personality.
    Presence,
}

impl Characteristic {
    /// Every characteristic, in sheet order.
    pub const ALL: [Self; 5] = [
        Self::Might,
        Self::Agility,
        Self::Reason,
        Self::Intuition,
        Self::Presence,
    ];

    /// Parse a characteristic from a user-supplied string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "might" | "m" => Some(Self::Might),
            "agility" | "a" => Some(Self::Agility),
            "reason" | "r" => Some(Self::Reason),
            "intuition" | "i" => Some(Self::Intuition),
            "presence" | "p" => Some(Self::Presence),
            _ => None,
        }
    }

    /// The lowercase key hosts use to address this characteristic.
    pub fn key(self) -> &'static str {
        match self {
            Self::Might => "might",
            Self::Agility => "agility",
            Self::Reason => "reason",
            Self::Intuition => "intuition",
            Self::Presence => "presence",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Might => write!(f, "Might"),
            Self::Agility => write!(f, "Agility"),
            Self::Reason => write!(f, "Reason"),
            Self::Intuition => write!(f, "Intuition"),
            Self::Presence => write!(f, "Presence"),
        }
    }
}

/// Host identifier of the character backing a participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host identifier of a (non-privileged) user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalId(pub Uuid);

impl ApprovalId {
    /// Generate a new random approval ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, enough to tell approvals apart at a table.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ApprovalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ApprovalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings for one montage test. Fixed once the test starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MontageConfig {
    /// Unique test identifier.
    pub id: Uuid,
    /// Title shown to the table.
    pub title: String,
    /// Free-text scene description.
    pub description: String,
    /// Test difficulty.
    pub difficulty: Difficulty,
    /// Whether limits are shown to players.
    pub visibility: Visibility,
    /// Success limit override. Only used together with `failure_limit`.
    pub success_limit: Option<u32>,
    /// Failure limit override. Only used together with `success_limit`.
    pub failure_limit: Option<u32>,
    /// Number of rounds before time runs out.
    pub max_rounds: u32,
    /// Number of heroes the limits are scaled for.
    pub group_size: u32,
}

impl MontageConfig {
    /// Default number of rounds in a montage test.
    pub const DEFAULT_MAX_ROUNDS: u32 = 2;

    /// A moderate, hidden, two-round test for `group_size` heroes.
    pub fn new(title: impl Into<String>, group_size: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            difficulty: Difficulty::default(),
            visibility: Visibility::default(),
            success_limit: None,
            failure_limit: None,
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            group_size,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set limit visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Override both limits instead of deriving them.
    pub fn with_limits(mut self, success_limit: u32, failure_limit: u32) -> Self {
        self.success_limit = Some(success_limit);
        self.failure_limit = Some(failure_limit);
        self
    }

    /// Set the round limit (at least 1).
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }
}

/// A hero seated in the montage test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Backing character.
    pub actor_id: ParticipantId,
    /// Display name.
    pub actor_name: String,
    /// Owning non-privileged user, if a player controls this hero.
    pub player_id: Option<UserId>,
    /// Human ancestry with the Determination perk.
    pub has_human_assist_perk: bool,
}

/// What one participant did in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRoundState {
    /// Whose record this is.
    pub actor_id: ParticipantId,
    /// Engaged with the round (acted or abstained).
    pub participating: bool,
    /// `None` until the participant acts.
    pub action_type: Option<ActionKind>,
    /// Characteristic named by a test or assist.
    pub characteristic: Option<Characteristic>,
    /// Narrative offered with the action.
    pub narrative: Option<String>,
}

impl ParticipantRoundState {
    /// A record for a participant who has not acted yet.
    pub fn unacted(actor_id: ParticipantId) -> Self {
        Self {
            actor_id,
            participating: false,
            action_type: None,
            characteristic: None,
            narrative: None,
        }
    }

    /// Whether the participant already chose an action.
    pub fn has_acted(&self) -> bool {
        self.action_type.is_some()
    }

    pub(crate) fn engage(
        &mut self,
        kind: ActionKind,
        characteristic: Option<Characteristic>,
        narrative: Option<String>,
    ) {
        self.participating = true;
        self.action_type = Some(kind);
        self.characteristic = characteristic;
        self.narrative = narrative;
    }

    pub(crate) fn reset(&mut self) {
        self.participating = false;
        self.action_type = None;
        self.characteristic = None;
        self.narrative = None;
    }
}

/// A submitted action waiting for the director to approve or reject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
    /// Approval identifier.
    pub id: ApprovalId,
    /// Submitting participant.
    pub actor_id: ParticipantId,
    /// Participant display name at submission time.
    pub actor_name: String,
    /// Requested action.
    pub action_type: ActionKind,
    /// Characteristic to roll, for tests and assists.
    pub characteristic: Option<Characteristic>,
    /// Narrative offered with the action.
    pub narrative: Option<String>,
    /// When the intent arrived.
    pub submitted_at: DateTime<Utc>,
}
