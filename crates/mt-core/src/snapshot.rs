//! Persisted layout of a montage test.
//!
//! The two keyed collections of [`MontageState`] are flattened to ordered
//! `(key, value)` pairs so the snapshot survives stores that only understand
//! plain JSON arrays and objects. Restoring rebuilds the maps and sets.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Characteristic, MontageConfig, Outcome, Participant, ParticipantId, ParticipantRoundState,
    PendingApproval,
};
use crate::error::SnapshotError;
use crate::rules::{self, Limits};
use crate::state::MontageState;

/// Serializable copy of a [`MontageState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MontageSnapshot {
    /// Test configuration.
    pub config: MontageConfig,
    /// Resolved limits. Recomputed from the config when absent.
    #[serde(default)]
    pub limits: Option<Limits>,
    /// Seated heroes.
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Current round.
    pub current_round: u32,
    /// Success tally.
    pub successes: u32,
    /// Failure tally.
    pub failures: u32,
    /// Round records as `(round, records)` pairs.
    #[serde(default)]
    pub round_states: Vec<(u32, Vec<ParticipantRoundState>)>,
    /// Outstanding approvals.
    #[serde(default)]
    pub pending_approvals: Vec<PendingApproval>,
    /// Spent characteristics as `(participant, characteristics)` pairs.
    #[serde(default)]
    pub used_characteristics: Vec<(ParticipantId, Vec<Characteristic>)>,
    /// Final outcome, once decided.
    #[serde(default)]
    pub outcome: Option<Outcome>,
    /// When the test started.
    pub started_at: DateTime<Utc>,
}

impl MontageSnapshot {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<&MontageState> for MontageSnapshot {
    fn from(state: &MontageState) -> Self {
        Self {
            config: state.config.clone(),
            limits: Some(state.limits),
            participants: state.participants.clone(),
            current_round: state.current_round,
            successes: state.successes,
            failures: state.failures,
            round_states: state
                .round_states
                .iter()
                .map(|(round, records)| (*round, records.clone()))
                .collect(),
            pending_approvals: state.pending_approvals.clone(),
            used_characteristics: state
                .used_characteristics
                .iter()
                .map(|(id, used)| (id.clone(), used.iter().copied().collect()))
                .collect(),
            outcome: state.outcome,
            started_at: state.started_at,
        }
    }
}

impl From<MontageSnapshot> for MontageState {
    fn from(snapshot: MontageSnapshot) -> Self {
        let limits = snapshot.limits.unwrap_or_else(|| {
            match (snapshot.config.success_limit, snapshot.config.failure_limit) {
                (Some(success_limit), Some(failure_limit)) => Limits {
                    success_limit,
                    failure_limit,
                },
                _ => rules::compute_limits(snapshot.config.difficulty, snapshot.config.group_size),
            }
        });
        let round_states: BTreeMap<u32, Vec<ParticipantRoundState>> =
            snapshot.round_states.into_iter().collect();
        let used_characteristics: BTreeMap<ParticipantId, BTreeSet<Characteristic>> = snapshot
            .used_characteristics
            .into_iter()
            .map(|(id, used)| (id, used.into_iter().collect()))
            .collect();

        Self {
            config: snapshot.config,
            limits,
            participants: snapshot.participants,
            current_round: snapshot.current_round.max(1),
            successes: snapshot.successes,
            failures: snapshot.failures,
            round_states,
            pending_approvals: snapshot.pending_approvals,
            used_characteristics,
            outcome: snapshot.outcome,
            started_at: snapshot.started_at,
        }
    }
}

impl MontageState {
    /// Flatten into the persisted layout.
    pub fn to_snapshot(&self) -> MontageSnapshot {
        MontageSnapshot::from(self)
    }

    /// Rebuild from the persisted layout.
    pub fn from_snapshot(snapshot: MontageSnapshot) -> Self {
        Self::from(snapshot)
    }
}
