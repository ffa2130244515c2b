//! Montage test rule math.
//!
//! - Base limits for five heroes: Easy 5/5, Moderate 6/4, Hard 7/3
//! - Smaller groups lose one from each limit per missing hero (never below 2);
//!   larger groups gain one per extra hero
//! - Reaching the success limit wins outright, even if failures also hit theirs
//! - Otherwise a failure limit or timeout is a partial success when successes
//!   lead failures by two or more, and a total failure if not
//! - Victories: total success 1 (2 on hard); partial success 1 on moderate/hard

use serde::{Deserialize, Serialize};

use crate::domain::{Difficulty, Outcome};

/// Group size the base limits are written for.
pub const REFERENCE_GROUP_SIZE: u32 = 5;

/// Floor for either limit when shrinking for a small group.
pub const MIN_LIMIT: u32 = 2;

/// The roll tier that counts as a success.
pub const SUCCESS_TIER: u8 = 3;

/// Success and failure thresholds for a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    /// Successes needed for a total success.
    pub success_limit: u32,
    /// Failures that end the test.
    pub failure_limit: u32,
}

fn base_limits(difficulty: Difficulty) -> Limits {
    let (success_limit, failure_limit) = match difficulty {
        Difficulty::Easy => (5, 5),
        Difficulty::Moderate => (6, 4),
        Difficulty::Hard => (7, 3),
    };
    Limits {
        success_limit,
        failure_limit,
    }
}

/// Compute the limits for a difficulty and group size.
pub fn compute_limits(difficulty: Difficulty, group_size: u32) -> Limits {
    let base = base_limits(difficulty);
    if group_size < REFERENCE_GROUP_SIZE {
        let delta = REFERENCE_GROUP_SIZE - group_size;
        Limits {
            success_limit: base.success_limit.saturating_sub(delta).max(MIN_LIMIT),
            failure_limit: base.failure_limit.saturating_sub(delta).max(MIN_LIMIT),
        }
    } else {
        let delta = group_size - REFERENCE_GROUP_SIZE;
        Limits {
            success_limit: base.success_limit.saturating_add(delta),
            failure_limit: base.failure_limit.saturating_add(delta),
        }
    }
}

/// Decide the outcome from the running tallies, or `None` if the test goes on.
///
/// The success check runs first: hitting both limits at once is a success.
pub fn compute_outcome(
    successes: u32,
    failures: u32,
    limits: Limits,
    round_limit_reached: bool,
) -> Option<Outcome> {
    if successes >= limits.success_limit {
        return Some(Outcome::TotalSuccess);
    }
    if failures >= limits.failure_limit || round_limit_reached {
        return if successes >= failures.saturating_add(2) {
            Some(Outcome::PartialSuccess)
        } else {
            Some(Outcome::TotalFailure)
        };
    }
    None
}

/// Victories awarded to the group for an outcome.
pub fn victory_count(outcome: Option<Outcome>, difficulty: Difficulty) -> u32 {
    match (outcome, difficulty) {
        (None | Some(Outcome::TotalFailure), _) => 0,
        (Some(Outcome::TotalSuccess), Difficulty::Hard) => 2,
        (Some(Outcome::TotalSuccess), _) => 1,
        (Some(Outcome::PartialSuccess), Difficulty::Easy) => 0,
        (Some(Outcome::PartialSuccess), _) => 1,
    }
}

/// Turn a roll tier into a success. Anything but tier 3, including no
/// readable tier at all, is a failure.
pub fn tier_is_success(tier: Option<u8>) -> bool {
    tier == Some(SUCCESS_TIER)
}
