//! Roll collaborator contract.
//!
//! The director never rolls dice. It asks the host to roll a characteristic
//! and reads a tier (1, 2 or 3) back through [`TierSource`]. Whatever shape the
//! host's roll result has, the adapter reduces it to a tier or to nothing.

use mt_core::{Characteristic, Participant};

use crate::error::RollError;

/// Pulls a tier out of an opaque roll result.
pub trait TierSource {
    /// The roll's tier, or `None` if it cannot be read.
    fn tier(&self) -> Option<u8>;
}

impl TierSource for u8 {
    fn tier(&self) -> Option<u8> {
        Some(*self)
    }
}

impl TierSource for Option<u8> {
    fn tier(&self) -> Option<u8> {
        *self
    }
}

/// Reads tiers out of JSON roll payloads. The first readable location wins:
/// `product` on the last entry of `rolls`, then `product` on the last roll of
/// the first `parts` entry with `type == "test"`.
impl TierSource for serde_json::Value {
    fn tier(&self) -> Option<u8> {
        let from_roll = |roll: &serde_json::Value| {
            roll.get("product")
                .and_then(serde_json::Value::as_u64)
                .and_then(|p| u8::try_from(p).ok())
        };

        if let Some(tier) = self
            .get("rolls")
            .and_then(serde_json::Value::as_array)
            .and_then(|rolls| rolls.last())
            .and_then(from_roll)
        {
            return Some(tier);
        }

        self.get("parts")
            .and_then(serde_json::Value::as_array)?
            .iter()
            .find(|part| part.get("type").and_then(serde_json::Value::as_str) == Some("test"))?
            .get("rolls")
            .and_then(serde_json::Value::as_array)?
            .last()
            .and_then(from_roll)
    }
}

/// The host's characteristic roll.
pub trait RollCollaborator {
    /// What a successful roll hands back.
    type Output: TierSource;

    /// Roll `characteristic` for `participant` at the given host difficulty.
    fn roll(
        &self,
        participant: &Participant,
        characteristic: Characteristic,
        difficulty: &str,
    ) -> impl Future<Output = Result<Self::Output, RollError>>;
}
