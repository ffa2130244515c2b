//! Director configuration.

/// Settings for a [`Director`](crate::Director).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorSettings {
    /// Difficulty passed to the host with every characteristic roll.
    pub roll_difficulty: String,
    /// Round limit used when a caller has no preference.
    pub default_max_rounds: u32,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            roll_difficulty: "medium".to_string(),
            default_max_rounds: mt_core::MontageConfig::DEFAULT_MAX_ROUNDS,
        }
    }
}

impl DirectorSettings {
    /// Set the roll difficulty handed to the host.
    pub fn with_roll_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.roll_difficulty = difficulty.into();
        self
    }

    /// Set the default round limit (at least 1).
    pub fn with_default_max_rounds(mut self, rounds: u32) -> Self {
        self.default_max_rounds = rounds.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let s = DirectorSettings::default();
        assert_eq!(s.roll_difficulty, "medium");
        assert_eq!(s.default_max_rounds, 2);
    }

    #[test]
    fn builder_methods() {
        let s = DirectorSettings::default()
            .with_roll_difficulty("hard")
            .with_default_max_rounds(0);
        assert_eq!(s.roll_difficulty, "hard");
        assert_eq!(s.default_max_rounds, 1);
    }
}
