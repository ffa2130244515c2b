//! Host collaborators for the command line: rolls come from `--tier`,
//! announcements go to stdout.

use colored::Colorize;
use mt_core::{Characteristic, Outcome, Participant};
use mt_director::{Announcement, Announcer, RollCollaborator, RollError};

/// Rolls are made at the table; the director types the tier in.
pub struct TierArgRoller {
    tier: Option<String>,
}

impl TierArgRoller {
    pub fn new(tier: Option<String>) -> Self {
        Self { tier }
    }
}

impl RollCollaborator for TierArgRoller {
    type Output = Option<u8>;

    async fn roll(
        &self,
        participant: &Participant,
        characteristic: Characteristic,
        difficulty: &str,
    ) -> Result<Option<u8>, RollError> {
        let Some(raw) = &self.tier else {
            return Err(RollError::Unavailable(participant.actor_id.clone()));
        };
        tracing::debug!(
            participant = %participant.actor_id,
            %characteristic,
            difficulty,
            tier = raw.as_str(),
            "tier entered by director"
        );
        // Anything unreadable counts as a miss rather than an error.
        Ok(raw.trim().parse().ok())
    }
}

/// Prints announcements for the table.
pub struct ConsoleAnnouncer;

impl Announcer for ConsoleAnnouncer {
    fn announce(&mut self, announcement: &Announcement) {
        let headline = announcement.outcome.to_string();
        let headline = match announcement.outcome {
            Outcome::TotalSuccess => headline.green().bold(),
            Outcome::PartialSuccess => headline.yellow().bold(),
            Outcome::TotalFailure => headline.red().bold(),
        };
        println!();
        println!("  {headline}");
        println!("  {}", announcement.title);
        println!(
            "  Successes: {} | Failures: {}",
            announcement.successes, announcement.failures
        );
        if let Some(reward) = announcement.reward() {
            println!("  {reward}");
        }
    }
}
