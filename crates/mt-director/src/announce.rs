//! Outcome announcements.

use std::fmt;

use mt_core::{MontageState, Outcome};

/// Summary of a finished montage test, published to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Test title.
    pub title: String,
    /// Final outcome.
    pub outcome: Outcome,
    /// Final success tally.
    pub successes: u32,
    /// Final failure tally.
    pub failures: u32,
    /// Victories earned.
    pub victories: u32,
}

impl Announcement {
    /// Summarize a resolved state. `None` while the test is still undecided.
    pub fn from_state(state: &MontageState) -> Option<Self> {
        Some(Self {
            title: state.config().title.clone(),
            outcome: state.outcome()?,
            successes: state.successes(),
            failures: state.failures(),
            victories: state.victories(),
        })
    }

    /// Reward line, when the group earned anything.
    pub fn reward(&self) -> Option<String> {
        match self.victories {
            0 => None,
            1 => Some("The heroes earn 1 Victory.".to_string()),
            n => Some(format!("The heroes earn {n} Victories.")),
        }
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.outcome)?;
        writeln!(f, "{}", self.title)?;
        write!(
            f,
            "Successes: {} | Failures: {}",
            self.successes, self.failures
        )?;
        if let Some(reward) = self.reward() {
            write!(f, "\n{reward}")?;
        }
        Ok(())
    }
}

/// Publishes announcements to a log everyone can see.
pub trait Announcer {
    /// Publish one announcement.
    fn announce(&mut self, announcement: &Announcement);
}

/// Collects announcements in memory.
impl Announcer for Vec<Announcement> {
    fn announce(&mut self, announcement: &Announcement) {
        self.push(announcement.clone());
    }
}

/// Writes announcements to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnnouncer;

impl Announcer for TracingAnnouncer {
    fn announce(&mut self, announcement: &Announcement) {
        tracing::info!(
            title = %announcement.title,
            outcome = %announcement.outcome,
            successes = announcement.successes,
            failures = announcement.failures,
            victories = announcement.victories,
            "montage test concluded"
        );
    }
}
