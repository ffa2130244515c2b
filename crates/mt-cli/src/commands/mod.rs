pub mod abstain;
pub mod approve;
pub mod end;
pub mod limits;
pub mod reject;
pub mod relay;
pub mod start;
pub mod status;
pub mod submit;

use std::path::Path;

use mt_core::{ApprovalId, MontageState, ParticipantId};
use mt_director::{Director, DirectorError, DirectorSettings, JsonFileStore};

use crate::host::{ConsoleAnnouncer, TierArgRoller};

/// Names closer than this to the query count as a match.
const FUZZY_THRESHOLD: f64 = 0.8;

/// Shortest approval id prefix accepted.
const MIN_PREFIX: usize = 4;

pub type CliDirector = Director<TierArgRoller, JsonFileStore, ConsoleAnnouncer>;

/// Open the director over the state file, restoring any running test.
fn open(state: &Path, tier: Option<String>) -> Result<CliDirector, String> {
    let mut director = Director::new(
        TierArgRoller::new(tier),
        JsonFileStore::new(state),
        ConsoleAnnouncer,
        DirectorSettings::default(),
    );
    director
        .load()
        .map_err(|e| format!("cannot read {}: {e}", state.display()))?;
    Ok(director)
}

/// Open the director and insist on a running test.
fn open_running(state: &Path, tier: Option<String>) -> Result<CliDirector, String> {
    let director = open(state, tier)?;
    if director.state().is_none() {
        return Err(DirectorError::NoActiveTest.to_string());
    }
    Ok(director)
}

fn running(director: &CliDirector) -> Result<&MontageState, String> {
    director
        .state()
        .ok_or_else(|| DirectorError::NoActiveTest.to_string())
}

/// Find a participant by id or by case-insensitive name.
fn exact_participant(state: &MontageState, query: &str) -> Option<ParticipantId> {
    let participants = state.participants();
    participants
        .iter()
        .find(|p| p.actor_id.as_str() == query)
        .or_else(|| {
            participants
                .iter()
                .find(|p| p.actor_name.eq_ignore_ascii_case(query))
        })
        .map(|p| p.actor_id.clone())
}

/// Find a participant by id, then by name, then by the closest name.
fn resolve_participant(state: &MontageState, query: &str) -> Result<ParticipantId, String> {
    if let Some(id) = exact_participant(state, query) {
        return Ok(id);
    }

    let lower = query.to_lowercase();
    state
        .participants()
        .iter()
        .map(|p| (p, strsim::jaro_winkler(&lower, &p.actor_name.to_lowercase())))
        .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p.actor_id.clone())
        .ok_or_else(|| format!("no participant matches '{query}'"))
}

/// Find a pending approval by its participant or by id prefix.
fn resolve_approval(state: &MontageState, query: &str) -> Result<ApprovalId, String> {
    let pending = state.pending_approvals();
    let for_participant = |participant: ParticipantId| {
        pending
            .iter()
            .find(|a| a.actor_id == participant)
            .map(|a| a.id)
            .ok_or_else(|| format!("{participant} has no pending approval"))
    };

    if let Some(participant) = exact_participant(state, query) {
        return for_participant(participant);
    }

    let prefix = query.to_lowercase();
    if prefix.len() >= MIN_PREFIX {
        let matches: Vec<_> = pending
            .iter()
            .filter(|a| a.id.to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [only] => return Ok(only.id),
            [] => {}
            _ => return Err(format!("approval id '{query}' is ambiguous")),
        }
    }

    let participant = resolve_participant(state, query)
        .map_err(|_| format!("no pending approval matches '{query}'"))?;
    for_participant(participant)
}
