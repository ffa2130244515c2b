use std::path::Path;

use colored::Colorize;
use mt_director::{ApproveResult, DirectorError, RollError, RoundAdvance};

pub fn run(state: &Path, target: &str, tier: Option<String>) -> Result<(), String> {
    let mut director = super::open_running(state, tier)?;
    let id = super::resolve_approval(super::running(&director)?, target)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("cannot start runtime: {e}"))?;
    let result = runtime
        .block_on(director.approve(id))
        .map_err(|e| match e {
            DirectorError::Roll(RollError::Unavailable(_)) => format!(
                "{e}: pass --tier with the rolled tier (approval {} is still queued)",
                id.short()
            ),
            e => format!("{e} (approval {} is still queued)", id.short()),
        })?;

    let ApproveResult::Resolved { success, advance } = result else {
        return Err(format!("approval {} is no longer pending", id.short()));
    };
    let verdict = match success {
        Some(true) => "success".green(),
        Some(false) => "failure".red(),
        None => "abstains".dimmed(),
    };
    println!("  Approved [{}]: {verdict}", id.short());

    match advance {
        RoundAdvance::NotReady => {}
        RoundAdvance::Advanced(round) => println!("  Round {round} begins"),
        RoundAdvance::Concluded(None) => println!("  The test ended undecided"),
        // Announced by the console announcer.
        RoundAdvance::Concluded(Some(_)) => return Ok(()),
    }
    if let Some(running) = director.state() {
        super::status::print_progress(running);
    }
    Ok(())
}
