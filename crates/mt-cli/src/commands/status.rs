use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use mt_core::{Characteristic, MontageState, UserId};
use mt_director::{DirectorView, PlayerView};

pub fn run(state: &Path, as_user: Option<&str>) -> Result<(), String> {
    let director = super::open_running(state, None)?;
    let running = super::running(&director)?;
    match as_user {
        Some(user) => print_player(&PlayerView::new(running, &UserId::from(user))),
        None => print_director(&DirectorView::new(running)),
    }
    Ok(())
}

/// One-line round and tally summary.
pub fn print_progress(state: &MontageState) {
    let limits = state.limits();
    println!(
        "  Round {}/{} | Successes: {}/{} | Failures: {}/{}",
        state.current_round(),
        state.config().max_rounds,
        state.successes(),
        limits.success_limit,
        state.failures(),
        limits.failure_limit
    );
}

fn list(characteristics: &[Characteristic]) -> String {
    if characteristics.is_empty() {
        return "—".to_string();
    }
    characteristics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_director(view: &DirectorView) {
    println!("  {} ({})", view.title.bold(), view.difficulty);
    if !view.description.is_empty() {
        println!("  {}", view.description.dimmed());
    }
    println!(
        "  Round {}/{} | Successes: {}/{} | Failures: {}/{}",
        view.round,
        view.max_rounds,
        view.successes,
        view.limits.success_limit,
        view.failures,
        view.limits.failure_limit
    );

    let mut roster = Table::new();
    roster.set_content_arrangement(ContentArrangement::Dynamic);
    roster.set_header(vec!["Id", "Hero", "Player", "This round", "Used"]);
    for row in &view.roster {
        let player = row
            .player
            .as_ref()
            .map_or_else(|| "—".to_string(), ToString::to_string);
        let name = if row.perk {
            format!("{} *", row.name)
        } else {
            row.name.clone()
        };
        let action = row
            .action
            .map_or_else(|| "—".to_string(), |a| a.to_string());
        roster.add_row(vec![
            row.id.to_string(),
            name,
            player,
            action,
            list(&row.used),
        ]);
    }
    println!("{roster}");
    if view.roster.iter().any(|r| r.perk) {
        println!("  {}", "* Human Determination".dimmed());
    }

    if view.pending.is_empty() {
        println!("  No pending approvals.");
    } else {
        let mut pending = Table::new();
        pending.set_content_arrangement(ContentArrangement::Dynamic);
        pending.set_header(vec!["Approval", "Hero", "Action", "Narrative"]);
        for row in &view.pending {
            let action = match row.characteristic {
                Some(c) => format!("{} ({c})", row.action),
                None => row.action.to_string(),
            };
            pending.add_row(vec![
                row.id.short(),
                row.name.clone(),
                action,
                row.narrative.clone().unwrap_or_default(),
            ]);
        }
        println!("{pending}");
    }

    if let Some(outcome) = view.outcome {
        println!(
            "  {} ({} victories)",
            outcome.to_string().bold(),
            view.victories
        );
    }
}

fn print_player(view: &PlayerView) {
    println!("  {}", view.title.bold());
    match view.limits {
        Some(limits) => println!(
            "  Round {} | Successes: {}/{} | Failures: {}/{}",
            view.round, view.successes, limits.success_limit, view.failures, limits.failure_limit
        ),
        None => println!(
            "  Round {} | Successes: {} | Failures: {}",
            view.round, view.successes, view.failures
        ),
    }

    if let Some(outcome) = view.outcome {
        println!("  {}", outcome.to_string().bold());
        return;
    }
    match &view.participant {
        None => println!("  You have no hero in this montage."),
        Some(id) if view.can_act => {
            println!("  {id} may act. Characteristics left: {}", list(&view.available));
        }
        Some(id) => println!("  {id} has acted this round."),
    }
}
