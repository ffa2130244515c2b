use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use mt_core::{Difficulty, HeroCandidate, HeroRecord, MontageConfig, Visibility};

pub struct StartArgs {
    pub heroes: PathBuf,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub visible: bool,
    pub limits: Option<(u32, u32)>,
    pub max_rounds: Option<u32>,
}

fn read_heroes(path: &Path) -> Result<Vec<HeroRecord>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid heroes file {}: {e}", path.display()))
}

pub fn run(state: &Path, args: &StartArgs) -> Result<(), String> {
    let difficulty = Difficulty::parse(&args.difficulty).ok_or_else(|| {
        format!(
            "unknown difficulty '{}' (easy, moderate, hard)",
            args.difficulty
        )
    })?;
    let heroes = read_heroes(&args.heroes)?;
    let group_size = heroes.iter().filter(|h| h.is_eligible_hero()).count() as u32;
    if group_size == 0 {
        return Err("no eligible heroes in the heroes file".into());
    }

    let mut director = super::open(state, None)?;
    let visibility = if args.visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    let mut config = MontageConfig::new(&args.title, group_size)
        .with_description(&args.description)
        .with_difficulty(difficulty)
        .with_visibility(visibility)
        .with_max_rounds(
            args.max_rounds
                .unwrap_or(director.settings().default_max_rounds),
        );
    if let Some((successes, failures)) = args.limits {
        config = config.with_limits(successes, failures);
    }

    let limits = director.start_test(config, &heroes);
    let running = super::running(&director)?;

    println!(
        "  {} '{}' ({difficulty}, {} rounds)",
        "Started".bold(),
        running.config().title,
        running.config().max_rounds
    );
    println!(
        "  Success limit: {} | Failure limit: {}",
        limits.success_limit, limits.failure_limit
    );

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Hero", "Player", "Determination"]);
    for p in running.participants() {
        let player = p
            .player_id
            .as_ref()
            .map_or_else(|| "—".to_string(), ToString::to_string);
        let perk = if p.has_human_assist_perk { "yes" } else { "" };
        table.add_row(vec![
            p.actor_id.as_str(),
            p.actor_name.as_str(),
            player.as_str(),
            perk,
        ]);
    }
    println!("{table}");
    Ok(())
}
