use std::path::Path;

use mt_core::{ActionKind, Characteristic};

pub fn run(
    state: &Path,
    participant: &str,
    action: &str,
    characteristic: Option<&str>,
    narrative: Option<String>,
) -> Result<(), String> {
    let kind = ActionKind::parse(action)
        .ok_or_else(|| format!("unknown action '{action}' (test, assist, ability, abstain)"))?;
    let characteristic = characteristic
        .map(|c| Characteristic::parse(c).ok_or_else(|| format!("unknown characteristic '{c}'")))
        .transpose()?;

    let mut director = super::open_running(state, None)?;
    let id = super::resolve_participant(super::running(&director)?, participant)?;
    let approval = director
        .submit_intent(&id, kind, characteristic, narrative)
        .map_err(|e| e.to_string())?;

    let name = super::running(&director)?
        .participant(&id)
        .map_or_else(|| id.to_string(), |p| p.actor_name.clone());
    match characteristic {
        Some(c) if kind.requires_characteristic() => {
            println!("  {name}: {kind} ({c}) awaiting approval [{}]", approval.short());
        }
        _ => println!("  {name}: {kind} awaiting approval [{}]", approval.short()),
    }
    Ok(())
}
