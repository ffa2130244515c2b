use std::path::Path;

pub fn run(state: &Path, participant: &str) -> Result<(), String> {
    let mut director = super::open_running(state, None)?;
    let id = super::resolve_participant(super::running(&director)?, participant)?;
    director.abstain(&id).map_err(|e| e.to_string())?;

    println!("  {id} sits this round out");
    super::status::print_progress(super::running(&director)?);
    Ok(())
}
