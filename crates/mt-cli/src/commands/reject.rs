use std::path::Path;

pub fn run(state: &Path, target: &str) -> Result<(), String> {
    let mut director = super::open_running(state, None)?;
    let id = super::resolve_approval(super::running(&director)?, target)?;
    if !director.reject(id) {
        return Err(format!("approval {} is no longer pending", id.short()));
    }
    println!("  Rejected [{}]; the hero may choose again", id.short());
    Ok(())
}
