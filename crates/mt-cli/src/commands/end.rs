use std::path::Path;

pub fn run(state: &Path) -> Result<(), String> {
    let mut director = super::open_running(state, None)?;
    let title = super::running(&director)?.config().title.clone();
    if director.end_test().is_none() {
        println!("  Ended '{title}' without an outcome");
    }
    Ok(())
}
