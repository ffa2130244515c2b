use mt_core::{Difficulty, compute_limits};

pub fn run(difficulty: &str, group_size: u32) -> Result<(), String> {
    let difficulty = Difficulty::parse(difficulty)
        .ok_or_else(|| format!("unknown difficulty '{difficulty}' (easy, moderate, hard)"))?;
    let limits = compute_limits(difficulty, group_size);

    println!("  {difficulty} montage for {group_size} heroes");
    println!("  Success limit: {}", limits.success_limit);
    println!("  Failure limit: {}", limits.failure_limit);
    Ok(())
}
