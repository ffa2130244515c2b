use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use colored::Colorize;
use mt_director::{IntentMessage, inbox};

pub fn run(state: &Path, file: Option<&Path>) -> Result<(), String> {
    let reader: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut director = super::open_running(state, None)?;
    let (sender, mut inbox) = inbox::channel();
    let mut senders = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| e.to_string())?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<IntentMessage>(&line) {
            Ok(message) => {
                let IntentMessage::SubmitIntent { actor_id, .. } = &message;
                senders.push(actor_id.clone());
                sender.send(message).map_err(|e| e.to_string())?;
            }
            Err(e) => println!(
                "  {}",
                format!("line {}: skipped malformed message: {e}", number + 1).yellow()
            ),
        }
    }

    let results = director.drain_inbox(&mut inbox);
    for (actor, result) in senders.iter().zip(results) {
        match result {
            Ok(Some(approval)) => println!("  {actor}: accepted [{}]", approval.short()),
            Ok(None) => println!("  {actor}: accepted (abstains)"),
            Err(e) => println!("  {}", format!("{actor}: {e}").yellow()),
        }
    }
    Ok(())
}
