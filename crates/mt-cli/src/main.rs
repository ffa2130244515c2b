//! CLI director for Draw Steel montage tests.

mod commands;
mod host;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "montage",
    about = "Run Draw Steel montage tests from the command line",
    version,
    propagate_version = true
)]
struct Cli {
    /// File holding the running test
    #[arg(short, long, global = true, default_value = "montage.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the success and failure limits for a difficulty and group size
    Limits {
        /// easy, moderate or hard
        difficulty: String,

        /// Number of heroes
        group_size: u32,
    },

    /// Start a new montage test, replacing any running one
    Start {
        /// JSON file with the candidate heroes
        #[arg(long)]
        heroes: PathBuf,

        /// Test title
        #[arg(short, long, default_value = "Montage Test")]
        title: String,

        /// Scene description
        #[arg(long, default_value = "")]
        description: String,

        /// easy, moderate or hard
        #[arg(short, long, default_value = "moderate")]
        difficulty: String,

        /// Show limits to players
        #[arg(long)]
        visible: bool,

        /// Success limit override (needs --failure-limit)
        #[arg(long, requires = "failure_limit")]
        success_limit: Option<u32>,

        /// Failure limit override (needs --success-limit)
        #[arg(long, requires = "success_limit")]
        failure_limit: Option<u32>,

        /// Rounds before time runs out
        #[arg(long)]
        max_rounds: Option<u32>,
    },

    /// Submit an action for a participant
    Submit {
        /// Participant id or name
        participant: String,

        /// test, assist, ability or abstain
        action: String,

        /// Characteristic for tests and assists
        characteristic: Option<String>,

        /// What the hero does
        #[arg(short, long)]
        narrative: Option<String>,
    },

    /// Sit a participant out of the current round
    Abstain {
        /// Participant id or name
        participant: String,
    },

    /// Approve a pending action and resolve it
    Approve {
        /// Approval id prefix, or a participant with one pending approval
        target: String,

        /// Tier the host rolled (1-3) for tests and assists
        #[arg(long)]
        tier: Option<String>,
    },

    /// Reject a pending action
    Reject {
        /// Approval id prefix, or a participant with one pending approval
        target: String,
    },

    /// Show the running test
    Status {
        /// Show the test as this player sees it
        #[arg(long)]
        as_user: Option<String>,
    },

    /// Apply newline-delimited intent messages
    Relay {
        /// Read messages from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// End the running test
    End,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,mt_director=info,mt_cli=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let state = cli.state.as_path();

    let result = match cli.command {
        Commands::Limits {
            difficulty,
            group_size,
        } => commands::limits::run(&difficulty, group_size),
        Commands::Start {
            heroes,
            title,
            description,
            difficulty,
            visible,
            success_limit,
            failure_limit,
            max_rounds,
        } => commands::start::run(
            state,
            &commands::start::StartArgs {
                heroes,
                title,
                description,
                difficulty,
                visible,
                limits: success_limit.zip(failure_limit),
                max_rounds,
            },
        ),
        Commands::Submit {
            participant,
            action,
            characteristic,
            narrative,
        } => commands::submit::run(
            state,
            &participant,
            &action,
            characteristic.as_deref(),
            narrative,
        ),
        Commands::Abstain { participant } => commands::abstain::run(state, &participant),
        Commands::Approve { target, tier } => commands::approve::run(state, &target, tier),
        Commands::Reject { target } => commands::reject::run(state, &target),
        Commands::Status { as_user } => commands::status::run(state, as_user.as_deref()),
        Commands::Relay { file } => commands::relay::run(state, file.as_deref()),
        Commands::End => commands::end::run(state),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
