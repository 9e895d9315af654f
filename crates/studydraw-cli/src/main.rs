use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studydraw-cli", version, about = "Studydraw CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Student and parent profiles
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Focus session recording
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Prize entry ledger
    Entries {
        #[command(subcommand)]
        action: commands::entries::EntriesAction,
    },
    /// Daily quests
    Quest {
        #[command(subcommand)]
        action: commands::quest::QuestAction,
    },
    /// Parent effort boosts
    Boost {
        #[command(subcommand)]
        action: commands::boost::BoostAction,
    },
    /// Parent-child invite codes
    Invite {
        #[command(subcommand)]
        action: commands::invite::InviteAction,
    },
    /// Daily mood check-in
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Entries { action } => commands::entries::run(action),
        Commands::Quest { action } => commands::quest::run(action),
        Commands::Boost { action } => commands::boost::run(action),
        Commands::Invite { action } => commands::invite::run(action),
        Commands::Checkin { action } => commands::checkin::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
