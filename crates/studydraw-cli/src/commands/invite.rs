use clap::Subcommand;
use studydraw_core::{InviteCodeRegistry, SystemClock};

use super::{open_db, resolve_parent, resolve_student};

#[derive(Subcommand)]
pub enum InviteAction {
    /// Issue a fresh 48-hour code for a parent
    Issue {
        #[arg(long)]
        parent: Option<String>,
    },
    /// Redeem a code on behalf of a student
    Redeem {
        code: String,
        #[arg(long)]
        student: Option<String>,
    },
    /// Remove a parent-child link
    Unlink {
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        child: Option<String>,
    },
}

pub fn run(action: InviteAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let clock = SystemClock;
    let registry = InviteCodeRegistry::new(&db, &clock);

    match action {
        InviteAction::Issue { parent } => {
            let parent = resolve_parent(parent)?;
            let code = registry.issue(&parent)?;
            println!("{}", serde_json::to_string_pretty(&code)?);
        }
        InviteAction::Redeem { code, student } => {
            let uid = resolve_student(student)?;
            let link = registry.redeem(&code, &uid)?;
            println!("{}", serde_json::to_string_pretty(&link)?);
        }
        InviteAction::Unlink { parent, child } => {
            let parent = resolve_parent(parent)?;
            let child = resolve_student(child)?;
            registry.unlink(&parent, &child)?;
            println!("unlinked {child} from {parent}");
        }
    }
    Ok(())
}
