use clap::Subcommand;
use studydraw_core::{BoostRateLimiter, SystemClock};

use super::{open_db, resolve_parent, resolve_student};

#[derive(Subcommand)]
pub enum BoostAction {
    /// Grant 1-3 bonus entries to a linked child
    Grant {
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        child: Option<String>,
        #[arg(long, default_value_t = 1)]
        count: u32,
        #[arg(long)]
        note: Option<String>,
    },
    /// Boosts already given this ISO week
    Count {
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        child: Option<String>,
    },
    /// Boost history for a (parent, child) pair
    History {
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        child: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

pub fn run(action: BoostAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let clock = SystemClock;
    let limiter = BoostRateLimiter::new(&db, &clock);

    match action {
        BoostAction::Grant {
            parent,
            child,
            count,
            note,
        } => {
            let parent = resolve_parent(parent)?;
            let child = resolve_student(child)?;
            let grant = limiter.grant(&parent, &child, count, note.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&grant)?);
        }
        BoostAction::Count { parent, child } => {
            let parent = resolve_parent(parent)?;
            let child = resolve_student(child)?;
            println!("{}", limiter.count_this_week(&parent, &child)?);
        }
        BoostAction::History {
            parent,
            child,
            limit,
        } => {
            let parent = resolve_parent(parent)?;
            let child = resolve_student(child)?;
            let boosts = limiter.history(&parent, &child, limit)?;
            println!("{}", serde_json::to_string_pretty(&boosts)?);
        }
    }
    Ok(())
}
