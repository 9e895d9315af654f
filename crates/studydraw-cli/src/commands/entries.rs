use clap::Subcommand;
use studydraw_core::{EntryLedger, SystemClock};

use super::{open_db, resolve_student};

#[derive(Subcommand)]
pub enum EntriesAction {
    /// Entry history, newest first
    History {
        #[arg(long)]
        student: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Entries earned in the current ISO week (recomputed from the ledger)
    WeeklyTotal {
        #[arg(long)]
        student: Option<String>,
    },
    /// Recompute the cached counters from the ledger and repair drift
    Reconcile {
        #[arg(long)]
        student: Option<String>,
    },
}

pub fn run(action: EntriesAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let clock = SystemClock;
    let ledger = EntryLedger::new(&db, &clock);

    match action {
        EntriesAction::History { student, limit } => {
            let uid = resolve_student(student)?;
            let entries = ledger.history_of(&uid, limit)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        EntriesAction::WeeklyTotal { student } => {
            let uid = resolve_student(student)?;
            let total = ledger.weekly_total(&uid)?;
            println!("{total}");
        }
        EntriesAction::Reconcile { student } => {
            let uid = resolve_student(student)?;
            let report = ledger.reconcile(&uid)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
