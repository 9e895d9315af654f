use clap::Subcommand;
use studydraw_core::{QuestAssignmentManager, SystemClock};

use super::{open_db, resolve_student};

#[derive(Subcommand)]
pub enum QuestAction {
    /// Lock in up to 3 quests for today
    Choose {
        #[arg(long)]
        student: Option<String>,
        /// Quest ids to select
        #[arg(required = true)]
        quest_ids: Vec<String>,
    },
    /// Mark one of today's quests completed
    Complete {
        #[arg(long)]
        student: Option<String>,
        quest_id: String,
    },
    /// Show today's assignment
    Today {
        #[arg(long)]
        student: Option<String>,
    },
    /// List the built-in quest catalog
    Catalog,
}

pub fn run(action: QuestAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let clock = SystemClock;
    let manager = QuestAssignmentManager::new(&db, &clock);

    match action {
        QuestAction::Choose { student, quest_ids } => {
            let uid = resolve_student(student)?;
            let assignment = manager.choose(&uid, &quest_ids)?;
            println!("{}", serde_json::to_string_pretty(&assignment)?);
        }
        QuestAction::Complete { student, quest_id } => {
            let uid = resolve_student(student)?;
            let outcome = manager.complete(&uid, &quest_id)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        QuestAction::Today { student } => {
            let uid = resolve_student(student)?;
            match manager.today_assignment(&uid)? {
                Some(assignment) => {
                    println!("{}", serde_json::to_string_pretty(&assignment)?)
                }
                None => println!("no quests chosen today"),
            }
        }
        QuestAction::Catalog => {
            let catalog = db.default_quests()?;
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
    }
    Ok(())
}
