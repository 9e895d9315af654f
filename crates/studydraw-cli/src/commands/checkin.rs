use clap::Subcommand;
use studydraw_core::{CheckInService, SystemClock};

use super::{open_db, resolve_student};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Save today's mood (1 = rough .. 5 = great)
    Save {
        mood: u8,
        #[arg(long)]
        student: Option<String>,
    },
    /// Show today's check-in
    Today {
        #[arg(long)]
        student: Option<String>,
    },
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let clock = SystemClock;
    let service = CheckInService::new(&db, &clock);

    match action {
        CheckinAction::Save { mood, student } => {
            let uid = resolve_student(student)?;
            let check_in = service.save(&uid, mood)?;
            println!("{}", serde_json::to_string_pretty(&check_in)?);
        }
        CheckinAction::Today { student } => {
            let uid = resolve_student(student)?;
            match service.today(&uid)? {
                Some(check_in) => println!("{}", serde_json::to_string_pretty(&check_in)?),
                None => println!("no check-in yet today"),
            }
        }
    }
    Ok(())
}
