use clap::Subcommand;
use studydraw_core::{Avatar, ProfileService, SystemClock};

use super::{open_db, resolve_parent, resolve_student};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create a student profile (grants the welcome bonus once)
    CreateStudent {
        uid: String,
        #[arg(long, default_value = "Student")]
        name: String,
        /// owl, fox, dragon, cat, robot or astronaut
        #[arg(long, default_value = "owl")]
        avatar: String,
    },
    /// Create a parent profile
    CreateParent {
        uid: String,
        #[arg(long, default_value = "Parent")]
        name: String,
    },
    /// Show a student profile
    Show {
        #[arg(long)]
        student: Option<String>,
    },
    /// List the children linked to a parent
    Children {
        #[arg(long)]
        parent: Option<String>,
    },
    /// Per-day activity for the trailing 7 days
    Activity {
        #[arg(long)]
        student: Option<String>,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let clock = SystemClock;
    let service = ProfileService::new(&db, &clock);

    match action {
        ProfileAction::CreateStudent { uid, name, avatar } => {
            let profile = service.create_student(&uid, &name, Avatar::parse(&avatar))?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        ProfileAction::CreateParent { uid, name } => {
            let profile = service.create_parent(&uid, &name)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        ProfileAction::Show { student } => {
            let uid = resolve_student(student)?;
            match service.student(&uid)? {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => println!("no profile for '{uid}'"),
            }
        }
        ProfileAction::Children { parent } => {
            let uid = resolve_parent(parent)?;
            let children = service.children_of(&uid)?;
            println!("{}", serde_json::to_string_pretty(&children)?);
        }
        ProfileAction::Activity { student } => {
            let uid = resolve_student(student)?;
            let days = service.weekly_activity(&uid)?;
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
    }
    Ok(())
}
