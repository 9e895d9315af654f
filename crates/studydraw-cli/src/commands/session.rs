use clap::Subcommand;
use studydraw_core::{Config, FocusQuality, QuestRef, SessionRecorder, SystemClock};

use super::{open_db, resolve_student};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Record a completed focus session
    Record {
        #[arg(long)]
        student: Option<String>,
        /// 25 or 50; defaults to the configured session length
        #[arg(long)]
        duration: Option<u32>,
        /// fully_focused, mostly_focused or struggled
        #[arg(long, default_value = "mostly_focused")]
        quality: String,
        /// Quest this session was logged against
        #[arg(long)]
        quest_id: Option<String>,
        #[arg(long)]
        quest_title: Option<String>,
    },
    /// Today's sessions, newest first
    Today {
        #[arg(long)]
        student: Option<String>,
    },
}

fn parse_quality(value: &str) -> Result<FocusQuality, Box<dyn std::error::Error>> {
    match value {
        "fully_focused" => Ok(FocusQuality::FullyFocused),
        "mostly_focused" => Ok(FocusQuality::MostlyFocused),
        "struggled" => Ok(FocusQuality::Struggled),
        other => Err(format!(
            "unknown quality '{other}' (expected fully_focused, mostly_focused or struggled)"
        )
        .into()),
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_db()?;
    let clock = SystemClock;
    let recorder = SessionRecorder::new(&db, &clock);

    match action {
        SessionAction::Record {
            student,
            duration,
            quality,
            quest_id,
            quest_title,
        } => {
            let uid = resolve_student(student)?;
            let duration = duration
                .unwrap_or_else(|| Config::load_or_default().session.default_duration);
            let quality = parse_quality(&quality)?;
            let quest = quest_id.map(|id| QuestRef {
                quest_title: quest_title.unwrap_or_else(|| id.clone()),
                quest_id: id,
            });
            let result = recorder.record(&uid, duration, quality, quest)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        SessionAction::Today { student } => {
            let uid = resolve_student(student)?;
            let sessions = recorder.today_sessions(&uid)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
