use std::fmt;

use chrono::{DateTime, Duration, Utc};
use interview_core::insights::summarize;
use interview_core::model::{
    ActivityAction, Difficulty, JobRole, NewActivity, QuestionCategory, QuestionDraft,
    RoleCategory, RoleDefinition, SessionCategory, SessionDraft, SessionStatus, UserId,
};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    sessions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidSessions { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidSessions { raw } => write!(f, "invalid --sessions value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("INTERVIEW_DB_URL")
            .unwrap_or_else(|_| "sqlite://dev.sqlite3?mode=rwc".into());
        let mut user_id = std::env::var("INTERVIEW_USER_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| UserId::new(1), UserId::new);
        let mut sessions = std::env::var("INTERVIEW_SEED_SESSIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(6);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = UserId::new(parsed);
                }
                "--sessions" => {
                    let value = require_value(&mut args, "--sessions")?;
                    sessions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSessions { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            sessions,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://dev.sqlite3?mode=rwc)");
    eprintln!("  --user <id>               Owner of the seeded sessions (default: 1)");
    eprintln!("  --sessions <n>            Number of sample sessions to insert (default: 6)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  INTERVIEW_DB_URL, INTERVIEW_USER_ID, INTERVIEW_SEED_SESSIONS");
}

fn sample_roles() -> Vec<RoleDefinition> {
    let category = |name: &str, prompt: &str| RoleCategory {
        name: name.into(),
        description: None,
        ai_prompt: prompt.into(),
    };
    vec![
        RoleDefinition {
            name: JobRole::FrontendDeveloper.as_str().into(),
            description: "Builds user interfaces for the web".into(),
            categories: vec![
                category(
                    "Technical",
                    "Cover rendering performance, state management and accessibility.",
                ),
                category(
                    "Behavioral",
                    "Ask about collaborating with designers and handling feedback.",
                ),
            ],
            is_active: true,
        },
        RoleDefinition {
            name: JobRole::BackendDeveloper.as_str().into(),
            description: "Designs services, APIs and data stores".into(),
            categories: vec![
                category("Technical", "Cover API design, transactions and caching."),
                category(
                    "System Design",
                    "Ask for capacity estimates before component choices.",
                ),
            ],
            is_active: true,
        },
    ]
}

const SAMPLE_SHAPES: [(JobRole, SessionCategory, [i64; 3]); 4] = [
    (JobRole::FrontendDeveloper, SessionCategory::Technical, [85, 75, 90]),
    (JobRole::BackendDeveloper, SessionCategory::SystemDesign, [55, 60, 48]),
    (JobRole::FrontendDeveloper, SessionCategory::Behavioral, [78, 82, 70]),
    (JobRole::SoftwareEngineer, SessionCategory::Dsa, [92, 88, 95]),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let roles = sample_roles();
    for role in &roles {
        storage.roles.upsert_role(&role.clone().validate()?).await?;
    }

    for i in 0..args.sessions {
        let idx = (i as usize) % SAMPLE_SHAPES.len();
        let (role, category, scores) = SAMPLE_SHAPES[idx];
        let created_at = now - Duration::days(i64::from(i) * 9);

        let mut draft = SessionDraft::new(role, category, 30);
        draft.questions = scores
            .iter()
            .enumerate()
            .map(|(n, score)| QuestionDraft {
                question_text: format!("Sample question {}", n + 1),
                user_answer: "Sample answer".into(),
                score: *score,
                feedback: "Seeded feedback".into(),
                category: QuestionCategory::from(category),
                difficulty: Difficulty::Medium,
            })
            .collect();
        draft.tags = vec!["seed".into()];

        let validated = draft.validate(args.user_id, created_at)?;
        let mut session = storage.sessions.insert_session(validated).await?;
        storage
            .activities
            .append_activity(
                NewActivity::new(args.user_id, session.id(), ActivityAction::Created, created_at)
                    .with_detail("role", role.as_str())
                    .with_detail("category", category.as_str()),
            )
            .await?;

        // Every third session stays in progress.
        if i % 3 != 2 {
            session.set_status(SessionStatus::Completed);
            session.attach_insights(summarize(session.questions()));
            session.touch(created_at + Duration::minutes(30));
            storage.sessions.update_session(&session).await?;
            storage
                .activities
                .append_activity(
                    NewActivity::new(
                        args.user_id,
                        session.id(),
                        ActivityAction::Completed,
                        created_at + Duration::minutes(30),
                    )
                    .with_detail("totalScore", session.total_score()),
                )
                .await?;
        }
    }

    println!(
        "Seeded {} roles and {} sessions for user {} into {}",
        roles.len(),
        args.sessions,
        args.user_id,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
