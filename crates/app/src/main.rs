use std::fmt;

use interview_core::model::{
    ActivityAction, Difficulty, JobRole, SessionCategory, SessionStatus, UserId,
};
use serde::Serialize;
use services::ai::AiConfig;
use services::interviews::SessionListRequest;
use services::paging::PageRequest;
use services::{ActivityListRequest, AppServices, Clock};
use storage::query::{SessionSort, SessionSortField, SortOrder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingRequired { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    Invalid { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingRequired { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::Invalid { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
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

fn parse_flag<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let value = require_value(args, flag)?;
    value
        .parse()
        .map_err(|_| ArgsError::Invalid { flag, raw: value })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Analytics,
    Activity,
    Evaluate,
    Questions,
    Sessions,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "analytics" => Some(Self::Analytics),
            "activity" => Some(Self::Activity),
            "evaluate" => Some(Self::Evaluate),
            "questions" => Some(Self::Questions),
            "sessions" => Some(Self::Sessions),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    command: Command,
    db_url: String,
    user_id: UserId,
    role: Option<JobRole>,
    category: Option<SessionCategory>,
    difficulty: Difficulty,
    count: usize,
    question: Option<String>,
    answer: Option<String>,
    status: Option<SessionStatus>,
    action: Option<ActivityAction>,
    search: Option<String>,
    sort: SessionSort,
    page: u64,
    limit: Option<u64>,
}

impl Args {
    fn parse(mut argv: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let first = argv.next().ok_or(ArgsError::MissingRequired {
            flag: "<subcommand>",
        })?;
        if first == "--help" || first == "-h" {
            print_usage();
            std::process::exit(0);
        }
        let command = Command::from_arg(&first).ok_or(ArgsError::UnknownCommand(first))?;

        let mut args = Self {
            command,
            db_url: std::env::var("INTERVIEW_DB_URL")
                .ok()
                .map_or_else(
                    || normalize_sqlite_url("sqlite:dev.sqlite3".into()),
                    normalize_sqlite_url,
                ),
            user_id: std::env::var("INTERVIEW_USER_ID")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .map_or_else(|| UserId::new(1), UserId::new),
            role: None,
            category: None,
            difficulty: Difficulty::Medium,
            count: 5,
            question: None,
            answer: None,
            status: None,
            action: None,
            search: None,
            sort: SessionSort::default(),
            page: 1,
            limit: None,
        };

        while let Some(arg) = argv.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut argv, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::Invalid {
                            flag: "--db",
                            raw: value,
                        });
                    }
                    args.db_url = normalize_sqlite_url(value);
                }
                "--user" => args.user_id = UserId::new(parse_flag(&mut argv, "--user")?),
                "--role" => args.role = Some(parse_flag(&mut argv, "--role")?),
                "--category" => args.category = Some(parse_flag(&mut argv, "--category")?),
                "--difficulty" => args.difficulty = parse_flag(&mut argv, "--difficulty")?,
                "--count" => args.count = parse_flag(&mut argv, "--count")?,
                "--question" => args.question = Some(require_value(&mut argv, "--question")?),
                "--answer" => args.answer = Some(require_value(&mut argv, "--answer")?),
                "--status" => args.status = Some(parse_flag(&mut argv, "--status")?),
                "--action" => args.action = Some(parse_flag(&mut argv, "--action")?),
                "--search" => args.search = Some(require_value(&mut argv, "--search")?),
                "--sort" => args.sort.field = parse_flag::<SessionSortField>(&mut argv, "--sort")?,
                "--order" => args.sort.order = parse_flag::<SortOrder>(&mut argv, "--order")?,
                "--page" => args.page = parse_flag(&mut argv, "--page")?,
                "--limit" => args.limit = Some(parse_flag(&mut argv, "--limit")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(args)
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- analytics [--user <id>]");
    eprintln!("  cargo run -p app -- sessions  [--user <id>] [--role <role>] [--category <cat>]");
    eprintln!("                                [--status <status>] [--search <text>]");
    eprintln!("                                [--sort createdAt|updatedAt|totalScore|duration]");
    eprintln!("                                [--order asc|desc] [--page <n>] [--limit <n>]");
    eprintln!("  cargo run -p app -- activity  [--user <id>] [--action <action>] [--page <n>] [--limit <n>]");
    eprintln!("  cargo run -p app -- evaluate  --question <text> --answer <text> [--role <role>] [--category <cat>]");
    eprintln!("  cargo run -p app -- questions [--role <role>] [--category <cat>] [--difficulty <d>] [--count <n>]");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --user <id>         Acting user (default: 1)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  INTERVIEW_DB_URL, INTERVIEW_USER_ID, RUST_LOG");
    eprintln!("  INTERVIEW_AI_API_KEY, INTERVIEW_AI_BASE_URL, INTERVIEW_AI_MODEL, INTERVIEW_AI_TIMEOUT_SECS");
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::Invalid {
            flag: "--db",
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::Invalid {
            flag: "--db",
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&args.db_url)?;
    let ai = AiConfig::from_env();
    if ai.is_none() {
        tracing::info!("INTERVIEW_AI_API_KEY not set; using heuristic evaluation");
    }
    let services = AppServices::new_sqlite(&args.db_url, Clock::default_clock(), ai).await?;

    let role = args.role.unwrap_or(JobRole::FrontendDeveloper);
    let category = args.category.unwrap_or(SessionCategory::Technical);

    match args.command {
        Command::Analytics => {
            let report = services.analytics().compute_analytics(args.user_id).await?;
            print_json(&report)
        }
        Command::Sessions => {
            let page = services
                .interviews()
                .list(
                    args.user_id,
                    SessionListRequest {
                        role: args.role,
                        category: args.category,
                        status: args.status,
                        search: args.search,
                        sort: args.sort,
                        page: PageRequest::new(args.page, args.limit.unwrap_or(10)),
                    },
                )
                .await?;
            print_json(&page)
        }
        Command::Activity => {
            let defaults = ActivityListRequest::default();
            let limit = args.limit.unwrap_or(defaults.page.limit);
            let log = services
                .activity()
                .list(
                    args.user_id,
                    ActivityListRequest {
                        action: args.action,
                        page: PageRequest::new(args.page, limit),
                        ..defaults
                    },
                )
                .await?;
            print_json(&log)
        }
        Command::Evaluate => {
            let question = args
                .question
                .ok_or(ArgsError::MissingRequired { flag: "--question" })?;
            let answer = args
                .answer
                .ok_or(ArgsError::MissingRequired { flag: "--answer" })?;
            let evaluation = services
                .evaluation()
                .evaluate(&question, &answer, role, category)
                .await;
            print_json(&evaluation)
        }
        Command::Questions => {
            let questions = services
                .evaluation()
                .generate_questions(role, category, args.difficulty, args.count)
                .await;
            print_json(&questions)
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
