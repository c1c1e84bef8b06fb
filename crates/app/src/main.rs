use std::fmt;

use bula_core::model::{GameKey, ITEMS_PER_LEVEL, LevelKey, LevelState, Stars};
use chrono::{DateTime, Utc};
use services::{AppServices, Clock, ProgressStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn parse_value<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidValue { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  bulabooks summary [--db <sqlite_url>]");
    eprintln!("  bulabooks resume  --game <game> [--db <sqlite_url>]");
    eprintln!(
        "  bulabooks record  --game <game> --level <1-3> --item <0-4> --stars <0-3> [--failed]"
    );
    eprintln!("  bulabooks skip    --game <game> --level <1-3> --item <0-4>");
    eprintln!("  bulabooks reset   [--db <sqlite_url>]");
    eprintln!("  bulabooks seed    [--now <rfc3339>] [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Games: wordHunt, readAloud, fillBlank, wordBuilder");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://bulabooks.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BULA_DB_URL, BULA_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Summary,
    Resume,
    Record,
    Skip,
    Reset,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "summary" => Some(Self::Summary),
            "resume" => Some(Self::Resume),
            "record" => Some(Self::Record),
            "skip" => Some(Self::Skip),
            "reset" => Some(Self::Reset),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

/// Flags shared by every subcommand; each command checks the ones it needs.
#[derive(Debug, Default)]
struct Args {
    db_url: String,
    game: Option<GameKey>,
    level: Option<LevelKey>,
    item: Option<usize>,
    stars: Option<Stars>,
    failed: bool,
    now: Option<DateTime<Utc>>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("BULA_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://bulabooks.sqlite3".into(), normalize_sqlite_url),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--game" => {
                    parsed.game = Some(parse_value("--game", require_value(args, "--game")?)?);
                }
                "--level" => {
                    parsed.level = Some(parse_value("--level", require_value(args, "--level")?)?);
                }
                "--item" => {
                    let raw = require_value(args, "--item")?;
                    let item: usize = parse_value("--item", raw.clone())?;
                    if item >= ITEMS_PER_LEVEL {
                        return Err(ArgsError::InvalidValue { flag: "--item", raw });
                    }
                    parsed.item = Some(item);
                }
                "--stars" => {
                    let raw = require_value(args, "--stars")?;
                    let value: u8 = parse_value("--stars", raw.clone())?;
                    let stars = Stars::new(value)
                        .map_err(|_| ArgsError::InvalidValue { flag: "--stars", raw })?;
                    parsed.stars = Some(stars);
                }
                "--failed" => parsed.failed = true,
                "--now" => {
                    let raw = require_value(args, "--now")?;
                    let at = DateTime::parse_from_rfc3339(&raw)
                        .map_err(|_| ArgsError::InvalidValue { flag: "--now", raw })?;
                    parsed.now = Some(at.with_timezone(&Utc));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn game(&self) -> Result<GameKey, ArgsError> {
        self.game.ok_or(ArgsError::MissingFlag { flag: "--game" })
    }

    fn slot(&self) -> Result<(GameKey, LevelKey, usize), ArgsError> {
        let level = self.level.ok_or(ArgsError::MissingFlag { flag: "--level" })?;
        let item = self.item.ok_or(ArgsError::MissingFlag { flag: "--item" })?;
        Ok((self.game()?, level, item))
    }

    fn clock(&self) -> Clock {
        self.now.map_or_else(Clock::default_clock, Clock::fixed)
    }
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

fn state_label(state: LevelState) -> &'static str {
    match state {
        LevelState::NotStarted => "not started",
        LevelState::InProgress => "in progress",
        LevelState::Completed => "completed",
    }
}

async fn print_summary(services: &AppServices) {
    let progress = services.progress();
    let overview = progress.overview();

    println!(
        "language: {}  tutorial: {}",
        services.preferences().language().await,
        if services.preferences().tutorial_completed().await {
            "done"
        } else {
            "pending"
        }
    );
    println!();

    for (game, summary) in &overview.games {
        println!(
            "{:<12} {:>2}/{} items  {:>2} stars  {:>3}%",
            game.as_str(),
            summary.completed_items,
            summary.total_items,
            summary.total_stars,
            summary.percentage
        );
        for level in LevelKey::ALL {
            let level_summary = progress.level_summary(*game, level);
            let mut line = format!(
                "  level {level}: {:<11} {:>2}/{} stars",
                state_label(progress.level_state(*game, level)),
                level_summary.stars,
                level_summary.max_stars
            );
            if let Some(spent) = level_summary.time_spent {
                line.push_str(&format!("  {}s", spent.num_seconds()));
            }
            println!("{line}");
        }
    }

    println!();
    println!(
        "total stars: {}  average: {}%",
        overview.total_stars, overview.average_percentage
    );
}

/// Play through a believable spread of progress for demos.
async fn seed(progress: &mut ProgressStore) -> Result<(), Box<dyn std::error::Error>> {
    let plan: [(GameKey, usize, [u8; ITEMS_PER_LEVEL]); 4] = [
        (GameKey::WordHunt, 2, [3, 3, 2, 3, 1]),
        (GameKey::ReadAloud, 1, [2, 3, 3, 1, 2]),
        (GameKey::FillBlank, 1, [3, 2, 2, 3, 3]),
        (GameKey::WordBuilder, 0, [1, 2, 0, 0, 0]),
    ];

    for (game, full_levels, stars) in plan {
        for level in LevelKey::ALL.into_iter().take(full_levels) {
            for (idx, value) in stars.into_iter().enumerate() {
                progress
                    .record_answer(game, level, idx, Stars::new(value)?, value > 0)
                    .await?;
            }
        }
        if let Some(next) = LevelKey::ALL.get(full_levels) {
            for (idx, value) in stars.into_iter().take(2).enumerate() {
                progress
                    .record_answer(game, *next, idx, Stars::new(value)?, value > 0)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand shows the dashboard.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Summary,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Summary,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            print_usage();
            ArgsError::UnknownCommand(first.to_string())
        })?,
    };

    if argv.first().is_some_and(|arg| !arg.starts_with("--")) {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let mut services = AppServices::new_sqlite(&parsed.db_url, parsed.clock()).await?;
    info!(db = %parsed.db_url, ?cmd, "storage ready");

    match cmd {
        Command::Summary => print_summary(&services).await,
        Command::Resume => {
            let game = parsed.game()?;
            let position = services.progress().resume_position(game);
            println!("{game}: level {}, item {}", position.level, position.item);
        }
        Command::Record => {
            let (game, level, item) = parsed.slot()?;
            let stars = parsed
                .stars
                .ok_or(ArgsError::MissingFlag { flag: "--stars" })?;
            let record = services
                .progress_mut()
                .record_answer(game, level, item, stars, !parsed.failed)
                .await?;
            println!(
                "{game} level {level} item {item}: {} stars (attempt {}), level {}",
                record.item.stars(),
                record.item.attempts(),
                state_label(record.level_state)
            );
        }
        Command::Skip => {
            let (game, level, item) = parsed.slot()?;
            let record = services
                .progress_mut()
                .skip_item(game, level, item)
                .await?;
            println!(
                "{game} level {level} item {item}: skipped, level {}",
                state_label(record.level_state)
            );
        }
        Command::Reset => {
            services.progress_mut().reset().await;
            services.preferences().reset_tutorial().await;
            println!("progress cleared");
        }
        Command::Seed => {
            seed(services.progress_mut()).await?;
            services.preferences().complete_tutorial().await;
            print_summary(&services).await;
        }
    }

    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
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

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("BULA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
