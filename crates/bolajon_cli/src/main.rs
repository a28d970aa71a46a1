//! Command-line probe for the Bolajon core.
//!
//! # Responsibility
//! - Exercise core use-cases against a local database without a client app.
//! - Remember the active learner between runs in the `app_state` table.

use bolajon_core::db::open_db;
use bolajon_core::{
    default_log_level, find_grapheme, init_logging, AttemptRequest, LeaderboardService,
    LearningService, SqliteStateStore, StateStore, UserId, UserService, ValidationError, ALPHABET,
};
use clap::{Parser, Subcommand};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

const ACTIVE_USER_KEY: &str = "active_user_id";

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "bolajon")]
#[command(about = "Uzbek alphabet tutor core probe")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "BOLAJON_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "BOLAJON_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "BOLAJON_LOG_LEVEL")]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print ping and core version
    Ping,
    /// List the alphabet with example words
    Alphabet,
    /// Check whether a transcript counts for a letter
    Check {
        letter: String,
        #[arg(required = true, num_args = 1..)]
        transcript: Vec<String>,
    },
    /// Register a learner and make it active
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
    },
    /// Make an existing learner active
    Use { user_id: Uuid },
    /// Show a learner with progress and achievements
    Profile {
        #[arg(long)]
        user: Option<Uuid>,
    },
    /// Record one attempt for a letter
    Attempt {
        letter: String,
        #[arg(long)]
        accuracy: f64,
        /// What the learner said; drives correctness unless --correct is given
        #[arg(long, default_value = "")]
        transcript: String,
        #[arg(long)]
        correct: Option<bool>,
        #[arg(long)]
        user: Option<Uuid>,
    },
    /// Refresh and print the leaderboard
    Leaderboard {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Delete all progress for a learner
    Reset {
        #[arg(long)]
        user: Option<Uuid>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let json = cli.json;
    match cli.command {
        Command::Ping => {
            println!("bolajon_core ping={}", bolajon_core::ping());
            println!("bolajon_core version={}", bolajon_core::core_version());
            Ok(())
        }
        Command::Alphabet => {
            if json {
                return print_json(&ALPHABET);
            }
            for (index, grapheme) in ALPHABET.iter().enumerate() {
                println!(
                    "{index:>2} {:<3} ({}) {}",
                    grapheme.letter,
                    grapheme.name,
                    grapheme.example_words().join(", ")
                );
            }
            Ok(())
        }
        Command::Check { letter, transcript } => {
            let letter_index = letter_index(&letter)?;
            let matched = LearningService::evaluate(letter_index, &transcript.join(" "))?;
            let verdict = if matched { "match" } else { "no match" };
            emit(json, &matched, || verdict.to_string())
        }
        Command::CreateUser { name, age } => {
            let mut conn = open(cli.db)?;
            let user = UserService::new(&mut conn).create_user(&name, age)?;
            set_active_user(&conn, user.id)?;
            emit(json, &user, || format!("created {} ({})", user.name, user.id))
        }
        Command::Use { user_id } => {
            let mut conn = open(cli.db)?;
            let user = UserService::new(&mut conn)
                .get_user(user_id)?
                .ok_or_else(|| format!("user not found: {user_id}"))?;
            set_active_user(&conn, user.id)?;
            emit(json, &user.id, || format!("active user {}", user.name))
        }
        Command::Profile { user } => {
            let mut conn = open(cli.db)?;
            let user_id = resolve_user(&conn, user)?;
            let profile = UserService::new(&mut conn).get_profile(user_id)?;
            emit(json, &profile, || {
                let achievements = profile
                    .achievements
                    .iter()
                    .map(|achievement| achievement.as_str())
                    .collect::<Vec<_>>();
                format!(
                    "{} level={} stars={} score={} letters_started={} achievements=[{}]",
                    profile.user.name,
                    profile.user.stats.current_level,
                    profile.user.stats.total_stars,
                    profile.user.stats.total_score,
                    profile.progress.len(),
                    achievements.join(", ")
                )
            })
        }
        Command::Attempt {
            letter,
            accuracy,
            transcript,
            correct,
            user,
        } => {
            let mut conn = open(cli.db)?;
            let user_id = resolve_user(&conn, user)?;
            let request = AttemptRequest {
                is_correct: correct,
                ..AttemptRequest::from_transcript(
                    user_id,
                    letter_index(&letter)?,
                    transcript,
                    accuracy,
                )
            };
            let receipt = LearningService::new(&mut conn).record_attempt(&request)?;
            emit(json, &receipt, || {
                format!(
                    "{} correct={} score={} words={}/{} stars={} level={}",
                    receipt.progress.letter,
                    receipt.is_correct,
                    receipt.score,
                    receipt.progress.words_completed,
                    receipt.progress.total_words,
                    receipt.stats.total_stars,
                    receipt.stats.current_level
                )
            })
        }
        Command::Leaderboard { limit } => {
            let mut conn = open(cli.db)?;
            let entries = LeaderboardService::new(&mut conn).refresh(limit)?;
            emit(json, &entries, || {
                entries
                    .iter()
                    .map(|entry| {
                        format!(
                            "{:>3}. {} score={} stars={}",
                            entry.rank, entry.name, entry.score, entry.stars
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Reset { user } => {
            let mut conn = open(cli.db)?;
            let user_id = resolve_user(&conn, user)?;
            let stats = UserService::new(&mut conn).reset_progress(user_id)?;
            emit(json, &stats, || {
                format!(
                    "progress cleared; stars={} score={}",
                    stats.total_stars, stats.total_score
                )
            })
        }
    }
}

fn open(db: Option<PathBuf>) -> CliResult<Connection> {
    let path = db.unwrap_or_else(|| std::env::temp_dir().join("bolajon.sqlite3"));
    info!("event=cli_open module=cli status=start");
    Ok(open_db(path)?)
}

fn letter_index(letter: &str) -> CliResult<u32> {
    let (index, _) =
        find_grapheme(letter).ok_or_else(|| ValidationError::UnknownLetter(letter.to_string()))?;
    Ok(u32::try_from(index)?)
}

fn set_active_user(conn: &Connection, user_id: UserId) -> CliResult<()> {
    SqliteStateStore::new(conn).set(ACTIVE_USER_KEY, &user_id.to_string())?;
    Ok(())
}

fn resolve_user(conn: &Connection, explicit: Option<Uuid>) -> CliResult<UserId> {
    if let Some(user_id) = explicit {
        return Ok(user_id);
    }
    let stored = SqliteStateStore::new(conn)
        .get(ACTIVE_USER_KEY)?
        .ok_or("no active user; run `create-user` or `use` first")?;
    Ok(Uuid::parse_str(&stored)?)
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> CliResult<()> {
    if json {
        return print_json(value);
    }
    println!("{}", text());
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
