//! Lexicard CLI
//!
//! Terminal host for the scheduling engine: keeps one JSON deck per learner
//! and runs reading-practice sessions on stdin/stdout.

mod store;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use directories::ProjectDirs;
use lexicard_core::{
    catalog, effective_grade, rank, select_upcoming, Grade, Item, LearnerProgress, LexicardConfig,
    RawSignal, ReviewSession, ScheduleSink, Scheduler, SchedulerError, SessionError,
    TracingObserver,
};
use tracing_subscriber::EnvFilter;

use crate::store::DeckStore;

/// Lexicard - spaced repetition for reading practice
#[derive(Parser)]
#[command(name = "lexicard")]
#[command(author = "Lexicard Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spaced repetition reading practice")]
#[command(long_about = "Lexicard schedules word-reading practice with FSRS-6.\n\nOverdue words come first, then new words in list order. A correct answer given within the fast-answer window counts as Easy.")]
struct Cli {
    /// Directory holding the learner deck files
    #[arg(long, global = true, env = "LEXICARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a learner's deck from a word list
    Init {
        learner: String,
        /// Word list: one word per line, or a JSON array of strings
        words: PathBuf,
        /// Replace an existing deck
        #[arg(long)]
        force: bool,
    },

    /// Show the next item to study (introduces a new word if nothing is due)
    Next { learner: String },

    /// Grade one item
    Grade {
        learner: String,
        item_id: String,
        /// correct, incorrect, or a grade (1-4, again/hard/good/easy)
        signal: String,
        /// Seconds the learner took to answer
        #[arg(long)]
        elapsed: Option<f64>,
    },

    /// Show what each grade would do to an item
    Preview { learner: String, item_id: String },

    /// List the items coming up next
    Upcoming {
        learner: String,
        /// Due items to show
        #[arg(long, default_value = "3")]
        due: usize,
        /// New items to show
        #[arg(long, default_value = "2")]
        new: usize,
    },

    /// Study interactively until nothing is due
    Study {
        learner: String,
        /// Stop after this many reviews
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show progress, ranked by share of the catalog reviewed
    Stats {
        /// Only this learner
        learner: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs to stderr; stdout is for the learner
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let store = DeckStore::open(resolve_data_dir(cli.data_dir)?)?;
    tracing::debug!(dir = %store.dir().display(), "Using deck directory");

    match cli.command {
        Commands::Init { learner, words, force } => run_init(&store, &learner, &words, force),
        Commands::Next { learner } => run_next(&store, &config, &learner),
        Commands::Grade {
            learner,
            item_id,
            signal,
            elapsed,
        } => run_grade(&store, &config, &learner, &item_id, &signal, elapsed),
        Commands::Preview { learner, item_id } => run_preview(&store, &config, &learner, &item_id),
        Commands::Upcoming { learner, due, new } => run_upcoming(&store, &learner, due, new),
        Commands::Study { learner, limit } => run_study(&store, &config, &learner, limit),
        Commands::Stats { learner } => run_stats(&store, &config, learner.as_deref()),
    }
}

/// Config file (explicit, or `config.json` in the platform config dir) plus env overrides
fn load_config(explicit: Option<&Path>) -> anyhow::Result<LexicardConfig> {
    let default_path = ProjectDirs::from("com", "lexicard", "lexicard")
        .map(|dirs| dirs.config_dir().join("config.json"))
        .filter(|path| path.exists());

    let mut config = match explicit.map(Path::to_path_buf).or(default_path) {
        Some(path) => LexicardConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LexicardConfig::default(),
    };
    config.apply_env(|var| std::env::var(var).ok())?;
    Ok(config)
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let dirs = ProjectDirs::from("com", "lexicard", "lexicard")
        .ok_or_else(|| anyhow!("Could not determine project directories; pass --data-dir"))?;
    Ok(dirs.data_dir().join("decks"))
}

fn scheduler(config: &LexicardConfig) -> anyhow::Result<Scheduler> {
    Ok(Scheduler::new(config.scheduler.clone())?)
}

/// Run init command
fn run_init(store: &DeckStore, learner: &str, words: &Path, force: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(words)
        .with_context(|| format!("Failed to read word list {}", words.display()))?;
    let items = catalog::initialize(parse_word_list(&text)?);
    if items.is_empty() {
        bail!("Word list {} contains no words", words.display());
    }

    let deck = store.create(learner, items, force, Utc::now())?;

    println!(
        "{} {} with {} words",
        "Created deck for".green(),
        learner.bold(),
        deck.items.len()
    );
    Ok(())
}

/// A JSON array of strings, or plain text with one word per line
fn parse_word_list(text: &str) -> anyhow::Result<Vec<String>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).context("Word list looks like JSON but is not an array of strings");
    }
    Ok(text.lines().map(str::to_string).collect())
}

/// Run next command
fn run_next(store: &DeckStore, config: &LexicardConfig, learner: &str) -> anyhow::Result<()> {
    let now = Utc::now();
    let mut session = ReviewSession::open(
        learner,
        store,
        store,
        TracingObserver,
        scheduler(config)?,
        config.session.clone(),
        now,
    )?;

    match session.next(now)? {
        Some(item) => print_item(item, now),
        None => println!("{}", "Nothing due right now.".dimmed()),
    }
    Ok(())
}

/// Run grade command
fn run_grade(
    store: &DeckStore,
    config: &LexicardConfig,
    learner: &str,
    item_id: &str,
    signal: &str,
    elapsed: Option<f64>,
) -> anyhow::Result<()> {
    let raw = parse_signal(signal)?;
    let now = Utc::now();
    let item = find_item(store, learner, item_id)?;

    // Without a measured time the answer is never treated as instant
    let grade = match elapsed {
        Some(secs) => effective_grade(
            raw,
            response_time(secs)?,
            config.session.fast_answer_threshold(),
        ),
        None => raw.base_grade(),
    };

    let reviewed = scheduler(config)?.review_item(&item, grade, now)?;
    store.persist(learner, &reviewed.to_update())?;

    println!(
        "{} {} as {}",
        "Graded".green(),
        reviewed.content.bold(),
        grade_label(grade)
    );
    print_item(&reviewed, now);
    if reviewed.consecutive_lapse_count >= config.session.problem_item_threshold {
        println!(
            "  {} missed {} times in a row",
            "!".yellow().bold(),
            reviewed.consecutive_lapse_count
        );
    }
    Ok(())
}

/// Run preview command
fn run_preview(
    store: &DeckStore,
    config: &LexicardConfig,
    learner: &str,
    item_id: &str,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let item = find_item(store, learner, item_id)?;
    let preview = scheduler(config)?.preview(&item.schedule, now)?;

    println!("{}", format!("=== Preview: {} ===", item.content).cyan().bold());
    for grade in Grade::ALL {
        let outcome = preview.get(grade);
        println!(
            "  {} {:>6}  {:<10}  due {:<12}  stability {:>8.2}  difficulty {:>5.2}",
            grade.as_i32().to_string().dimmed(),
            grade_label(grade),
            outcome.state.to_string(),
            describe_due(outcome.due, now),
            outcome.stability,
            outcome.difficulty
        );
    }
    Ok(())
}

/// Run upcoming command
fn run_upcoming(store: &DeckStore, learner: &str, due: usize, new: usize) -> anyhow::Result<()> {
    let now = Utc::now();
    let items = store.read(learner)?.items;
    let upcoming = select_upcoming(&items, &[], now, due, new);

    if upcoming.is_empty() {
        println!("{}", "Nothing coming up.".dimmed());
    }
    for item in upcoming {
        print_item(item, now);
    }
    Ok(())
}

/// Run study command
fn run_study(
    store: &DeckStore,
    config: &LexicardConfig,
    learner: &str,
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let mut session = ReviewSession::open(
        learner,
        store,
        store,
        TracingObserver,
        scheduler(config)?,
        config.session.clone(),
        Utc::now(),
    )?;

    for item in session.corrupt_items() {
        println!(
            "  {} {} has a damaged schedule and will be reset when shown",
            "!".yellow().bold(),
            item.id
        );
    }

    println!("{}", format!("=== Studying: {} ===", learner).cyan().bold());
    println!("{}", "Answer y (correct), n (incorrect), 1-4 or again/hard/good/easy; q to stop.".dimmed());
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if limit.is_some_and(|limit| session.summary().reviewed >= limit) {
            break;
        }

        let Some(item) = session.next(Utc::now())? else {
            println!("{}", "Nothing due right now.".dimmed());
            break;
        };
        let item_id = item.id.clone();
        print!("  {}  > ", item.content.bold());
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            break;
        }
        let raw = match parse_signal(answer) {
            Ok(raw) => raw,
            Err(e) => {
                println!("  {}", e.to_string().red());
                continue;
            }
        };

        match session.grade(raw, Utc::now()) {
            Ok(outcome) => {
                println!(
                    "    {} in {:.1}s, next {}",
                    grade_label(outcome.grade),
                    outcome.response_time.num_milliseconds() as f64 / 1000.0,
                    describe_due(outcome.item.schedule.due, Utc::now())
                );
                if outcome.problem_item {
                    println!("    {} this word keeps slipping", "!".yellow().bold());
                }
            }
            Err(SessionError::Scheduler(SchedulerError::InvalidSchedule(reason))) => {
                println!("    {} {}: resetting", "!".yellow().bold(), reason);
                session.repair(&item_id)?;
            }
            Err(SessionError::Store(e)) => {
                // The answer was not recorded; the same word is shown again
                println!("    {} could not save ({}), try again", "!".red().bold(), e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let summary = session.finish(Utc::now());
    println!();
    println!("{}", "=== Session Summary ===".cyan().bold());
    println!("{}: {}", "Reviewed".white().bold(), summary.reviewed);
    println!("{}: {}", "New Words".white().bold(), summary.introduced);
    println!(
        "{}: again {}, hard {}, good {}, easy {}",
        "Grades".white().bold(),
        summary.again,
        summary.hard,
        summary.good,
        summary.easy
    );
    Ok(())
}

/// Run stats command
fn run_stats(store: &DeckStore, config: &LexicardConfig, learner: Option<&str>) -> anyhow::Result<()> {
    let now = Utc::now();
    let learners = match learner {
        Some(learner) => vec![learner.to_string()],
        None => store.learners()?,
    };
    if learners.is_empty() {
        println!("{}", "No decks found.".dimmed());
        return Ok(());
    }

    let mut reports = Vec::with_capacity(learners.len());
    for learner in &learners {
        let deck = store.read(learner)?;
        reports.push(LearnerProgress::from_items(
            learner.as_str(),
            &deck.items,
            config.progress.mastery_threshold,
            now,
        ));
    }

    println!("{}", "=== Lexicard Progress ===".cyan().bold());
    println!();
    for (position, report) in rank(reports).iter().enumerate() {
        println!(
            "{:>3}. {}  {}/{} reviewed, {} mastered, {} due",
            position + 1,
            report.learner.white().bold(),
            report.reviewed,
            report.total,
            report.mastered,
            report.due
        );
        print_progress_bar("Reviewed", report.percent);
        print_progress_bar("Mastered", report.mastered_percent());
    }
    Ok(())
}

fn find_item(store: &DeckStore, learner: &str, item_id: &str) -> anyhow::Result<Item> {
    store
        .read(learner)?
        .items
        .into_iter()
        .find(|item| item.id == item_id)
        .ok_or_else(|| anyhow!("No item '{item_id}' in {learner}'s deck"))
}

/// y/n shorthand, correct/incorrect, or an explicit grade
fn parse_signal(input: &str) -> anyhow::Result<RawSignal> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "correct" => Ok(RawSignal::Correct),
        "n" | "no" | "incorrect" => Ok(RawSignal::Incorrect),
        other => Ok(RawSignal::Explicit(other.parse::<Grade>()?)),
    }
}

/// Parse `--elapsed` seconds, up to one day
fn response_time(secs: f64) -> anyhow::Result<Duration> {
    if !(0.0..=86_400.0).contains(&secs) {
        bail!("Invalid --elapsed value: {secs} (expected 0 to 86400 seconds)");
    }
    Duration::try_milliseconds((secs * 1000.0).round() as i64)
        .ok_or_else(|| anyhow!("Invalid --elapsed value: {secs}"))
}

fn grade_label(grade: Grade) -> colored::ColoredString {
    match grade {
        Grade::Again => grade.as_str().red(),
        Grade::Hard => grade.as_str().yellow(),
        Grade::Good => grade.as_str().green(),
        Grade::Easy => grade.as_str().cyan(),
    }
}

fn print_item(item: &Item, now: DateTime<Utc>) {
    println!(
        "  {}  {:<20} {:<10} {}",
        item.id.dimmed(),
        item.content.bold(),
        item.schedule.state.to_string(),
        describe_due(item.schedule.due, now)
    );
}

/// "now", "in 10m", "in 3d", or "unscheduled"
fn describe_due(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(due) = due else {
        return "unscheduled".to_string();
    };
    let wait = due - now;
    if wait <= Duration::zero() {
        "now".to_string()
    } else if wait < Duration::hours(1) {
        format!("in {}m", wait.num_minutes().max(1))
    } else if wait < Duration::days(1) {
        format!("in {}h", wait.num_hours())
    } else {
        format!("in {}d", wait.num_days())
    }
}

/// Print a progress bar
fn print_progress_bar(label: &str, percentage: f64) {
    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));

    println!("       {:10} [{}] {:>5.1}%", label, bar.green(), percentage);
}
