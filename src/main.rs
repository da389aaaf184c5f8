//! # Madriguera
//!
//! A household chore tracker for the terminal. Tasks repeat daily, on chosen
//! weekdays, on a day of the month, or happen once. Completing a recurring
//! task only counts for its current day, week or month, so nothing needs to
//! be reset at midnight.
//!
//! ## Usage
//!
//! Run without arguments to open the dashboard:
//!
//! ```bash
//! madriguera
//! # or explicitly
//! madriguera ui
//! ```
//!
//! #### Dashboard key bindings
//! *   `Tab` / `v`: Next view (Today, Week, Month, Upcoming, Shopping)
//! *   `Space`: Toggle done
//! *   `a`: Add task
//! *   `n`: Rename task
//! *   `d`: Delete task
//! *   `q`: Quit
//!
//! ### Command line
//!
//! ```bash
//! madriguera add "Sacar a Kali" --recur daily --note "mínimo 20 min"
//! madriguera add "Limpiar baño" --recur weekly --days lun,jue
//! madriguera add "Pagar expensas" --recur monthly --day 10 --assign Delfi
//! madriguera add "Llamar al plomero" --due 2026-10-20
//!
//! madriguera today
//! madriguera week
//! madriguera complete 2
//! madriguera activity
//! ```
//!
//! ### Shopping list
//!
//! ```bash
//! madriguera place add Coto --emoji 🛒 --color blue
//! madriguera place note 1 "Los martes descuento en carne"
//! madriguera item add Huevos --place coto,feria --qty "1 docena"
//! madriguera item toggle 3
//! madriguera item list --place 1
//! madriguera item clear 1
//! ```
//!
//! ## Data
//!
//! Set `data_dir` in `<config dir>/madriguera/config.toml` (or the
//! `MADRIGUERA_DATA_DIR` environment variable) to keep tasks in
//! `tasks.json` and `activity.json`. Without it the app runs on demo data
//! that is never written to disk.

use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use madriguera::commands::*;
use madriguera::config::{Config, LoggingConfig};
use madriguera::locale::parse_weekdays;
use madriguera::models::{Assignee, PlaceColor, Recurrence};
use madriguera::shopping::*;
use madriguera::tui::run_tui;

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser)]
#[command(name = "madriguera")]
#[command(about = "Household chore tracker", long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// Recurrence (once, daily, weekly, monthly)
        #[arg(short, long, default_value = "once")]
        recur: Recurrence,
        /// Weekdays for weekly tasks, e.g. "lun,jue" or "1,4"
        #[arg(long)]
        days: Option<String>,
        /// Day of the month for monthly tasks (1-31)
        #[arg(long)]
        day: Option<u32>,
        /// Due date for one-off tasks in YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
        /// Person the task is assigned to (default: both)
        #[arg(short, long)]
        assign: Option<String>,
        /// Free text note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Edit a task
    Edit {
        id: u64,
        /// New task name
        #[arg(long)]
        name: Option<String>,
        /// New recurrence
        #[arg(short, long)]
        recur: Option<Recurrence>,
        /// New weekdays
        #[arg(long)]
        days: Option<String>,
        /// New day of the month
        #[arg(long)]
        day: Option<u32>,
        /// New due date
        #[arg(short, long)]
        due: Option<String>,
        /// New assignee
        #[arg(short, long)]
        assign: Option<String>,
        /// New note (empty string clears it)
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Mark a task as done
    Complete {
        id: u64,
    },
    /// Mark a task as pending again
    Undo {
        id: u64,
    },
    /// Remove a task
    Remove {
        id: u64,
    },
    /// Tasks due today
    Today,
    /// Weekly tasks and their next day
    Week,
    /// Monthly tasks by day of month
    Month,
    /// One-off tasks dated after today
    Upcoming,
    /// All tasks with their schedule
    List,
    /// Recent household activity
    Activity,
    /// Manage shopping places
    Place {
        #[command(subcommand)]
        action: PlaceAction,
    },
    /// Manage the shopping list
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive dashboard
    Ui,
}

#[derive(Subcommand)]
enum PlaceAction {
    /// Add a place
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        emoji: String,
        /// blue, green, amber, gray or red
        #[arg(short, long, default_value = "blue")]
        color: PlaceColor,
    },
    /// Rename or restyle a place
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        emoji: Option<String>,
        #[arg(short, long)]
        color: Option<PlaceColor>,
    },
    /// Replace the note of a place (empty string clears it)
    Note {
        id: u64,
        note: String,
    },
    /// Remove a place and every item listed at it
    Remove {
        id: u64,
    },
    /// List places
    List,
}

#[derive(Subcommand)]
enum ItemAction {
    /// Add an item to the list
    Add {
        name: String,
        /// Place ids or names, comma separated, e.g. "coto,2"
        #[arg(short, long)]
        place: String,
        /// Quantity with an optional unit, e.g. "2 kg"
        #[arg(short, long)]
        qty: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Check an item off, or put it back on the list
    Toggle {
        id: u64,
    },
    /// Remove an item
    Remove {
        id: u64,
    },
    /// Show the list, optionally for one place
    List {
        /// Place id or name
        #[arg(short, long)]
        place: Option<String>,
    },
    /// Remove the checked-off items of a place
    Clear {
        /// Place id or name
        place: String,
    },
}

/// Resolves a single place given by id or name.
fn resolve_place(session: &Session, key: &str) -> anyhow::Result<u64> {
    session
        .store
        .find_place(key)
        .map(|p| p.id)
        .ok_or_else(|| anyhow::anyhow!("unknown place '{}'", key))
}

fn init_tracing(logging: &LoggingConfig, console: bool) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(&logging.level).context("invalid logging.level")?,
    };

    let mut maybe_writer = None;
    if logging.file {
        let dir = logging
            .directory
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("madriguera"));
        std::fs::create_dir_all(&dir).with_context(|| format!("create log dir {}", dir.display()))?;
        let appender = tracing_appender::rolling::never(dir, "madriguera.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    let console_layer = console.then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));
    let file_layer = maybe_writer.map(|w| tracing_subscriber::fmt::layer().with_writer(w).with_ansi(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}

fn parse_days(days: Option<String>) -> anyhow::Result<Option<Vec<u8>>> {
    days.map(|d| parse_weekdays(&d)).transpose().map_err(Into::into)
}

fn parse_due(due: Option<String>) -> anyhow::Result<Option<chrono::NaiveDate>> {
    due.map(|d| parse_due_date(&d)).transpose().map_err(Into::into)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;

    let dashboard = matches!(cli.command, None | Some(Commands::Ui));
    init_tracing(&config.logging, !dashboard)?;

    if let Some(Commands::Completions { shell }) = &cli.command {
        let shell_enum = match shell.as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" => Shell::PowerShell,
            "elvish" => Shell::Elvish,
            _ => anyhow::bail!("Unsupported shell: {}", shell),
        };
        let mut cmd = Cli::command();
        generate(shell_enum, &mut cmd, "madriguera", &mut io::stdout());
        return Ok(());
    }

    let now = Local::now();
    let mut session = Session::open(&config, &now).context("failed to open task store")?;

    match cli.command {
        Some(Commands::Add { name, recur, days, day, due, assign, note }) => {
            let mut draft = TaskDraft::new(name, recur);
            draft.days = parse_days(days)?.unwrap_or_default();
            draft.day_of_month = day;
            draft.due_date = parse_due(due)?;
            draft.assigned_to = assign.map(Assignee::from).unwrap_or_default();
            draft.note = note;
            cmd_add(&mut session, draft, &now, false)?;
        }
        Some(Commands::Edit { id, name, recur, days, day, due, assign, note }) => {
            let edit = TaskEdit {
                name,
                recurrence: recur,
                days: parse_days(days)?,
                day_of_month: day,
                due_date: parse_due(due)?,
                assigned_to: assign.map(Assignee::from),
                note,
            };
            cmd_edit(&mut session, id, edit, &now, false)?;
        }
        Some(Commands::Complete { id }) => { cmd_complete(&mut session, id, &now, false)?; }
        Some(Commands::Undo { id }) => { cmd_uncomplete(&mut session, id, &now, false)?; }
        Some(Commands::Remove { id }) => { cmd_remove(&mut session, id, &now, false)?; }
        Some(Commands::Today) => cmd_today(&session, &now),
        Some(Commands::Week) => cmd_week(&session, &now),
        Some(Commands::Month) => cmd_month(&session, &now),
        Some(Commands::Upcoming) => cmd_upcoming(&session, &now),
        Some(Commands::List) => cmd_list(&session, &now),
        Some(Commands::Activity) => cmd_activity(&session, &now),
        Some(Commands::Place { action }) => match action {
            PlaceAction::Add { name, emoji, color } => {
                let draft = PlaceDraft { name, emoji, color };
                cmd_place_add(&mut session, draft, &now, false)?;
            }
            PlaceAction::Edit { id, name, emoji, color } => {
                cmd_place_edit(&mut session, id, PlaceEdit { name, emoji, color }, false)?;
            }
            PlaceAction::Note { id, note } => { cmd_place_note(&mut session, id, &note, &now, false)?; }
            PlaceAction::Remove { id } => { cmd_place_remove(&mut session, id, false)?; }
            PlaceAction::List => cmd_places(&session),
        },
        Some(Commands::Item { action }) => match action {
            ItemAction::Add { name, place, qty, note } => {
                let mut draft = ItemDraft::new(name, parse_places(&session.store, &place)?);
                (draft.qty, draft.unit) = split_quantity(qty.as_deref().unwrap_or_default());
                draft.note = note.unwrap_or_default();
                cmd_item_add(&mut session, draft, &now, false)?;
            }
            ItemAction::Toggle { id } => { cmd_item_toggle(&mut session, id, &now, false)?; }
            ItemAction::Remove { id } => { cmd_item_remove(&mut session, id, &now, false)?; }
            ItemAction::List { place } => {
                let place_id = place.map(|p| resolve_place(&session, &p)).transpose()?;
                cmd_items(&session, place_id, &now);
            }
            ItemAction::Clear { place } => {
                let place_id = resolve_place(&session, &place)?;
                cmd_clear_done(&mut session, place_id, false)?;
            }
        },
        Some(Commands::Completions { .. }) => {}
        Some(Commands::Ui) | None => {
            if session.store.is_demo() {
                eprintln!("No data directory configured: changes will not be saved.");
            }
            run_tui(session).map_err(|e| anyhow::anyhow!("error running dashboard: {}", e))?;
        }
    }
    Ok(())
}
