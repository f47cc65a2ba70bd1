use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use uuid::Uuid;

mod auth;
mod chat;
mod engine;
mod export;
mod models;
mod report;
mod store;

use models::{Milestone, Status, UserProfile, Worker};
use store::Store;

#[derive(Parser)]
#[command(name = "worker-tracker")]
#[command(about = "Worker onboarding status tracker", long_about = None)]
struct Cli {
    /// Data directory for persisted state (default: $WORKER_TRACKER_DATA
    /// or .worker-tracker)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the data directory with the default roster
    Init,
    /// Register a local account and log in
    Register {
        username: String,
        password: String,
    },
    /// Log in with a registered account, or via --external with just a name
    #[command(group(
        ArgGroup::new("method")
            .args(["password", "external"])
            .required(true)
    ))]
    Login {
        username: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        external: bool,
    },
    /// Clear the persisted session
    Logout,
    /// Show the active session profile
    Whoami,
    /// List all workers with their milestone cells
    List,
    /// Show the audit trail for one worker
    History {
        /// Worker id or exact name
        worker: String,
    },
    /// Edit one milestone field for a worker
    #[command(group(
        ArgGroup::new("field")
            .args(["status", "date", "note"])
            .required(true)
    ))]
    Status {
        /// Worker id or exact name
        worker: String,
        /// Milestone id or label (signing_contract, training, oec, stamp, booking)
        milestone: String,
        /// New status: unset, waiting, done, or issue
        #[arg(long)]
        status: Option<String>,
        /// Date string, expected as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },
    /// Bulk-import workers from newline-separated names
    #[command(group(
        ArgGroup::new("source")
            .args(["file", "text"])
            .required(true)
    ))]
    Import {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Delete one worker (requires a reason)
    Delete {
        /// Worker id or exact name
        worker: String,
        #[arg(long)]
        reason: String,
    },
    /// Remove every worker; pass --confirm "DELETE ALL" to proceed
    ClearAll {
        #[arg(long)]
        confirm: String,
    },
    /// Print the current summary counts
    Summary,
    /// Snapshot the roster into the weekly report archive
    SaveReport,
    /// List archived weekly reports
    Reports,
    /// Print one archived report as markdown
    ShowReport {
        /// Week label, e.g. "Week 35 - 2026"
        week: String,
    },
    /// Export the roster to CSV
    Export {
        #[arg(long, default_value = "worker_report.csv")]
        out: PathBuf,
    },
    /// Team chat
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },
}

#[derive(Subcommand)]
enum ChatCommands {
    /// Send a message as the active session user
    Send { text: String },
    /// Print the chat log, oldest first
    Show,
}

fn data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("WORKER_TRACKER_DATA").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".worker-tracker"))
}

fn require_session(store: &Store) -> anyhow::Result<UserProfile> {
    store
        .load_session()
        .context("not logged in; run `worker-tracker login` first")
}

/// Accepts a UUID or an exact name match (case-insensitive).
fn resolve_worker(workers: &[Worker], selector: &str) -> anyhow::Result<usize> {
    if let Ok(id) = Uuid::parse_str(selector) {
        if let Some(index) = workers.iter().position(|w| w.id == id) {
            return Ok(index);
        }
    }
    workers
        .iter()
        .position(|w| w.name.eq_ignore_ascii_case(selector.trim()))
        .with_context(|| format!("no worker matching '{selector}'"))
}

fn parse_milestone(input: &str) -> anyhow::Result<Milestone> {
    Milestone::parse(input).with_context(|| {
        let valid: Vec<&str> = Milestone::ALL.iter().map(|m| m.id()).collect();
        format!("unknown milestone '{input}' (expected one of: {})", valid.join(", "))
    })
}

fn parse_status(input: &str) -> anyhow::Result<Status> {
    Status::parse(input)
        .with_context(|| format!("unknown status '{input}' (expected unset, waiting, done, or issue)"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = Store::open(data_dir(cli.data_dir)).context("failed to open data directory")?;

    match cli.command {
        Commands::Init => {
            if store.workers_blob_exists() {
                println!("Data directory already initialized at {}.", store.root().display());
            } else {
                let roster = models::default_roster();
                store.save_workers(&roster)?;
                println!(
                    "Seeded {} workers into {}.",
                    roster.len(),
                    store.root().display()
                );
            }
        }
        Commands::Register { username, password } => {
            let mut users = store.load_users();
            let profile = auth::register(&users, &username, &password)?;
            users.push(profile.clone());
            store.save_users(&users)?;
            store.save_session(&profile)?;
            println!("Registered and logged in as {}.", profile.username);
        }
        Commands::Login {
            username,
            password,
            external,
        } => {
            let profile = if external {
                auth::external_login(&username)?
            } else {
                let users = store.load_users();
                // ArgGroup guarantees password is present when not external.
                auth::login(&users, &username, password.as_deref().unwrap_or_default())?
            };
            store.save_session(&profile)?;
            println!("Logged in as {}.", profile.username);
        }
        Commands::Logout => {
            store.clear_session()?;
            println!("Logged out.");
        }
        Commands::Whoami => match store.load_session() {
            Some(profile) => {
                let kind = if profile.external { "external" } else { "local" };
                println!("{} ({kind}, color {})", profile.username, profile.color);
            }
            None => println!("Not logged in."),
        },
        Commands::List => {
            let workers = store.load_workers();
            if workers.is_empty() {
                println!("No workers. Use `worker-tracker import` to add some.");
                return Ok(());
            }
            for (index, worker) in workers.iter().enumerate() {
                let rec = if worker.recommended { " [REC]" } else { "" };
                println!("{:02}. {}{rec}", index + 1, worker.name);
                let cells: Vec<String> = Milestone::ALL
                    .iter()
                    .map(|m| {
                        format!("{}: {}", m.label(), export::status_cell(worker.statuses.get(*m)))
                    })
                    .collect();
                println!("    {}", cells.join(" | "));
            }
        }
        Commands::History { worker } => {
            let workers = store.load_workers();
            let index = resolve_worker(&workers, &worker)?;
            let worker = &workers[index];

            println!("Audit trail for {}:", worker.name);
            if worker.history.is_empty() {
                println!("No history.");
            }
            for log in &worker.history {
                let mut line = format!(
                    "- {} | {} | {} | {}",
                    log.timestamp.format("%Y-%m-%d %H:%M"),
                    log.user,
                    log.action.describe(),
                    log.milestone
                );
                if let Some(note) = &log.note {
                    line.push_str(&format!(" | \"{note}\""));
                }
                println!("{line}");
            }
        }
        Commands::Status {
            worker,
            milestone,
            status,
            date,
            note,
        } => {
            let profile = require_session(&store)?;
            let milestone = parse_milestone(&milestone)?;
            let edit = if let Some(status) = status {
                engine::FieldEdit::Status(parse_status(&status)?)
            } else if let Some(date) = date {
                engine::FieldEdit::Date(date)
            } else if let Some(note) = note {
                engine::FieldEdit::Note(note)
            } else {
                unreachable!("clap enforces exactly one field flag");
            };

            let mut workers = store.load_workers();
            let index = resolve_worker(&workers, &worker)?;
            let id = workers[index].id;
            engine::apply_update(&mut workers, id, milestone, edit, &profile.username, Utc::now());
            store.save_workers(&workers).context("failed to persist workers")?;
            println!("Updated {milestone}.");
        }
        Commands::Import { file, text } => {
            let profile = require_session(&store)?;
            let text = match (file, text) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, Some(text)) => text,
                (None, None) => unreachable!("clap enforces an import source"),
            };

            let mut workers = store.load_workers();
            let added = engine::bulk_import(&mut workers, &text, &profile.username, Utc::now());
            if added == 0 {
                bail!("no names found in import text");
            }
            store.save_workers(&workers).context("failed to persist workers")?;
            println!("Imported {added} workers ({} total).", workers.len());
        }
        Commands::Delete { worker, reason } => {
            let _profile = require_session(&store)?;
            if reason.trim().is_empty() {
                bail!("a non-empty --reason is required to delete a worker");
            }

            let mut workers = store.load_workers();
            let index = resolve_worker(&workers, &worker)?;
            let id = workers[index].id;
            engine::delete_worker(&mut workers, id);
            store.save_workers(&workers).context("failed to persist workers")?;
            println!("Worker deleted ({} remaining).", workers.len());
        }
        Commands::ClearAll { confirm } => {
            let _profile = require_session(&store)?;
            if confirm != "DELETE ALL" {
                bail!("refusing to clear workers; pass --confirm \"DELETE ALL\"");
            }
            store.save_workers(&[]).context("failed to persist workers")?;
            println!("All workers removed.");
        }
        Commands::Summary => {
            let workers = store.load_workers();
            let summary = report::summarize(&workers);

            println!("Workers: {}", summary.total_workers);
            println!(
                "Completed: {} / {} slots",
                summary.completed, summary.total_slots
            );
            println!("Waiting: {}", summary.waiting);
            println!("Issues: {}", summary.issues);
            for entry in &summary.breakdown {
                println!(
                    "- {}: {} done, {} waiting, {} issues",
                    entry.milestone, entry.counts.done, entry.counts.waiting, entry.counts.issue
                );
            }
        }
        Commands::SaveReport => {
            let _profile = require_session(&store)?;
            let workers = store.load_workers();
            let week = engine::week_label(Utc::now().date_naive());
            let snapshot = report::build_report(&workers, week.clone(), Utc::now());

            let mut reports = store.load_reports();
            report::archive(&mut reports, snapshot);
            // The in-memory archive is already updated; a failed write is
            // surfaced without rolling it back.
            store
                .save_reports(&reports)
                .context("failed to persist report archive")?;
            println!("Weekly report archived for {week} ({} in archive).", reports.len());
        }
        Commands::Reports => {
            let reports = store.load_reports();
            if reports.is_empty() {
                println!("No archived reports.");
            }
            for archived in &reports {
                println!(
                    "- {} | {} | {} workers",
                    archived.week,
                    archived.created_at.format("%d %b %Y"),
                    archived.summary.total_workers
                );
            }
        }
        Commands::ShowReport { week } => {
            let reports = store.load_reports();
            let archived = reports
                .iter()
                .find(|r| r.week == week)
                .with_context(|| format!("no archived report for '{week}'"))?;
            print!("{}", report::render(archived));
        }
        Commands::Export { out } => {
            let workers = store.load_workers();
            export::write_csv(&workers, &out)?;
            println!("Exported {} workers to {}.", workers.len(), out.display());
        }
        Commands::Chat { command } => match command {
            ChatCommands::Send { text } => {
                let profile = require_session(&store)?;
                let mut messages = store.load_chat();
                chat::post(&mut messages, &profile, &text, Utc::now())?;
                store.save_chat(&messages).context("failed to persist chat")?;
                println!("Sent.");
            }
            ChatCommands::Show => {
                let messages = store.load_chat();
                if messages.is_empty() {
                    println!("No messages yet.");
                }
                for message in &messages {
                    println!(
                        "[{}] {}: {}",
                        message.timestamp.format("%H:%M"),
                        message.user,
                        message.text
                    );
                }
            }
        },
    }

    Ok(())
}
