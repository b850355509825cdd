//! CLI administration tool for note-service.
//!
//! Wires the same storage stack as the server (selected by `STORAGE_MODE`)
//! and runs one operation against it, without going through HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Create a note
//! cargo run --bin admin -- note create --title "T" --body "B" --author "A" --public
//!
//! # Fetch a note
//! cargo run --bin admin -- note get 1
//!
//! # Delete a note
//! cargo run --bin admin -- note delete 1
//!
//! # Check the configured backend
//! cargo run --bin admin -- health
//! ```

use note_service::config;
use note_service::prelude::*;
use note_service::server;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::time::Duration;

/// CLI tool for managing note-service storage.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage notes
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Check that the configured backend is reachable
    Health,
}

/// Note subcommands.
#[derive(Subcommand)]
enum NoteAction {
    /// Create a new note
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        body: String,

        #[arg(short, long)]
        author: String,

        /// Make the note public
        #[arg(long)]
        public: bool,
    },

    /// Show a note
    Get { id: i64 },

    /// Delete a note
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Failed to load configuration")?;
    let service = server::build_service(&config)
        .await
        .context("Failed to initialise storage")?;

    println!(
        "{} {}",
        "Storage:".bright_white().bold(),
        config.storage_mode.to_string().cyan()
    );
    println!();

    match cli.command {
        Commands::Note { action } => handle_note_action(&service, action).await?,
        Commands::Health => handle_health(&service).await?,
    }

    Ok(())
}

/// Dispatches note commands.
async fn handle_note_action(service: &NoteService, action: NoteAction) -> Result<()> {
    let ctx = Context::new();

    match action {
        NoteAction::Create {
            title,
            body,
            author,
            public,
        } => {
            let id = service
                .create(&ctx, NoteInfo::new(title, body, author, public))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create note: {}", e))?;

            println!("{}", "Note created".green().bold());
            println!("  ID: {}", id.to_string().bright_yellow().bold());
        }
        NoteAction::Get { id } => {
            let note = service
                .get(&ctx, id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to fetch note {}: {}", id, e))?;

            print_note(&note);
        }
        NoteAction::Delete { id } => {
            let note = service
                .delete(&ctx, id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete note {}: {}", id, e))?;

            println!(
                "{} {}",
                "Deleted note".red().bold(),
                note.info.title.cyan()
            );
        }
    }

    Ok(())
}

/// Prints a note as a small table.
///
/// ```text
///   ID       1
///   Title    T
///   Author   A
///   Public   yes
///   Created  2025-01-15 10:30:00
///   Updated  2025-01-15 10:30:00
///
///   B
/// ```
fn print_note(note: &Note) {
    let visibility = if note.info.is_public {
        "yes".green()
    } else {
        "no".yellow()
    };

    println!("  {:<8} {}", "ID".bright_white().bold(), note.id);
    println!("  {:<8} {}", "Title".bright_white().bold(), note.info.title.cyan());
    println!("  {:<8} {}", "Author".bright_white().bold(), note.info.author);
    println!("  {:<8} {}", "Public".bright_white().bold(), visibility);
    println!(
        "  {:<8} {}",
        "Created".bright_white().bold(),
        note.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!(
        "  {:<8} {}",
        "Updated".bright_white().bold(),
        note.updated_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .bright_black()
    );
    println!();
    println!("  {}", note.info.body);
}

async fn handle_health(service: &NoteService) -> Result<()> {
    let ctx = Context::with_timeout(Duration::from_secs(5));
    if service.health_check(&ctx).await {
        println!("{}", "Backend reachable".green().bold());
        Ok(())
    } else {
        anyhow::bail!("Backend unreachable")
    }
}
