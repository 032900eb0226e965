// SPDX-FileCopyrightText: 2026 Draftloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Draftloom - content generation with resilient history.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use draftloom_config::DraftloomConfig;
use draftloom_core::{
    Caller, ContentKind, DraftloomError, GenerationRecord, GenerationRequest, ImageGuidance,
    Rating,
};
use draftloom_engine::{ContentStudio, MetadataUpdate, Persistence};
use draftloom_resilience::ReconnectOutcome;

use crate::app::App;

/// Draftloom - content generation with resilient history.
#[derive(Parser, Debug)]
#[command(name = "draftloom", version, about, long_about = None)]
struct Cli {
    /// Config file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act as this authenticated user. Without it, the guest id is used.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate content and save it to history.
    Generate {
        /// What to generate about.
        input: String,
        /// text, image, report, or trends.
        #[arg(long, default_value = "text", value_parser = parse_kind)]
        kind: ContentKind,
        #[arg(long, default_value = "")]
        platform: String,
        #[arg(long)]
        audience: Option<String>,
        /// Number of variations.
        #[arg(long)]
        batch: Option<u32>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        aspect_ratio: Option<String>,
        #[arg(long)]
        negative_prompt: Option<String>,
        /// Do not persist the result.
        #[arg(long)]
        no_save: bool,
    },
    /// Print one record as JSON.
    Show { id: String },
    /// List history, newest first.
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        archived: bool,
        #[arg(long, value_parser = parse_kind)]
        kind: Option<ContentKind>,
        #[arg(long)]
        favorites: bool,
    },
    /// Rate a record -1, 0 or 1.
    Rate {
        id: String,
        #[arg(allow_negative_numbers = true)]
        rating: i8,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Mark a record as favorite.
    Favorite {
        id: String,
        /// Remove the mark instead.
        #[arg(long)]
        off: bool,
    },
    /// Archive a record.
    Archive {
        id: String,
        #[arg(long)]
        undo: bool,
    },
    /// Replace a record's tags.
    Tag { id: String, tags: Vec<String> },
    /// Record that a record was exported in the given formats.
    Exported { id: String, formats: Vec<String> },
    /// Delete a record.
    Delete { id: String },
    /// Clear offline mode and probe the remote store again.
    Reconnect,
    /// Show connectivity state.
    Status,
}

impl Commands {
    /// `reconnect` probes on its own and `status` reports state as persisted.
    fn needs_startup_probe(&self) -> bool {
        !matches!(self, Commands::Reconnect | Commands::Status)
    }
}

fn parse_kind(s: &str) -> Result<ContentKind, String> {
    s.parse()
        .map_err(|_| format!("unknown kind `{s}` (expected text, image, report, or trends)"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => draftloom_config::load_and_validate_path(path),
        None => draftloom_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            draftloom_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli, &config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &DraftloomConfig) -> Result<(), DraftloomError> {
    let app = App::build(config).await?;
    let caller = app.caller(cli.user.as_deref(), &config.app.guest_user_id);
    if cli.command.needs_startup_probe() {
        app.studio.connect().await;
    }

    let result = execute(&app.studio, &caller, cli.command).await;
    if let Err(e) = app.shutdown().await {
        tracing::warn!(error = %e, "local store shutdown failed");
    }
    result
}

async fn execute(
    studio: &ContentStudio,
    caller: &Caller,
    command: Commands,
) -> Result<(), DraftloomError> {
    match command {
        Commands::Generate {
            input,
            kind,
            platform,
            audience,
            batch,
            language,
            aspect_ratio,
            negative_prompt,
            no_save,
        } => {
            let mut request = GenerationRequest::new(kind, input, platform);
            request.audience = audience;
            request.batch_count = batch;
            request.language = language;
            if aspect_ratio.is_some() || negative_prompt.is_some() {
                request.image = Some(ImageGuidance {
                    aspect_ratio,
                    negative_prompt,
                });
            }
            request.persist = !no_save;

            let outcome = studio.generate(caller, request).await?;
            print_json(&outcome.result)?;
            if outcome.substituted {
                eprintln!("note: backend busy, placeholder returned");
            }
            match &outcome.persistence {
                Persistence::NotRequested => {}
                Persistence::Stored(location) => eprintln!(
                    "saved {} ({})",
                    outcome.record_id,
                    if location.saved_remotely() { "remote" } else { "local" }
                ),
                Persistence::Failed { error } => eprintln!("not saved: {error}"),
            }
        }
        Commands::Show { id } => match studio.get(caller, &id).await? {
            Some(record) => print_json(&record)?,
            None => return Err(DraftloomError::NotFound { id }),
        },
        Commands::History {
            limit,
            archived,
            kind,
            favorites,
        } => {
            let records = if favorites {
                studio.favorites(caller, limit).await?
            } else if let Some(kind) = kind {
                studio.history_by_kind(caller, kind, limit).await?
            } else {
                studio.history(caller, limit, archived).await?
            };
            for record in &records {
                println!("{}", summary_line(record));
            }
        }
        Commands::Rate {
            id,
            rating,
            comment,
        } => {
            let rating = Rating::try_from(rating)?;
            studio.rate(caller, &id, rating, comment).await?;
        }
        Commands::Favorite { id, off } => {
            studio.toggle_favorite(caller, &id, !off).await?;
        }
        Commands::Archive { id, undo } => {
            let update = MetadataUpdate {
                archived: Some(!undo),
                ..MetadataUpdate::default()
            };
            studio.update_metadata(caller, &id, update).await?;
        }
        Commands::Tag { id, tags } => {
            let update = MetadataUpdate {
                tags: Some(tags),
                ..MetadataUpdate::default()
            };
            studio.update_metadata(caller, &id, update).await?;
        }
        Commands::Exported { id, formats } => {
            let update = MetadataUpdate {
                exported_formats: Some(formats),
                ..MetadataUpdate::default()
            };
            studio.update_metadata(caller, &id, update).await?;
        }
        Commands::Delete { id } => studio.delete(caller, &id).await?,
        Commands::Reconnect => match studio.reconnect().await {
            ReconnectOutcome::Online => println!("online"),
            ReconnectOutcome::Offline => println!("offline: remote store unreachable"),
            ReconnectOutcome::Disabled => println!("remote access is disabled here"),
        },
        Commands::Status => {
            let status = studio.status();
            println!("online: {}", status.is_online());
            println!("offline flag: {}", status.offline_flag);
            println!(
                "reconnect attempts: {}/{}",
                status.reconnect_attempts, status.max_reconnect_attempts
            );
            println!("remote access: {:?}", status.remote_access);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), DraftloomError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| DraftloomError::Internal(format!("failed to render JSON: {e}")))?;
    println!("{text}");
    Ok(())
}

fn summary_line(record: &GenerationRecord) -> String {
    let mut flags = String::new();
    if record.is_favorite {
        flags.push('*');
    }
    if record.is_archived {
        flags.push('a');
    }
    format!(
        "{}  {}  {:<7} {:<2} {}",
        record.id,
        record.created_at,
        record.kind(),
        flags,
        record.request.user_input
    )
}

/// Initialize the tracing subscriber with an env-filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("draftloom={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
