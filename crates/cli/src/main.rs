//! PawFortune CLI - Open blind boxes and manage your fortune collection.
//!
//! # Usage
//!
//! ```bash
//! # Save a profile (the western sign follows from the birthday)
//! paw-fortune profile set --month 8 --day 1 --chinese-zodiac dragon
//!
//! # Open today's box
//! paw-fortune open
//!
//! # Browse and export
//! paw-fortune collection list --oldest-first
//! paw-fortune export 1 --out cards/
//!
//! # Interactive session
//! paw-fortune play
//! ```
//!
//! # Commands
//!
//! - `profile` - Show or replace the saved profile
//! - `open` - Run one full box-opening cycle
//! - `collection` - List or inspect saved fortunes
//! - `export` - Write a fortune card as PNG
//! - `quota` - Show or reset today's generation count
//! - `play` - Interactive session driving the same state machine
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Log filter (default: `paw_fortune_app=info,paw_fortune_cli=info`)
//! - `PAW_FORTUNE_LOG_JSON` - Emit JSON logs instead of text
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Optional error tracking
//!
//! See `paw_fortune_app::config` for store and Gemini settings.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use paw_fortune_core::{ChineseZodiac, ZodiacSign};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "paw-fortune")]
#[command(author, version, about = "PawFortune blind-box fortunes in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or replace the saved profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Open a blind box (shake, generate text, generate image)
    Open,
    /// Browse saved fortunes
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Export a saved fortune as a PNG card
    Export {
        /// Position in the collection, 1 = newest
        index: usize,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Inspect or reset today's quota
    Quota {
        #[command(subcommand)]
        action: QuotaAction,
    },
    /// Interactive session
    Play,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Save a new profile, replacing the old one
    Set {
        /// Birth month (1-12)
        #[arg(short, long)]
        month: String,

        /// Birth day
        #[arg(short, long)]
        day: String,

        /// Western zodiac sign; ignored when it disagrees with the birthday
        #[arg(short, long)]
        zodiac: Option<ZodiacSign>,

        /// Chinese zodiac animal (e.g. `dragon` or `龙`)
        #[arg(short, long)]
        chinese_zodiac: ChineseZodiac,
    },
    /// Print the saved profile
    Show,
}

#[derive(Subcommand)]
enum CollectionAction {
    /// List saved fortunes
    List {
        /// Oldest first instead of newest first
        #[arg(long)]
        oldest_first: bool,
    },
    /// Print one fortune in full
    Show {
        /// Position in the collection, 1 = newest
        index: usize,
    },
}

#[derive(Subcommand)]
enum QuotaAction {
    /// Show today's usage
    Status,
    /// Zero today's count
    Reset,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|v| !v.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "paw_fortune_app=info,paw_fortune_cli=info".into());

    let json = std::env::var("PAW_FORTUNE_LOG_JSON").is_ok();
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env before Sentry so SENTRY_DSN can live there
    let _ = dotenvy::dotenv();
    init_tracing();
    let _sentry_guard = init_sentry();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Profile { action } => match action {
            ProfileAction::Set {
                month,
                day,
                zodiac,
                chinese_zodiac,
            } => commands::profile::set(month, day, zodiac, chinese_zodiac)?,
            ProfileAction::Show => commands::profile::show()?,
        },
        Commands::Open => commands::open::run().await?,
        Commands::Collection { action } => match action {
            CollectionAction::List { oldest_first } => commands::collection::list(oldest_first)?,
            CollectionAction::Show { index } => commands::collection::show(index)?,
        },
        Commands::Export { index, out } => {
            commands::export::run(index, &out)?;
        }
        Commands::Quota { action } => match action {
            QuotaAction::Status => commands::quota::status()?,
            QuotaAction::Reset => commands::quota::reset()?,
        },
        Commands::Play => commands::play::run().await?,
    }
    Ok(())
}
