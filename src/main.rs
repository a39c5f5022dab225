//! notifsiren - rings a persistent alarm when a watched notification arrives.
//!
//! # Overview
//!
//! notifsiren reads the notifications posted by other applications as a stream
//! of JSON lines. When a notification comes from an enabled source (Telegram or
//! WhatsApp) and its title contains the configured keyword, ignoring case, the
//! alarm starts ringing at full volume and keeps ringing until an operator
//! stops it.
//!
//! # Configuration
//!
//! ```yaml
//! alarm:
//!   sound: "/usr/share/sounds/notifsiren/alarm.ogg"
//!   output: bell
//!
//! events:
//!   path: "/run/notifsiren/events"
//! ```
//!
//! Any value can be overridden with a `NOTIFSIREN_` environment variable, for
//! example `NOTIFSIREN_EVENTS__PATH=-`. See [`config`].
//!
//! # Usage
//!
//! ```bash
//! notifsiren --config config.yaml --data ./siren-data
//! ```
//!
//! # Console Commands
//!
//! - `!siren status` - Show the alarm state and the rule
//! - `!siren stop` - Silence the alarm
//! - `!siren keyword <text>` - Set the keyword, which locks it
//! - `!siren lock` / `!siren unlock` - Protect the keyword from changes
//! - `!siren enable <source>` / `!siren disable <source>` - Watch or ignore a source
//! - `!siren help` - Display help information
//!
//! # Architecture
//!
//! - [`notifications`] - Notification events and the stream delivering them
//! - [`rules`] - Keyword rule, its settings and their persistence
//! - [`alarm`] - Alarm state machine, audio outputs and status broadcast
//! - [`commands`] - Stop inlet and operator console
//! - [`siren`] - Wiring of the above into concurrent tasks
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`error`] - Error taxonomy
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{config::Config, siren::Siren};

mod alarm;
mod commands;
mod config;
mod error;
mod notifications;
mod rules;
mod siren;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// Values can be overridden with `NOTIFSIREN_` environment variables,
    /// nested keys being separated by `__`.
    #[arg(short, long)]
    config: String,

    /// Path to the directory storing the rule settings.
    #[arg(short, long)]
    data: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting notifsiren {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&args.data).await {
        error!("Failed to create data directory {}: {}", args.data, e);
        return;
    }

    let siren = Siren::new(config, &args.data).await;
    if let Err(e) = siren.start().await {
        error!("{:#}", e);
    }
}
