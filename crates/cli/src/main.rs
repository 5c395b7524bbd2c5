//! Kimbank CLI - interactive banking client
//!
//! Usage:
//! ```bash
//! kimbank
//! kimbank --host db.internal --schema kim_bank
//! kimbank --config kimbank.json --verbose
//! KIMBANK_DB_PASSWORD=secret kimbank
//! ```
//!
//! The account logic lives in stored procedures of the `kim_bank` schema; this
//! binary only reads menu choices, calls those procedures and prints what the
//! database sends back on the notification channel.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kimbank_persistence::{
    run_listener, DbConfig, Notification, PgDatabase, PgNotificationSource, SslMode,
};
use std::path::PathBuf;

mod handlers;
mod prompt;
mod repl;
#[cfg(test)]
mod test_support;

use prompt::Prompt;
use repl::Repl;

/// Kimbank - register, log in and move money through the bank's stored procedures
#[derive(Parser)]
#[command(name = "kimbank")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON config file (fields of the database endpoint)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Database host
    #[arg(long)]
    pub host: Option<String>,

    /// Database port
    #[arg(long)]
    pub port: Option<u16>,

    /// Database user
    #[arg(long)]
    pub user: Option<String>,

    /// Database password (prefer KIMBANK_DB_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Database name
    #[arg(long)]
    pub database: Option<String>,

    /// TLS mode
    #[arg(long)]
    pub sslmode: Option<SslModeArg>,

    /// Schema holding the bank procedures
    #[arg(long)]
    pub schema: Option<String>,

    /// Notification channel to listen on
    #[arg(long)]
    pub channel: Option<String>,

    /// Seconds without notifications before the listener pings
    #[arg(long)]
    pub keepalive_secs: Option<u64>,

    /// Debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SslModeArg {
    Disable,
    Prefer,
    Require,
}

impl SslModeArg {
    pub fn to_config(&self) -> SslMode {
        match self {
            SslModeArg::Disable => SslMode::Disable,
            SslModeArg::Prefer => SslMode::Prefer,
            SslModeArg::Require => SslMode::Require,
        }
    }
}

impl Cli {
    /// Defaults, then the config file, then the environment, then flags
    pub fn db_config(&self) -> Result<DbConfig> {
        let mut config = match &self.config {
            Some(path) => DbConfig::from_file(path)
                .with_context(|| format!("Failed to load config file {:?}", path))?,
            None => DbConfig::default(),
        };
        config.apply_env()?;

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(sslmode) = self.sslmode {
            config.sslmode = sslmode.to_config();
        }
        if let Some(schema) = &self.schema {
            config.schema = schema.clone();
        }
        if let Some(channel) = &self.channel {
            config.channel = channel.clone();
        }
        if let Some(secs) = self.keepalive_secs {
            config.keepalive_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_notification(notification: Notification) {
    tracing::debug!(
        channel = %notification.channel,
        pid = notification.process_id,
        "notification received"
    );
    println!("📢 {}", notification.payload);
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.db_config()?;

    let source = PgNotificationSource::connect(&config)
        .await
        .context("Failed to start the notification listener")?;
    let listener = tokio::spawn(run_listener(
        source,
        config.keepalive(),
        print_notification,
    ));

    let db = PgDatabase::connect(&config)
        .await
        .context("Failed to connect to the PostgreSQL database")?;
    println!("Connected to the PostgreSQL database");

    db.set_namespace(&config.schema)
        .await
        .context("Failed to select the bank schema")?;

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut repl = Repl::new(Prompt::new(input, std::io::stdout()), &db);

    tokio::select! {
        result = repl.run() => {
            result.context("Interactive session failed")?;
        }
        joined = listener => {
            match joined {
                Ok(Err(e)) => return Err(e).context("Notification listener failed"),
                Ok(Ok(never)) => match never {},
                Err(e) => return Err(e).context("Notification listener task aborted"),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        // A stdin read may still be blocked on its thread; do not wait for it.
        std::process::exit(1);
    }
}
