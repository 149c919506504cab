//! study-scout CLI
//!
//! Local execution entry point. For AWS Lambda, use `study-scout-lambda`.
//! Local runs never touch AWS: sessions land in a JSON file under the data
//! directory and notifications go to the log.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use study_scout::{
    error::Result,
    models::{Config, SessionStatus},
    notify::LogNotifier,
    services::{ConnpassClient, DiscoveryService},
    storage::LocalStore,
};

/// study-scout - connpass study-session discovery
#[derive(Parser, Debug)]
#[command(
    name = "study-scout",
    version,
    about = "Discovers Hiroshima IT study sessions on connpass"
)]
struct Cli {
    /// Data directory for the local session store
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Path to config file (default: {data_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one discovery pass against the local store
    Discover,

    /// List stored study sessions
    List {
        /// Only show sessions with this status (pending|approved|rejected)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show store location and session counts
    Info,

    /// Validate configuration files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("study-scout starting...");

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.data_dir.join("config.toml"));
    let mut config = Config::load_or_default(&config_path);
    config.apply_env();

    let store = LocalStore::new(&cli.data_dir);

    match cli.command {
        Command::Discover => {
            config.validate()?;

            let client = ConnpassClient::new(config.connpass.clone())?;
            let service = DiscoveryService::new(
                client,
                Arc::new(store),
                Arc::new(LogNotifier),
                config.discovery.clone(),
            );

            // Unclassified search errors propagate here and exit non-zero
            let result = service.run().await?;

            println!("Found:      {}", result.total_found);
            println!("New:        {}", result.new_registrations);
            println!("Duplicates: {}", result.duplicates_skipped);
            for session in &result.registered {
                println!("  + {} ({})", session.title, session.url);
            }
            if !result.errors.is_empty() {
                println!("Errors:");
                for error in &result.errors {
                    println!("  ! {}", error);
                }
            }
        }

        Command::List { status } => {
            let filter = status
                .as_deref()
                .map(str::parse::<SessionStatus>)
                .transpose()?;

            let sessions = store.load_all().await?;
            let mut shown = 0;
            for session in &sessions {
                if filter.is_some_and(|f| f != session.status) {
                    continue;
                }
                shown += 1;
                println!(
                    "[{}] {} | {} | {}",
                    session.status,
                    session.datetime.format("%Y-%m-%d %H:%M"),
                    session.title,
                    session.url
                );
            }
            println!("{} of {} sessions", shown, sessions.len());
        }

        Command::Info => {
            log::info!("Data directory: {}", cli.data_dir.display());

            let sessions = store.load_all().await?;
            let count_with = |status: SessionStatus| {
                sessions.iter().filter(|s| s.status == status).count()
            };

            println!("Sessions:  {}", sessions.len());
            println!("  pending:  {}", count_with(SessionStatus::Pending));
            println!("  approved: {}", count_with(SessionStatus::Approved));
            println!("  rejected: {}", count_with(SessionStatus::Rejected));
        }

        Command::Validate => {
            log::info!("Validating configuration from {}", config_path.display());

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            println!("Config OK");
            println!("  keyword:     {}", config.connpass.keyword);
            println!("  count:       {}", config.connpass.count);
            println!("  base_url:    {}", config.connpass.base_url);
            println!("  api_key:     {}", if config.connpass.api_key.is_some() {
                "set"
            } else {
                "not set"
            });
            println!("  batch_size:  {}", config.discovery.batch_size);
            println!("  batch_delay: {}ms", config.discovery.batch_delay_ms);
        }
    }

    log::info!("Done!");

    Ok(())
}
