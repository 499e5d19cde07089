//! # Vigil CLI
//!
//! Notification scheduling & delivery engine for the Vigil prayer
//! platform.
//!
//! Usage:
//!   vigil run                          # Start the reminder scheduler
//!   vigil run --once                   # One scheduler pass, then exit
//!   vigil broadcast send -m "..."      # Fan a message out to subscribers
//!   vigil broadcast status <job-id>    # Aggregate counts for a job
//!   vigil broadcast cancel <job-id>    # Stop a running job between sends
//!   vigil config show                  # Show configuration
//!   vigil info                         # Show system info

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vigil_broadcast::BroadcastCoordinator;
use vigil_channels::TelegramDispatcher;
use vigil_content::ContentProvider;
use vigil_core::traits::{BroadcastJobStore, ContentCache, Dispatcher, TextProvider};
use vigil_core::VigilConfig;
use vigil_providers::OpenAiCompatProvider;
use vigil_scheduler::SchedulerEngine;
use vigil_store::{SqliteRegistry, SqliteStore};

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "🕯️ Vigil — reminder scheduling & delivery engine",
    long_about = "Decides when each prayer-slot reminder fires, guarantees it is sent\nat most once per day, and fans admin broadcasts out to every subscriber."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the reminder scheduler
    Run {
        /// Execute a single tick and exit
        #[arg(long)]
        once: bool,
    },

    /// Manage broadcast jobs
    Broadcast {
        #[command(subcommand)]
        action: BroadcastAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show system info
    Info,
}

#[derive(Subcommand)]
enum BroadcastAction {
    /// Create a job and fan the message out to all active subscribers
    Send {
        /// Message to broadcast; {name} is replaced per recipient
        #[arg(short, long)]
        message: String,
    },
    /// Show a job's aggregate counts
    Status { job_id: String },
    /// Set a job's cancel flag; it stops between sends
    Cancel { job_id: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Reset to defaults
    Reset,
}

/// Everything a command needs, wired from config. The engine store doubles
/// as dedup store, content cache, and broadcast job store; the registry
/// handle covers the platform's slot/preference/subscriber tables.
struct Wiring {
    store: Arc<SqliteStore>,
    registry: Arc<SqliteRegistry>,
    content: Arc<ContentProvider>,
    dispatcher: Arc<dyn Dispatcher>,
}

fn wire(config: &VigilConfig) -> Result<Wiring> {
    let store = Arc::new(SqliteStore::open(&config.store.resolved_db_path())?);
    let registry = Arc::new(SqliteRegistry::open(&config.store.resolved_platform_db_path())?);

    let Some(telegram) = config.channel.telegram.as_ref().filter(|t| t.enabled) else {
        anyhow::bail!(
            "No channel configured — add a [channel.telegram] section to {}",
            VigilConfig::default_path().display()
        );
    };
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(TelegramDispatcher::new(telegram));

    let provider: Arc<dyn TextProvider> = Arc::new(OpenAiCompatProvider::new(&config.content));
    let cache: Arc<dyn ContentCache> = store.clone();
    let content = Arc::new(ContentProvider::new(
        Some(provider),
        cache,
        config.content.max_len,
    ));

    Ok(Wiring { store, registry, content, dispatcher })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "vigil=debug,vigil_scheduler=debug,vigil_broadcast=debug,vigil_store=debug"
    } else {
        "vigil=info,vigil_scheduler=info,vigil_broadcast=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        VigilConfig::load_from(std::path::Path::new(path))?
    } else {
        VigilConfig::load()?
    };

    match cli.command {
        Commands::Run { once } => {
            let w = wire(&config)?;
            let engine = SchedulerEngine::new(
                config.scheduler.clone(),
                w.registry.clone(),
                w.registry.clone(),
                w.registry,
                w.content,
                w.dispatcher,
                w.store,
            );

            if once {
                engine.tick(chrono::Utc::now()).await?;
                println!("✅ Tick complete.");
            } else {
                println!(
                    "🕯️ Vigil v{} — scheduler running (tick every {}s, tolerance {}s)",
                    env!("CARGO_PKG_VERSION"),
                    config.scheduler.tick_secs,
                    config.scheduler.tolerance_secs()
                );
                println!("   Press Ctrl+C to stop.\n");

                tokio::select! {
                    result = engine.run() => result?,
                    _ = tokio::signal::ctrl_c() => {
                        println!("\n👋 Scheduler stopped.");
                    }
                }
            }
        }

        Commands::Broadcast { action } => match action {
            BroadcastAction::Send { message } => {
                let w = wire(&config)?;
                let coordinator = BroadcastCoordinator::new(
                    config.broadcast.clone(),
                    w.registry,
                    w.content,
                    w.dispatcher,
                    w.store,
                );

                let job_id = coordinator.start(&message).await?;
                println!("📣 Broadcast job {job_id} queued, sending...");

                let report = coordinator.run(&job_id).await?;
                println!(
                    "✅ Broadcast {}: {} sent, {} failed, {} skipped",
                    if report.cancelled { "cancelled early" } else { "completed" },
                    report.sent,
                    report.failed,
                    report.skipped
                );
            }
            BroadcastAction::Status { job_id } => {
                let store = SqliteStore::open(&config.store.resolved_db_path())?;
                match BroadcastJobStore::get(&store, &job_id).await? {
                    Some(job) => {
                        println!("📣 Broadcast {job_id}");
                        println!("   Status:  {}", job.status.as_str());
                        println!("   Sent:    {}", job.sent);
                        println!("   Failed:  {}", job.failed);
                        println!("   Skipped: {}", job.skipped);
                        if job.cancelled {
                            println!("   Cancelled: yes");
                        }
                    }
                    None => println!("❌ Unknown job: {job_id}"),
                }
            }
            BroadcastAction::Cancel { job_id } => {
                let store = SqliteStore::open(&config.store.resolved_db_path())?;
                store.cancel(&job_id).await?;
                println!("🛑 Cancel flag set for {job_id}; it stops between sends.");
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config)?;
                println!("{content}");
            }
            ConfigAction::Reset => {
                let config = VigilConfig::default();
                config.save()?;
                println!("✅ Configuration reset to defaults.");
            }
        },

        Commands::Info => {
            println!("🕯️ Vigil v{}", env!("CARGO_PKG_VERSION"));
            println!("   Platform: {} / {}", std::env::consts::OS, std::env::consts::ARCH);
            println!("   Config: {}", VigilConfig::default_path().display());
            println!("   Engine DB: {}", config.store.resolved_db_path().display());
            println!("   Platform DB: {}", config.store.resolved_platform_db_path().display());
            println!(
                "   Scheduler: tick {}s, tolerance {}s, concurrency {}",
                config.scheduler.tick_secs,
                config.scheduler.tolerance_secs(),
                config.scheduler.concurrency
            );
            println!("   Provider: {} ({})", config.content.model, config.content.api_url);
            println!(
                "   Telegram: {}",
                match &config.channel.telegram {
                    Some(t) if t.enabled => "enabled",
                    Some(_) => "disabled",
                    None => "not configured",
                }
            );
        }
    }

    Ok(())
}
