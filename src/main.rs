// ABOUTME: Entry point for the dockscout CLI application.
// ABOUTME: Parses arguments, wires the engine, and dispatches subcommands.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use dockscout::config::Config;
use dockscout::engine::{Engine, EngineSettings};
use dockscout::error::Result;
use dockscout::output::{Output, OutputMode};
use dockscout::registry::RegistryClient;
use dockscout::runtime::{BollardRuntime, DaemonOps, RuntimeError, detect_local_with};
use dockscout::state::{StateHandle, StateSnapshot, StateStore};
use dockscout::types::RecordId;
use std::env;
use std::sync::Arc;
use tokio::time::{MissedTickBehavior, interval};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let config = Config::resolve(cli.config.as_deref(), &cwd)?;
    output.start_timer();

    if let Commands::Status = cli.command {
        let store = StateStore::in_dir(&config.data_dir);
        let snapshot = store.load().await?;
        output.snapshot(&snapshot);
        return Ok(());
    }

    let engine = build_engine(&config).await?;

    match cli.command {
        Commands::Refresh => {
            output.progress("Rebuilding inventory...");
            let snapshot = engine.rebuild_inventory().await?;
            output.warnings(&engine.last_diagnostics());
            finish(output, &snapshot, "Inventory rebuilt");
        }
        Commands::Check { limit } => {
            let limit = limit.unwrap_or(config.batch_size);
            output.progress(&format!("Checking up to {limit} image(s)..."));
            let snapshot = engine.check_batch(limit).await?;
            finish(output, &snapshot, "Update check complete");
        }
        Commands::CheckId { ids } => {
            let ids: Vec<RecordId> = ids.into_iter().map(RecordId::new).collect();
            let snapshot = engine.check_by_ids(&ids).await?;
            finish(output, &snapshot, "Update check complete");
        }
        Commands::CheckStack { stack } => {
            output.progress(&format!("Checking stack {stack}..."));
            let snapshot = engine.check_by_stack(&stack).await?;
            finish(output, &snapshot, "Update check complete");
        }
        Commands::Watch => watch(&engine, &config).await,
        Commands::Status => {}
    }

    Ok(())
}

fn finish(output: &Output, snapshot: &StateSnapshot, message: &str) {
    output.snapshot(snapshot);
    output.success(message);
}

/// Connect to the runtime, open state and build the engine.
async fn build_engine(config: &Config) -> Result<Engine> {
    let endpoint = detect_local_with(Some(&config.runtime)).map_err(RuntimeError::from)?;
    let runtime = BollardRuntime::connect(&endpoint).map_err(RuntimeError::from)?;
    let version = runtime.version().await.map_err(RuntimeError::from)?;
    tracing::info!(
        runtime = %runtime.runtime_type(),
        socket = %endpoint.socket_path,
        version = %version.version,
        api = %version.api_version,
        "connected to container runtime"
    );

    let resolver = RegistryClient::new(config.registry_client_config()?)?;
    let state = StateHandle::open(StateStore::in_dir(&config.data_dir)).await?;

    let settings = EngineSettings {
        compose_roots: config.compose_roots.clone(),
        scan_depth: config.scan_depth,
        check_policy: config.check_policy,
        check_timeout: config.request_timeout * 2,
    };
    Ok(Engine::new(
        Arc::new(runtime),
        Arc::new(resolver),
        state,
        settings,
    ))
}

/// Drive refreshes and batch checks on their intervals until interrupted.
async fn watch(engine: &Engine, config: &Config) {
    let mut refresh = interval(config.refresh_interval);
    let mut checks = interval(config.update_interval);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    checks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        refresh_every = ?config.refresh_interval,
        check_every = ?config.update_interval,
        batch_size = config.batch_size,
        "watching"
    );

    // Checks need an inventory, so the first refresh runs before anything else.
    refresh.tick().await;
    if let Err(e) = engine.rebuild_inventory().await {
        tracing::error!(error = %e, "inventory rebuild failed");
    }

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                if let Err(e) = engine.rebuild_inventory().await {
                    tracing::error!(error = %e, "inventory rebuild failed");
                }
            }
            _ = checks.tick() => {
                if let Err(e) = engine.check_batch(config.batch_size).await {
                    tracing::error!(error = %e, "batch update check failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }
}
