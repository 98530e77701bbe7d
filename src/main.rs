use anyhow::{Context, Result};
use azgate::azure::http::build_client;
use azgate::config::{Config, Environment, FileConfig, Overrides};
use azgate::{build_router, AppState, VERSION};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// HTTP gateway for Azure Resource Manager
#[derive(Parser, Debug)]
#[command(name = "azgate", version, about, long_about = None)]
struct Args {
    /// Host and port to listen on
    #[arg(short, long)]
    listen: Option<String>,

    /// Deployment environment
    #[arg(short, long, value_enum)]
    env: Option<Environment>,

    /// URL prefix for resource routes
    #[arg(short, long)]
    prefix: Option<String>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum, env = "LOG_TYPE", default_value = "stdout")]
    log_type: LogType,

    /// Log level (defaults to debug in development, info in production)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogType {
    Stdout,
    File,
    None,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    fn for_env(env: Environment) -> Self {
        if env.debug_mode() {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }
}

fn setup_logging(
    log_type: LogType,
    level: LogLevel,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    // RUST_LOG wins over the command line when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));

    match log_type {
        LogType::None => Ok(None),
        LogType::Stdout => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .init();
            Ok(None)
        }
        LogType::File => {
            let log_path = get_log_path();
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }

            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .init();

            tracing::info!("Log file: {:?}", log_path);
            Ok(Some(guard))
        }
    }
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("azgate").join("azgate.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".azgate").join("azgate.log");
    }
    PathBuf::from("azgate.log")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file = FileConfig::discover(args.config.as_deref())?;
    let config = Config::resolve(
        file,
        Overrides {
            listen: args.listen,
            env: args.env,
            prefix: args.prefix,
        },
    );

    let level = args.log_level.unwrap_or(LogLevel::for_env(config.env));
    let _log_guard = setup_logging(args.log_type, level)?;

    tracing::info!(
        "azgate {} starting in {:?} mode, upstream {}",
        VERSION,
        config.env,
        config.base_url
    );

    let http = build_client(&config.user_agent).context("Failed to build HTTP client")?;
    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    tracing::info!("Listening on {}{}", listener.local_addr()?, config.prefix);

    let router = build_router(AppState::new(config, http));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("azgate stopped");
    Ok(())
}
