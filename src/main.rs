//! herakles-host-monitor
//!
//! Samples host load, memory and network counters into a bounded history and
//! serves it, together with live temperature and disk data, over HTTP.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod startup_checks;
mod state;

use axum::{routing::get, Router};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{debug, error, info, warn, Level};

use herakles_host_monitor::collectors::host::{HostProbe, ProcfsProbe};
use herakles_host_monitor::command::{CommandRunner, SystemCommandRunner};
use herakles_host_monitor::health_stats::HealthStats;
use herakles_host_monitor::history::HistoryStore;
use herakles_host_monitor::metrics::MonitorMetrics;
use herakles_host_monitor::query::QueryService;
use herakles_host_monitor::sampler::{discover_interfaces, Sampler};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_test};
use config::{resolve_config, show_config, validate_effective_config, Config};
use handlers::{
    api_not_found, cpu_handler, disks_handler, health_handler, history_handler, memory_handler,
    metrics_handler, network_handler, network_rates_handler, root_handler, temperature_handler,
};
use state::{AppState, SharedState};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(level: &LogLevel) {
    let log_level = match level {
        LogLevel::Off => None,
        LogLevel::Error => Some(Level::ERROR),
        LogLevel::Warn => Some(Level::WARN),
        LogLevel::Info => Some(Level::INFO),
        LogLevel::Debug => Some(Level::DEBUG),
        LogLevel::Trace => Some(Level::TRACE),
    };
    let Some(log_level) = log_level else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Builds the HTTP router for the given state.
fn build_router(state: SharedState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/api/metrics/history", get(history_handler))
        .route("/api/metrics/cpu", get(cpu_handler))
        .route("/api/metrics/memory", get(memory_handler))
        .route("/api/metrics/network", get(network_handler))
        .route("/api/metrics/network/rates", get(network_rates_handler))
        .route("/api/metrics/disks", get(disks_handler))
        .route("/api/metrics/temperature", get(temperature_handler))
        .route("/api/{*path}", get(api_not_found));

    if config.health_enabled() {
        app = app.route("/health", get(health_handler));
    }
    if config.telemetry_enabled() {
        app = app.route("/metrics", get(metrics_handler));
    }

    app.with_state(state)
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        if let Commands::Config {
            output,
            format,
            commented,
        } = command
        {
            return command_config(output.clone(), format.clone(), *commented);
        }

        let config = load_validated_config(&args)?;
        setup_logging(&config.log_level());

        return match command {
            Commands::Check { proc, tools } => command_check(*proc, *tools, &config),
            Commands::Test {
                iterations,
                hardware,
                format,
            } => command_test(*iterations, *hardware, format.clone(), &config)
                .await
                .map_err(|e| e.into()),
            Commands::Config { .. } => Ok(()),
        };
    }

    // Load configuration for main server mode
    let config = load_validated_config(&args)?;

    setup_logging(&config.log_level());

    info!("Starting herakles-host-monitor");

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new(config.command_timeout()));
    let probe: Arc<dyn HostProbe> = Arc::new(ProcfsProbe::new(config.proc_root()));

    let problems =
        startup_checks::validate_requirements(&config.proc_root(), config.use_sudo(), runner.as_ref());
    if !problems.is_empty() {
        warn!(
            "⚠️  {} startup check(s) reported problems - affected metrics will be empty",
            problems.len()
        );
    }

    // Interface set is fixed for the process lifetime
    let interfaces = match discover_interfaces(probe.as_ref()).await {
        Ok(names) => names,
        Err(e) => {
            warn!("Interface discovery failed, network history disabled: {}", e);
            Vec::new()
        }
    };
    info!("Tracking network interfaces: {:?}", interfaces);

    let store = Arc::new(HistoryStore::new(config.max_history_points(), interfaces));
    let health_stats = Arc::new(HealthStats::new());

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    let metrics = MonitorMetrics::new(&registry)?;
    debug!("All metrics registered successfully");

    let sampler = Arc::new(
        Sampler::new(
            probe.clone(),
            store.clone(),
            health_stats.clone(),
            config.collection_interval(),
        )
        .with_step_timeout(config.command_timeout()),
    );

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let sampler_task = tokio::spawn(sampler.run(async move {
        // Resolves on an explicit stop or when the sender is dropped
        let _ = stop_rx.changed().await;
    }));

    let state = Arc::new(AppState {
        registry,
        metrics,
        query: QueryService::new(store, probe, runner, config.use_sudo()),
        config: Arc::new(config.clone()),
        health_stats,
        start_time: Instant::now(),
    });

    let addr: SocketAddr = format!("{}:{}", config.bind(), config.port()).parse()?;
    let app = build_router(state);

    if config.tls_enabled() {
        // Presence is checked by validate_effective_config
        let (Some(cert_path), Some(key_path)) =
            (config.tls_cert_path.as_ref(), config.tls_key_path.as_ref())
        else {
            return Err("TLS enabled without certificate and key paths".into());
        };

        info!("Loading TLS certificate from: {}", cert_path);
        info!("Loading TLS private key from: {}", key_path);

        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(|e| {
                error!("Failed to load TLS configuration: {}", e);
                e
            })?;

        info!("herakles-host-monitor listening on https://{}", addr);

        let server = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service());

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, exiting...");
            }
        }
    } else {
        let listener = TcpListener::bind(addr).await?;
        info!("herakles-host-monitor listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    let _ = stop_tx.send(true);
    if let Err(e) = sampler_task.await {
        warn!("Sampler task ended abnormally: {}", e);
    }

    info!("herakles-host-monitor stopped gracefully");
    Ok(())
}
