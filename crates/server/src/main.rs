use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flock_core::{
    config::LogFormat, load_config, validate_config, AmadeusClient, ChannelJobQueue, Config,
    FlightSearchProvider, JobContext, JobController, JobFilter, JobQueue, JobStatus, JobStore,
    LocationResolver, SearchSettings, SqliteJobStore, WorkerPool,
};

use flock_server::api::create_router;
use flock_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("FLOCK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // The log format lives in the config, so load it before logging starts
    let loaded = load_config(&config_path);
    init_tracing(
        loaded
            .as_ref()
            .map(|config| config.logging.format)
            .unwrap_or_default(),
    );

    info!("Flock v{} starting", VERSION);
    info!("Loading configuration from {:?}", config_path);
    let config: Config =
        loaded.with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Create job store
    let store = Arc::new(
        SqliteJobStore::new(&config.database.path).context("Failed to create job store")?,
    );
    info!("Job store initialized");

    // Jobs interrupted by a previous shutdown are not resumed
    let stale = store
        .count(&JobFilter::new().with_status(JobStatus::Running))
        .context("Failed to count running jobs")?;
    if stale > 0 {
        warn!(count = stale, "Jobs left running by a previous process will not be resumed");
    }

    // Create provider client
    let amadeus_config = config
        .provider
        .amadeus
        .as_ref()
        .context("provider.amadeus section is missing")?;
    let amadeus = Arc::new(
        AmadeusClient::new(amadeus_config).context("Failed to create Amadeus client")?,
    );
    info!("Initializing Amadeus client at {}", amadeus_config.base_url);

    // Wire the job controller and worker pool
    let controller = Arc::new(JobController::new(JobContext {
        store: Arc::clone(&store) as Arc<dyn JobStore>,
        provider: Arc::clone(&amadeus) as Arc<dyn FlightSearchProvider>,
        resolver: amadeus as Arc<dyn LocationResolver>,
        search: SearchSettings::from(&config.search),
    }));

    let (queue, receiver) = ChannelJobQueue::new(config.worker.queue_capacity);
    let pool = WorkerPool::new(controller, receiver, config.worker.concurrency);
    pool.start().await;
    info!(
        concurrency = config.worker.concurrency,
        queue_capacity = config.worker.queue_capacity,
        "Worker pool started"
    );

    // Create app state
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(
        config,
        store as Arc<dyn JobStore>,
        Arc::new(queue) as Arc<dyn JobQueue>,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Stopping worker pool...");
    pool.stop().await;
    info!("Worker pool stopped");

    info!("Server shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
