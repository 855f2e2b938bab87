//! Engine binary for the luggage carousel simulation.
//!
//! Wires the session, the host API, and the self-driven tick loop
//! together. The host API stays up after the loop ends so a client can
//! keep dragging, dropping, and unloading until Ctrl-C.
//!
//! Exactly one clock ticks the session. With `world.drive: engine` the tick
//! loop runs and the host API refuses host ticks; with `world.drive: host`
//! no loop runs and the host ticks through the API.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `carousel-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the session (carousel engine + storage grid)
//! 4. Create operator state from simulation bounds
//! 5. Start the host API server
//! 6. Run the tick loop (engine drive only)
//! 7. Log the result and wait for the host API to shut down

mod error;
mod observer_callback;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use carousel_core::config::{LoggingConfig, SimulationConfig, TickDriver};
use carousel_core::operator::OperatorState;
use carousel_core::runner;
use carousel_core::session::CarouselSession;
use carousel_observer::server::ServerConfig;
use carousel_observer::state::AppState;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Config file looked up relative to the working directory.
const CONFIG_FILE: &str = "carousel-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, logging, or the host API fail to
/// start.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config_from(Path::new(CONFIG_FILE))?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging)?;
    info!("carousel-engine starting");
    match config_path {
        Some(path) => info!(path = %path.display(), "Config file loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        drive = ?config.world.drive,
        grid_size = config.storage.grid_size,
        priority_count = config.storage.priority_count,
        motion = ?config.carousel.motion,
        "Configuration loaded"
    );

    // 3. Build the session.
    let session = runner::share(CarouselSession::from_config(&config));

    // 4. Create operator state.
    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Operator state initialized"
    );

    let shutdown = Arc::new(Notify::new());
    spawn_ctrl_c_handler(Arc::clone(&operator), Arc::clone(&shutdown));

    // 5. Start the host API server.
    let app_state = Arc::new(match config.world.drive {
        TickDriver::Engine => AppState::with_operator(Arc::clone(&session), Arc::clone(&operator)),
        TickDriver::Host => AppState::new(Arc::clone(&session)),
    });
    let observer_handle = if config.observer.enabled {
        let server_config = ServerConfig::from(&config.observer);
        let signal = Arc::clone(&shutdown);
        let handle = carousel_observer::spawn_observer(
            &server_config,
            Arc::clone(&app_state),
            async move { signal.notified().await },
        )
        .await
        .map_err(EngineError::from)?;
        Some(handle)
    } else {
        info!("Host API disabled");
        None
    };

    // 6. Run the tick loop, unless the host supplies ticks.
    let result = match config.world.drive {
        TickDriver::Engine => {
            let mut callback = ObserverCallback::new(Arc::clone(&app_state));
            let result = runner::run_simulation(&session, &operator, &mut callback).await;
            // 7. Log results, then keep serving until Ctrl-C.
            runner::log_simulation_end(&result);
            Some(result)
        }
        TickDriver::Host => {
            info!("Host-driven ticks, engine tick loop not started");
            None
        }
    };

    if let Some(handle) = observer_handle {
        info!("Host API still serving; press Ctrl-C to exit");
        if let Err(e) = handle.await {
            warn!(error = %e, "Host API task ended abnormally");
        }
    }

    match result {
        Some(result) => info!(
            end_reason = ?result.end_reason,
            total_ticks = result.total_ticks,
            "carousel-engine shutdown complete"
        ),
        None => info!("carousel-engine shutdown complete"),
    }

    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. Returns the path actually read, if any.
fn load_config_from(path: &Path) -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok((config, Some(path.to_path_buf())))
    } else {
        // Still honour environment overrides and validation.
        Ok((SimulationConfig::parse("")?, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_tracing(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Stop the tick loop and the host API on Ctrl-C.
fn spawn_ctrl_c_handler(operator: Arc<OperatorState>, shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, shutting down");
                operator.request_stop();
                shutdown.notify_one();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}
