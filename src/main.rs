#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use stockroom::{
    api::{self, AppState},
    config::{self, AppConfig},
    errors::Result,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the real environment
    if dotenv().is_err() {
        info!("No .env file found, using process environment only.");
    }

    // 3. Load and validate configuration; any missing required key aborts start-up
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!(
        port = app_config.port,
        environment = ?app_config.environment,
        "Successfully processed application configuration."
    );

    // 4. Connect and make sure every table exists
    let db = config::database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    let state = AppState::new(db, &app_config);

    // 5. Apply demo data when a seed file is configured
    if let Some(path) = &app_config.seed_file {
        let seed = config::seed::load_seed(path)?;
        config::seed::apply_seed(&state.db, seed, state.bcrypt_cost, &state.tokens)
            .await
            .inspect_err(|e| error!("Failed to apply seed file: {}", e))?;
    }

    // 6. Serve until Ctrl-C or SIGTERM
    let router = api::build_router(state, &app_config)?;
    let listener = TcpListener::bind(("0.0.0.0", app_config.port)).await?;
    info!("stockroom listening on port {}", app_config.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received, draining connections.");
}
