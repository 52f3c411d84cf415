// src/main.rs - HILLIA governance backend server
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use hillia_backend::auth::hash_password;
use hillia_backend::config;
use hillia_backend::web::api::{AppStateInner, cors_layer, create_router};

/// HILLIA governance backend
#[derive(Parser, Debug)]
#[command(name = "hillia-server", version, about = "Questionnaire intake and admin review API.")]
struct Cli {
    /// Path to a TOML config file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the ADMIN_PASSWORD_HASH value for a password
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    if let Some(Commands::HashPassword { password }) = cli.command {
        println!("{}", hash_password(&password));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting HILLIA Governance Backend v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load(cli.config.as_deref()).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    let addr = config.bind_addr()?;
    let state = AppStateInner::from_config(&config)?;
    let policy = state.guard.policy();
    tracing::info!(
        "Admin lockout after {} failed attempts for {}s",
        policy.max_failed_attempts,
        policy.lockout_duration.as_secs()
    );

    let purge_state = state.clone();
    let purge_interval = config.auth.purge_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_interval);
        loop {
            ticker.tick().await;
            purge_state.guard.purge_expired();
        }
    });

    let app = create_router(state).layer(cors_layer(&config.server.cors_origins));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
