use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graphql_schema_police::config::{Config, ConfigError};
use graphql_schema_police::github::GitHubApp;
use graphql_schema_police::server::{AppState, build_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphql_schema_police=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    if let Err(e) = run(config).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), ConfigError> {
    let private_key = config.read_private_key()?;
    let app = GitHubApp::new(config.app_id, &private_key, config.http_timeout())?;

    let state = AppState::new(
        config.webhook_secret.as_bytes(),
        app,
        config.pipeline_settings(),
    );
    let tasks = state.tasks().clone();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .map_err(|source| ConfigError::Bind {
            addr: config.listen,
            source,
        })?;
    info!(addr = %config.listen, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ConfigError::Serve)?;

    tasks.close();
    info!(in_flight = tasks.len(), "Waiting for in-flight deliveries");
    tasks.wait().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
