//! HTTP server entry point.

use crate::error::ServerError;
use crate::routes::create_router;
use crate::state::AppState;
use masthead_core::config::ResolvedTeam;
use masthead_core::MastheadConfig;
use tokio::net::TcpListener;

/// Bind and serve until Ctrl-C.
pub async fn run(config: MastheadConfig, team: ResolvedTeam) -> Result<(), ServerError> {
    let address = config.server.bind_address();
    let state = AppState::new(&config, team);
    let app = create_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(
        address = %address,
        environment = %config.environment,
        debug_endpoint = config.environment.is_development(),
        "masthead-server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("masthead-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
