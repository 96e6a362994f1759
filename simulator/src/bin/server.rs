use failure_sim::server::create_router;

#[tokio::main]
async fn main() {
    failure_sim::env_config::init_tracing();
    let port = failure_sim::env_config::server_port();

    let app = create_router();

    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(err) => {
            tracing::error!(%addr, error = %err, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(port, "failure simulation server running; press Ctrl+C to stop");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }

    tracing::info!("server stopped");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
    }
}
