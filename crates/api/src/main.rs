use anyhow::Context;
use people_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    people_observability::init();

    let settings = Settings::load().context("failed to load configuration")?;
    let connection_string = settings.default_connection_string()?;

    let services = people_api::app::services::connect(connection_string)
        .await
        .context("failed to initialise people storage")?;
    let app = people_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind_address))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
