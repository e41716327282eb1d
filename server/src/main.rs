use server::config::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use youtube_client::{HttpYouTubeApi, YouTubeApi};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    server::telemetry::init();

    let config =
        Config::from_env().inspect_err(|err| tracing::error!(%err, "invalid configuration"))?;
    let api: Arc<dyn YouTubeApi> = Arc::new(HttpYouTubeApi::with_base_url(
        config.api_key.as_str(),
        config.api_base_url.as_str(),
    ));
    let app = server::app(api, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        static_dir = %config.static_dir.display(),
        upstream = %config.api_base_url,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
