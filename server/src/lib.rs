use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use youtube_client::YouTubeApi;

pub mod config;
pub mod telemetry;

/// Assemble the JSON routes and the static frontend around one shared API client
pub fn app(api: Arc<dyn YouTubeApi>, static_dir: &Path) -> Router {
    Router::new()
        .merge(video_service::create_router(api.clone()))
        .merge(comment_service::create_router(api.clone()))
        .merge(export_service::create_router(api))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}
