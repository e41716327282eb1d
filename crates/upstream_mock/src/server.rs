use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use youtube_client::{ApiError, SearchParams, YouTubeApi};

use crate::MockYouTube;

type Params = HashMap<String, String>;

/// A request received by the HTTP mock, for asserting on what the client sent
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub resource: &'static str,
    pub query: Params,
}

impl MockYouTube {
    /// Requests received over HTTP, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .read()
            .expect("Failed to acquire read lock on requests")
            .clone()
    }

    fn record_request(&self, resource: &'static str, query: &Params) {
        self.requests
            .write()
            .expect("Failed to acquire write lock on requests")
            .push(RecordedRequest {
                resource,
                query: query.clone(),
            });
    }
}

fn param<'a>(params: &'a Params, name: &str) -> &'a str {
    params.get(name).map(String::as_str).unwrap_or_default()
}

fn missing_key() -> Response {
    let body = serde_json::json!({
        "error": {
            "code": 403,
            "message": "The request is missing a valid API key.",
            "errors": [{ "reason": "forbidden" }]
        }
    });
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(ApiError::Status { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

async fn search_list(
    State(mock): State<Arc<MockYouTube>>,
    Query(params): Query<Params>,
) -> Response {
    mock.record_request("search", &params);
    if param(&params, "key").is_empty() {
        return missing_key();
    }

    let search = SearchParams {
        channel_id: param(&params, "channelId"),
        published_after: param(&params, "publishedAfter"),
        published_before: param(&params, "publishedBefore"),
        page_token: params.get("pageToken").map(String::as_str),
    };
    respond(mock.search_videos(search).await)
}

async fn videos_list(
    State(mock): State<Arc<MockYouTube>>,
    Query(params): Query<Params>,
) -> Response {
    mock.record_request("videos", &params);
    if param(&params, "key").is_empty() {
        return missing_key();
    }

    respond(mock.video_statistics(param(&params, "id")).await)
}

async fn comment_threads_list(
    State(mock): State<Arc<MockYouTube>>,
    Query(params): Query<Params>,
) -> Response {
    mock.record_request("commentThreads", &params);
    if param(&params, "key").is_empty() {
        return missing_key();
    }

    let page_token = params.get("pageToken").map(String::as_str);
    respond(mock.comment_threads(param(&params, "videoId"), page_token).await)
}

/// Create the router serving the mock under the real API's paths
pub fn create_router(mock: Arc<MockYouTube>) -> Router {
    Router::new()
        .route("/youtube/v3/search", get(search_list))
        .route("/youtube/v3/videos", get(videos_list))
        .route("/youtube/v3/commentThreads", get(comment_threads_list))
        .with_state(mock)
}

/// Serve the mock on an ephemeral localhost port and return its address
pub async fn spawn(mock: Arc<MockYouTube>) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = create_router(mock);

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            tracing::error!(%err, "mock YouTube API server stopped");
        }
    });

    tracing::debug!(%addr, "mock YouTube API listening");
    Ok(addr)
}
