use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use domain::{CommentRecord, ServiceError};
use serde::Deserialize;
use std::sync::Arc;
use youtube_client::{ApiError, CommentThread, YouTubeApi};

/// Request body for `/fetch-comments`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchCommentsRequest {
    #[serde(default)]
    pub video_id: Option<String>,
}

fn to_record(video_id: &str, thread: CommentThread) -> CommentRecord {
    let top = thread.snippet.top_level_comment.snippet;
    CommentRecord {
        video_id: video_id.to_string(),
        author: top.author_display_name,
        comment: top.text_display,
        published_at: top.published_at,
    }
}

/// Walk every page of a video's comment threads and keep the top-level comment
/// of each. Replies are never requested.
pub async fn collect_comment_threads(
    api: &dyn YouTubeApi,
    video_id: &str,
) -> Result<Vec<CommentRecord>, ApiError> {
    let mut comments = Vec::new();
    let mut page_token: Option<String> = None;
    let mut page = 0;

    loop {
        let response = api.comment_threads(video_id, page_token.as_deref()).await?;
        page += 1;
        tracing::debug!(
            video_id,
            page,
            items = response.items.len(),
            has_more = response.next_cursor().is_some(),
            "fetched comment thread page"
        );

        page_token = response.next_cursor().map(str::to_string);
        comments.extend(
            response
                .items
                .into_iter()
                .map(|thread| to_record(video_id, thread)),
        );

        if page_token.is_none() {
            break;
        }
    }

    Ok(comments)
}

/// Fetch every top-level comment on a video
pub async fn fetch_comments(
    api: &dyn YouTubeApi,
    video_id: &str,
) -> Result<Vec<CommentRecord>, ServiceError> {
    if video_id.trim().is_empty() {
        return Err(ServiceError::validation("Missing videoId parameter"));
    }

    let comments = collect_comment_threads(api, video_id).await?;
    tracing::info!(video_id, count = comments.len(), "fetched comments");
    Ok(comments)
}

async fn fetch_comments_handler(
    State(api): State<Arc<dyn YouTubeApi>>,
    Json(request): Json<FetchCommentsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let video_id = request.video_id.unwrap_or_default();
    let comments = fetch_comments(api.as_ref(), &video_id).await?;
    Ok(Json(comments))
}

/// Create the router for the comment API
pub fn create_router(api: Arc<dyn YouTubeApi>) -> Router {
    Router::new()
        .route("/fetch-comments", post(fetch_comments_handler))
        .with_state(api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use upstream_mock::MockYouTube;

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/fetch-comments")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn collects_top_level_comments_across_pages() {
        let mock = MockYouTube::new(2);
        for i in 0..5 {
            mock.add_comment(
                "v1",
                &format!("user{}", i),
                &format!("comment {}", i),
                "2024-01-01T00:00:00Z",
                3,
            );
        }

        let comments = fetch_comments(&mock, "v1").await.unwrap();

        assert_eq!(comments.len(), 5);
        let authors: Vec<_> = comments.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(authors, ["user0", "user1", "user2", "user3", "user4"]);
        assert!(comments.iter().all(|c| c.video_id == "v1"));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn video_without_comments_is_one_call() {
        let mock = MockYouTube::default();
        let comments = fetch_comments(&mock, "v1").await.unwrap();
        assert!(comments.is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn blank_video_id_is_rejected_without_calls() {
        let mock = MockYouTube::default();
        let err = fetch_comments(&mock, "  ").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn video_id_is_queried_as_given() {
        let mock = MockYouTube::default();
        mock.add_comment(" v1 ", "alice", "padded", "2024-01-01T00:00:00Z", 0);
        mock.add_comment("v1", "bob", "trimmed", "2024-01-01T00:00:00Z", 0);

        let comments = fetch_comments(&mock, " v1 ").await.unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "alice");
        assert_eq!(comments[0].video_id, " v1 ");
    }

    #[tokio::test]
    async fn failure_mid_paging_discards_everything() {
        let mock = MockYouTube::new(1);
        mock.seed_comments("v1", 4);
        mock.fail_on_call(3);

        let err = fetch_comments(&mock, "v1").await.unwrap_err();
        match err {
            ServiceError::Upstream(message) => assert!(message.contains("quotaExceeded")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn route_returns_comment_array() {
        let mock = Arc::new(MockYouTube::default());
        mock.add_comment("v1", "alice", "first!", "2024-01-01T00:00:00Z", 0);
        let app = create_router(mock.clone());

        let response = app
            .oneshot(post_json(serde_json::json!({ "videoId": "v1" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!([{
                "videoId": "v1",
                "author": "alice",
                "comment": "first!",
                "publishedAt": "2024-01-01T00:00:00Z"
            }])
        );
    }

    #[tokio::test]
    async fn route_rejects_missing_video_id() {
        let mock = Arc::new(MockYouTube::default());
        let app = create_router(mock.clone());

        let response = app.oneshot(post_json(serde_json::json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Missing videoId parameter");
        assert_eq!(mock.call_count(), 0);
    }
}
