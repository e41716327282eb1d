use std::sync::Arc;
use upstream_mock::{MockVideo, MockYouTube, spawn};
use youtube_client::{ApiError, HttpYouTubeApi, SearchParams, YouTubeApi};

async fn client_for(mock: &Arc<MockYouTube>, key: &str) -> HttpYouTubeApi {
    let addr = spawn(mock.clone()).await.unwrap();
    HttpYouTubeApi::with_base_url(key, format!("http://{}/youtube/v3", addr))
}

#[tokio::test]
async fn search_sends_window_page_size_and_cursor() {
    let mock = Arc::new(MockYouTube::new(1));
    mock.add_video("UC1", MockVideo::new("v1", "First", "2024-02-01T10:00:00Z"));
    mock.add_video("UC1", MockVideo::new("v2", "Second", "2024-02-02T10:00:00Z"));
    let api = client_for(&mock, "secret").await;

    let mut params = SearchParams {
        channel_id: "UC1",
        published_after: "2024-02-01T00:00:00Z",
        published_before: "2024-02-28T23:59:59Z",
        page_token: None,
    };
    let first = api.search_videos(params).await.unwrap();
    assert_eq!(first.items[0].id.video_id.as_deref(), Some("v1"));
    let cursor = first.next_cursor().unwrap().to_string();

    params.page_token = Some(&cursor);
    let second = api.search_videos(params).await.unwrap();
    assert_eq!(second.items[0].id.video_id.as_deref(), Some("v2"));
    assert_eq!(second.next_cursor(), None);

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    let query = &requests[0].query;
    assert_eq!(requests[0].resource, "search");
    assert_eq!(query["key"], "secret");
    assert_eq!(query["part"], "id,snippet");
    assert_eq!(query["channelId"], "UC1");
    assert_eq!(query["maxResults"], "50");
    assert_eq!(query["publishedAfter"], "2024-02-01T00:00:00Z");
    assert_eq!(query["publishedBefore"], "2024-02-28T23:59:59Z");
    assert!(!query.contains_key("pageToken"));
    assert_eq!(requests[1].query["pageToken"], cursor);
}

#[tokio::test]
async fn statistics_and_comment_threads_decode() {
    let mock = Arc::new(MockYouTube::new(50));
    mock.add_video(
        "UC1",
        MockVideo::new("v1", "First", "2024-02-01T10:00:00Z").with_statistics(100, 7, 2),
    );
    mock.add_comment("v1", "alice", "hello", "2024-02-01T11:00:00Z", 4);
    let api = client_for(&mock, "secret").await;

    let stats = api.video_statistics("v1").await.unwrap();
    let counts = stats.items[0].statistics.as_ref().unwrap();
    assert_eq!(counts.view_count.as_deref(), Some("100"));

    let threads = api.comment_threads("v1", None).await.unwrap();
    let top = &threads.items[0].snippet.top_level_comment.snippet;
    assert_eq!(top.author_display_name, "alice");
    assert_eq!(top.text_display, "hello");

    let requests = mock.requests();
    assert_eq!(requests[0].query["part"], "statistics");
    assert_eq!(requests[0].query["id"], "v1");
    assert_eq!(requests[1].resource, "commentThreads");
    assert_eq!(requests[1].query["maxResults"], "50");
}

#[tokio::test]
async fn missing_key_is_rejected_upstream() {
    let mock = Arc::new(MockYouTube::default());
    let api = client_for(&mock, "").await;

    let err = api.comment_threads("v1", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 403, .. }));
}

#[tokio::test]
async fn quota_error_keeps_upstream_body() {
    let mock = Arc::new(MockYouTube::default());
    mock.fail_on_call(1);
    let api = client_for(&mock, "secret").await;

    let err = api.video_statistics("v1").await.unwrap_err();
    match &err {
        ApiError::Status { status, body } => {
            assert_eq!(*status, 403);
            assert!(body.contains("quotaExceeded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("YouTube API error 403"));
}
