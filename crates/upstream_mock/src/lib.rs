//! In-memory stand-in for the Data API.
//!
//! [`MockYouTube`] answers the same three list calls as the real service with
//! offset-based page tokens, so paging loops always terminate once the seeded
//! data is exhausted. It can be used directly as a [`YouTubeApi`] or served
//! over HTTP with [`create_router`].

use async_trait::async_trait;
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use youtube_client::models::{
    Comment, CommentSnippet, CommentThread, CommentThreadSnippet, PageInfo, ResourceId,
    SearchResult, SearchSnippet, VideoResource,
};
use youtube_client::{
    ApiError, CommentThreadListResponse, SearchListResponse, SearchParams, VideoListResponse,
    VideoStatistics, YouTubeApi,
};

mod server;

pub use server::{RecordedRequest, create_router, spawn};

/// A video as seeded into the mock
#[derive(Debug, Clone)]
pub struct MockVideo {
    pub id: String,
    pub title: String,
    pub published_at: String,
    pub statistics: VideoStatistics,
}

impl MockVideo {
    pub fn new(id: &str, title: &str, published_at: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            published_at: published_at.to_string(),
            statistics: VideoStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, views: u64, likes: u64, comments: u64) -> Self {
        self.statistics = VideoStatistics {
            view_count: Some(views.to_string()),
            like_count: Some(likes.to_string()),
            comment_count: Some(comments.to_string()),
        };
        self
    }
}

pub struct MockYouTube {
    page_size: usize,
    search_results: RwLock<HashMap<String, Vec<SearchResult>>>,
    statistics: RwLock<HashMap<String, VideoStatistics>>,
    comment_threads: RwLock<HashMap<String, Vec<CommentThread>>>,
    calls: AtomicUsize,
    // 1-based index of the call that should fail
    fail_on_call: RwLock<Option<usize>>,
    requests: RwLock<Vec<RecordedRequest>>,
}

impl MockYouTube {
    /// Create an empty mock returning at most `page_size` items per page
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            search_results: RwLock::new(HashMap::new()),
            statistics: RwLock::new(HashMap::new()),
            comment_threads: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            fail_on_call: RwLock::new(None),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Add an upload to a channel's search results and register its statistics
    pub fn add_video(&self, channel_id: &str, video: MockVideo) {
        let result = SearchResult {
            id: ResourceId {
                kind: "youtube#video".to_string(),
                video_id: Some(video.id.clone()),
                ..Default::default()
            },
            snippet: SearchSnippet {
                published_at: video.published_at,
                channel_id: channel_id.to_string(),
                title: video.title,
            },
        };
        self.push_search_result(channel_id, result);
        self.statistics
            .write()
            .expect("Failed to acquire write lock on statistics")
            .insert(video.id, video.statistics);
    }

    /// Add a search result that is the channel itself rather than a video
    pub fn add_channel_result(&self, channel_id: &str, published_at: &str) {
        let result = SearchResult {
            id: ResourceId {
                kind: "youtube#channel".to_string(),
                channel_id: Some(channel_id.to_string()),
                ..Default::default()
            },
            snippet: SearchSnippet {
                published_at: published_at.to_string(),
                channel_id: channel_id.to_string(),
                title: format!("Channel {}", channel_id),
            },
        };
        self.push_search_result(channel_id, result);
    }

    /// Remove the statistics of a video so `videos.list` answers with no items
    pub fn remove_statistics(&self, video_id: &str) {
        self.statistics
            .write()
            .expect("Failed to acquire write lock on statistics")
            .remove(video_id);
    }

    /// Add a comment thread with `reply_count` replies that should never be read
    pub fn add_comment(
        &self,
        video_id: &str,
        author: &str,
        text: &str,
        published_at: &str,
        reply_count: u64,
    ) {
        let mut threads = self
            .comment_threads
            .write()
            .expect("Failed to acquire write lock on comment_threads");
        let entry = threads.entry(video_id.to_string()).or_default();
        let id = format!("thread-{}-{}", video_id, entry.len());
        entry.push(CommentThread {
            id: id.clone(),
            snippet: CommentThreadSnippet {
                video_id: Some(video_id.to_string()),
                top_level_comment: Comment {
                    id,
                    snippet: CommentSnippet {
                        author_display_name: author.to_string(),
                        text_display: text.to_string(),
                        published_at: published_at.to_string(),
                    },
                },
                total_reply_count: reply_count,
            },
        });
    }

    /// Add `count` comments with generated authors and text
    pub fn seed_comments(&self, video_id: &str, count: usize) {
        for i in 0..count {
            let author: String = Name().fake();
            let text: String = Sentence(3..10).fake();
            let published_at = format!("2024-01-01T00:{:02}:{:02}Z", (i / 60) % 60, i % 60);
            self.add_comment(video_id, &author, &text, &published_at, 0);
        }
    }

    /// Make the `n`-th upstream call (1-based, counted from now on) fail with a quota error
    pub fn fail_on_call(&self, n: usize) {
        let target = self.call_count() + n;
        *self
            .fail_on_call
            .write()
            .expect("Failed to acquire write lock on fail_on_call") = Some(target);
    }

    /// Number of upstream calls answered or failed so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push_search_result(&self, channel_id: &str, result: SearchResult) {
        self.search_results
            .write()
            .expect("Failed to acquire write lock on search_results")
            .entry(channel_id.to_string())
            .or_default()
            .push(result);
    }

    fn record_call(&self) -> Result<(), ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_on = *self
            .fail_on_call
            .read()
            .expect("Failed to acquire read lock on fail_on_call");
        if fail_on == Some(call) {
            return Err(ApiError::Status {
                status: 403,
                body: QUOTA_EXCEEDED.to_string(),
            });
        }
        Ok(())
    }

    fn page<T: Clone>(
        &self,
        items: &[T],
        page_token: Option<&str>,
    ) -> Result<(Vec<T>, Option<String>, PageInfo), ApiError> {
        let offset = match page_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .ok()
                .filter(|offset| *offset <= items.len())
                .ok_or_else(|| ApiError::Status {
                    status: 400,
                    body: format!("invalid pageToken '{}'", token),
                })?,
        };
        let end = (offset + self.page_size).min(items.len());
        let next = (end < items.len()).then(|| end.to_string());
        let info = PageInfo {
            total_results: items.len() as i32,
            results_per_page: self.page_size as i32,
        };
        Ok((items[offset..end].to_vec(), next, info))
    }
}

impl Default for MockYouTube {
    fn default() -> Self {
        Self::new(youtube_client::MAX_RESULTS as usize)
    }
}

pub const QUOTA_EXCEEDED: &str =
    r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota.","errors":[{"reason":"quotaExceeded"}]}}"#;

#[async_trait]
impl YouTubeApi for MockYouTube {
    async fn search_videos(&self, params: SearchParams<'_>) -> Result<SearchListResponse, ApiError> {
        self.record_call()?;

        let matching: Vec<SearchResult> = self
            .search_results
            .read()
            .expect("Failed to acquire read lock on search_results")
            .get(params.channel_id)
            .map(|results| {
                results
                    .iter()
                    .filter(|r| {
                        // RFC 3339 timestamps in UTC compare correctly as strings
                        r.snippet.published_at.as_str() >= params.published_after
                            && r.snippet.published_at.as_str() <= params.published_before
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let (items, next_page_token, page_info) = self.page(&matching, params.page_token)?;
        Ok(SearchListResponse {
            kind: "youtube#searchListResponse".to_string(),
            next_page_token,
            page_info: Some(page_info),
            items,
        })
    }

    async fn video_statistics(&self, video_id: &str) -> Result<VideoListResponse, ApiError> {
        self.record_call()?;

        let items = self
            .statistics
            .read()
            .expect("Failed to acquire read lock on statistics")
            .get(video_id)
            .map(|statistics| VideoResource {
                id: video_id.to_string(),
                statistics: Some(statistics.clone()),
            })
            .into_iter()
            .collect();

        Ok(VideoListResponse {
            kind: "youtube#videoListResponse".to_string(),
            items,
        })
    }

    async fn comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadListResponse, ApiError> {
        self.record_call()?;

        let threads = self
            .comment_threads
            .read()
            .expect("Failed to acquire read lock on comment_threads")
            .get(video_id)
            .cloned()
            .unwrap_or_default();

        let (items, next_page_token, page_info) = self.page(&threads, page_token)?;
        Ok(CommentThreadListResponse {
            kind: "youtube#commentThreadListResponse".to_string(),
            next_page_token,
            page_info: Some(page_info),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(channel_id: &'a str, page_token: Option<&'a str>) -> SearchParams<'a> {
        SearchParams {
            channel_id,
            published_after: "2024-01-01T00:00:00Z",
            published_before: "2024-12-31T23:59:59Z",
            page_token,
        }
    }

    #[tokio::test]
    async fn pages_until_data_is_exhausted() {
        let mock = MockYouTube::new(2);
        for i in 0..5 {
            mock.add_video(
                "UC1",
                MockVideo::new(&format!("v{}", i), "t", "2024-03-01T00:00:00Z"),
            );
        }

        let first = mock.search_videos(params("UC1", None)).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_cursor(), Some("2"));

        let second = mock.search_videos(params("UC1", Some("2"))).await.unwrap();
        assert_eq!(second.next_cursor(), Some("4"));

        let last = mock.search_videos(params("UC1", Some("4"))).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.next_cursor(), None);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn search_respects_publish_window() {
        let mock = MockYouTube::new(50);
        mock.add_video("UC1", MockVideo::new("old", "t", "2023-12-31T23:59:59Z"));
        mock.add_video("UC1", MockVideo::new("in", "t", "2024-06-01T12:00:00Z"));
        mock.add_video("UC1", MockVideo::new("new", "t", "2025-01-01T00:00:00Z"));

        let page = mock.search_videos(params("UC1", None)).await.unwrap();
        let ids: Vec<_> = page.items.iter().filter_map(|r| r.id.video_id.clone()).collect();
        assert_eq!(ids, ["in"]);
    }

    #[tokio::test]
    async fn injected_failure_hits_the_requested_call() {
        let mock = MockYouTube::new(1);
        mock.seed_comments("v1", 3);
        mock.fail_on_call(2);

        assert!(mock.comment_threads("v1", None).await.is_ok());
        let err = mock.comment_threads("v1", Some("1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 403, .. }));
        assert!(mock.comment_threads("v1", Some("1")).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_page_token_is_rejected() {
        let mock = MockYouTube::new(1);
        let err = mock.comment_threads("v1", Some("bogus")).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
    }
}
