use async_trait::async_trait;

mod error;
mod http;
pub mod models;

pub use error::ApiError;
pub use http::{DEFAULT_BASE_URL, HttpYouTubeApi};
pub use models::{
    CommentThread, CommentThreadListResponse, SearchListResponse, SearchResult, VideoListResponse,
    VideoStatistics,
};

/// Largest page size the Data API accepts for list calls
pub const MAX_RESULTS: u32 = 50;

/// Filter for one page of a channel's uploads within a publish window
#[derive(Debug, Clone, Copy)]
pub struct SearchParams<'a> {
    pub channel_id: &'a str,
    /// RFC 3339 lower bound, inclusive
    pub published_after: &'a str,
    /// RFC 3339 upper bound, inclusive
    pub published_before: &'a str,
    pub page_token: Option<&'a str>,
}

/// The three Data API capabilities the exporter relies on.
///
/// Implemented over HTTP by [`HttpYouTubeApi`]; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    /// `search.list?part=id,snippet` restricted to a channel and window
    async fn search_videos(&self, params: SearchParams<'_>) -> Result<SearchListResponse, ApiError>;

    /// `videos.list?part=statistics` for a single video
    async fn video_statistics(&self, video_id: &str) -> Result<VideoListResponse, ApiError>;

    /// `commentThreads.list?part=snippet` for a single video
    async fn comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadListResponse, ApiError>;
}
