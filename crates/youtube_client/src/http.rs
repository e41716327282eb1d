use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    ApiError, CommentThreadListResponse, MAX_RESULTS, SearchListResponse, SearchParams,
    VideoListResponse, YouTubeApi,
};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Data API client authorised with a single developer key
#[derive(Debug, Clone)]
pub struct HttpYouTubeApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpYouTubeApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at another host, e.g. a local mock of the API
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn list<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, resource);
        tracing::debug!(%url, ?query, "calling YouTube API");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| ApiError::Decode { resource, source })
    }
}

#[async_trait]
impl YouTubeApi for HttpYouTubeApi {
    async fn search_videos(&self, params: SearchParams<'_>) -> Result<SearchListResponse, ApiError> {
        let max_results = MAX_RESULTS.to_string();
        let mut query = vec![
            ("part", "id,snippet"),
            ("channelId", params.channel_id),
            ("publishedAfter", params.published_after),
            ("publishedBefore", params.published_before),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = params.page_token {
            query.push(("pageToken", token));
        }

        self.list("search", &query).await
    }

    async fn video_statistics(&self, video_id: &str) -> Result<VideoListResponse, ApiError> {
        self.list("videos", &[("part", "statistics"), ("id", video_id)])
            .await
    }

    async fn comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadListResponse, ApiError> {
        let max_results = MAX_RESULTS.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        self.list("commentThreads", &query).await
    }
}
