use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use chrono::NaiveDate;
use domain::{ServiceError, VideoRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use youtube_client::{ApiError, SearchParams, VideoStatistics, YouTubeApi};

/// Request body for `/fetch-data`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchDataRequest {
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FetchDataResponse {
    pub videos: Vec<VideoRecord>,
}

/// Inclusive publish window covering whole calendar days
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishWindow {
    pub published_after: String,
    pub published_before: String,
}

impl PublishWindow {
    /// Expand `YYYY-MM-DD` dates to `start 00:00:00Z ..= end 23:59:59Z`
    pub fn from_dates(start_date: &str, end_date: &str) -> Result<Self, ServiceError> {
        let start = parse_date("startDate", start_date)?;
        let end = parse_date("endDate", end_date)?;
        if start > end {
            return Err(ServiceError::validation(
                "startDate must not be after endDate",
            ));
        }

        Ok(Self {
            published_after: format!("{}T00:00:00Z", start.format("%Y-%m-%d")),
            published_before: format!("{}T23:59:59Z", end.format("%Y-%m-%d")),
        })
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ServiceError::validation(format!(
            "Invalid {} '{}': expected YYYY-MM-DD",
            field, value
        ))
    })
}

fn parse_count(name: &str, value: Option<&str>) -> Result<u64, ApiError> {
    match value {
        None => Ok(0),
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::Malformed(format!("{} '{}' is not a number", name, raw))
        }),
    }
}

async fn lookup_statistics(
    api: &dyn YouTubeApi,
    video_id: &str,
) -> Result<VideoStatistics, ApiError> {
    let response = api.video_statistics(video_id).await?;
    let video = response.items.into_iter().next().ok_or_else(|| {
        ApiError::Malformed(format!("no statistics returned for video {}", video_id))
    })?;
    Ok(video.statistics.unwrap_or_default())
}

/// Fetch every video a channel published within the date window, with counters.
///
/// Pages through `search.list` until no cursor is returned and looks up the
/// statistics of each video result one at a time. Results that are not videos
/// are skipped. Any failed call fails the whole fetch.
pub async fn fetch_videos(
    api: &dyn YouTubeApi,
    channel_id: &str,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<VideoRecord>, ServiceError> {
    let (channel_id, start_date, end_date) = (channel_id.trim(), start_date.trim(), end_date.trim());
    if channel_id.is_empty() || start_date.is_empty() || end_date.is_empty() {
        return Err(ServiceError::validation("Missing required parameters"));
    }
    let window = PublishWindow::from_dates(start_date, end_date)?;

    let mut videos = Vec::new();
    let mut page_token: Option<String> = None;
    let mut page = 0;

    loop {
        let response = api
            .search_videos(SearchParams {
                channel_id,
                published_after: &window.published_after,
                published_before: &window.published_before,
                page_token: page_token.as_deref(),
            })
            .await?;
        page += 1;
        tracing::debug!(
            channel_id,
            page,
            items = response.items.len(),
            has_more = response.next_cursor().is_some(),
            "fetched search page"
        );

        for item in &response.items {
            let Some(video_id) = item.id.video_id.as_deref() else {
                continue;
            };

            let stats = lookup_statistics(api, video_id).await?;
            videos.push(VideoRecord {
                video_id: video_id.to_string(),
                title: item.snippet.title.clone(),
                published_at: item.snippet.published_at.clone(),
                view_count: parse_count("viewCount", stats.view_count.as_deref())?,
                like_count: parse_count("likeCount", stats.like_count.as_deref())?,
                comment_count: parse_count("commentCount", stats.comment_count.as_deref())?,
            });
        }

        page_token = response.next_cursor().map(str::to_string);
        if page_token.is_none() {
            break;
        }
    }

    tracing::info!(channel_id, count = videos.len(), pages = page, "fetched videos");
    Ok(videos)
}

async fn fetch_data_handler(
    State(api): State<Arc<dyn YouTubeApi>>,
    Json(request): Json<FetchDataRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let videos = fetch_videos(
        api.as_ref(),
        request.channel_id.as_deref().unwrap_or_default(),
        request.start_date.as_deref().unwrap_or_default(),
        request.end_date.as_deref().unwrap_or_default(),
    )
    .await?;

    Ok(Json(FetchDataResponse { videos }))
}

/// Create the router for the video API
pub fn create_router(api: Arc<dyn YouTubeApi>) -> Router {
    Router::new()
        .route("/fetch-data", post(fetch_data_handler))
        .with_state(api)
}
