use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use comment_service::collect_comment_threads;
use domain::{ExportComment, ServiceError, VideoRecordLike};
use serde::Deserialize;
use std::sync::Arc;
use youtube_client::YouTubeApi;

pub mod workbook;

use workbook::{Row, Table};

pub const EXPORT_FILENAME: &str = "youtube_data.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Request body for `/download-excel`
#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub videos: Vec<VideoRecordLike>,
}

fn required_str<'a>(
    video: &'a VideoRecordLike,
    key: &str,
    index: usize,
) -> Result<&'a str, ServiceError> {
    video
        .get(key)
        .and_then(|value| value.as_str())
        .ok_or_else(|| ServiceError::validation(format!("videos[{}] is missing {}", index, key)))
}

fn comment_row(comment: &ExportComment) -> Result<Row, ServiceError> {
    match serde_json::to_value(comment) {
        Ok(serde_json::Value::Object(row)) => Ok(row),
        Ok(_) => Err(ServiceError::Internal("comment did not serialize to an object".to_string())),
        Err(err) => Err(ServiceError::Internal(err.to_string())),
    }
}

/// Fetch the comments of every video and render both lists as a workbook.
///
/// The "Videos" sheet echoes the input rows as given; the "Comments" sheet has
/// one row per top-level comment tagged with its video's id and title. Fails
/// as a whole if any video's comments cannot be fetched.
pub async fn build_export(
    api: &dyn YouTubeApi,
    videos: &[VideoRecordLike],
) -> Result<Vec<u8>, ServiceError> {
    let mut sources = Vec::with_capacity(videos.len());
    for (i, video) in videos.iter().enumerate() {
        sources.push((required_str(video, "videoId", i)?, required_str(video, "title", i)?));
    }

    let mut comment_rows = Vec::new();
    for (video_id, title) in sources {
        let comments = collect_comment_threads(api, video_id).await?;
        tracing::debug!(video_id, count = comments.len(), "collected comments for export");
        for comment in comments {
            comment_rows.push(comment_row(&ExportComment::tagged(comment, title))?);
        }
    }

    let tables = [
        Table::from_rows("Videos", videos.to_vec()),
        Table::from_rows("Comments", comment_rows),
    ];
    let bytes = workbook::render(&tables).map_err(|err| ServiceError::Internal(err.to_string()))?;

    tracing::info!(
        videos = tables[0].rows.len(),
        comments = tables[1].rows.len(),
        bytes = bytes.len(),
        "built export workbook"
    );
    Ok(bytes)
}

async fn download_excel_handler(
    State(api): State<Arc<dyn YouTubeApi>>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, ServiceError> {
    let bytes = build_export(api.as_ref(), &request.videos).await?;

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Create the router for the export API
pub fn create_router(api: Arc<dyn YouTubeApi>) -> Router {
    Router::new()
        .route("/download-excel", post(download_excel_handler))
        .with_state(api)
}
