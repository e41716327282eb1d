use serde::{Deserialize, Serialize};

mod error;

pub use error::{ErrorResponse, ServiceError};

/// A video published by a channel, merged from a search result and its statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// The top-level comment of a comment thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub video_id: String,
    pub author: String,
    pub comment: String,
    pub published_at: String,
}

/// A comment row in the export workbook, tagged with the title of its video.
///
/// Field order is the column order of the "Comments" sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportComment {
    pub video_id: String,
    pub video_title: String,
    pub author: String,
    pub comment: String,
    pub published_at: String,
}

impl ExportComment {
    pub fn tagged(record: CommentRecord, video_title: &str) -> Self {
        Self {
            video_id: record.video_id,
            video_title: video_title.to_string(),
            author: record.author,
            comment: record.comment,
            published_at: record.published_at,
        }
    }
}

/// A caller-supplied video row for export. Keys keep their insertion order.
pub type VideoRecordLike = serde_json::Map<String, serde_json::Value>;
