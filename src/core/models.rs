//! Core data models for the video catalog client
//!
//! Wire shapes match the catalog backend's JSON. Optional fields the
//! backend sometimes omits deserialize to `None`/defaults so older servers
//! keep working.

use serde::{Deserialize, Serialize};

/// A catalog channel as returned by `GET /channels/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub rutube_id: String,
    pub title: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub videos_count: u64,
}

/// A catalog playlist as returned by `GET /playlists/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: i64,
    pub rutube_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub videos_count: u64,
}

/// A catalog movie, as returned by `GET /movies/` and the playlist video
/// listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub year: i32,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub views: u64,
    pub added_at: Option<chrono::DateTime<chrono::Utc>>,
    /// When the video was published on its channel; the default list order.
    pub channel_added_at: Option<chrono::DateTime<chrono::Utc>>,
    pub source_url: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub channel_id: Option<i64>,
    pub rutube_video_id: Option<String>,
    pub channel: Option<Channel>,
}

/// Payload for creating a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCreate {
    pub title: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rutube_video_id: Option<String>,
}

/// Partial update payload for a movie. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<i64>,
}

/// Generic "items" resource record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Payload for creating an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update payload for an item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response of `POST /videos/{id}/increment-views`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCount {
    pub views: u64,
}

/// Response of the playlist/channel import endpoints.
///
/// The backend returns ad-hoc counters; only the fields the client acts on
/// are typed, everything else is preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Database id of the imported playlist, when the import created or
    /// matched one. Callers use it to auto-select the new playlist.
    pub playlist_id: Option<i64>,
    pub imported: Option<u64>,
    pub skipped: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}
