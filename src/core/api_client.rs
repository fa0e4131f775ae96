//! HTTP client for the catalog REST API
//!
//! One `reqwest::Client` per `CatalogApi`, built from `ClientConfig`.
//! Non-success statuses become `FetchError::Status` carrying the server's
//! `detail` message when the error body is JSON; transport failures become
//! `FetchError::Network`. No retries happen here - a caller retries by
//! re-issuing the operation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::core::config::ClientConfig;
use crate::core::errors::{FetchError, FetchResult};
use crate::core::items::RestResource;
use crate::core::models::{
    Channel, ImportReport, Item, ItemPatch, Movie, MovieCreate, MovieUpdate, NewItem, Playlist,
    ViewCount,
};
use crate::core::transport::PageTransport;

/// Options for `POST /channels/import`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelImportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_videos_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_playlists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_playlist_limit: Option<u64>,
}

/// Client for the catalog backend.
pub struct CatalogApi {
    client: Client,
    base_url: Url,
    order: String,
    auth_token: Option<String>,
}

impl CatalogApi {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
            order: config.order.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// `GET /playlists/` - the full playlist collection, paginated.
    pub async fn list_playlists(&self, skip: usize, limit: usize) -> FetchResult<Vec<Playlist>> {
        let url = self.endpoint("playlists/")?;
        self.execute(self.request(Method::GET, url).query(&[("skip", skip), ("limit", limit)]))
            .await
    }

    /// `GET /channels/` - the full channel collection, paginated.
    pub async fn list_channels(&self, skip: usize, limit: usize) -> FetchResult<Vec<Channel>> {
        let url = self.endpoint("channels/")?;
        self.execute(self.request(Method::GET, url).query(&[("skip", skip), ("limit", limit)]))
            .await
    }

    /// `GET /playlists/{id}/videos` - one page of a playlist's videos,
    /// optionally narrowed to a channel, in the configured order.
    pub async fn list_playlist_videos(
        &self,
        playlist_id: i64,
        channel_id: Option<i64>,
        skip: usize,
        limit: usize,
    ) -> FetchResult<Vec<Movie>> {
        let url = self.endpoint(&format!("playlists/{playlist_id}/videos"))?;
        let mut builder = self
            .request(Method::GET, url)
            .query(&[("skip", skip), ("limit", limit)])
            .query(&[("order", self.order.as_str())]);
        if let Some(channel_id) = channel_id {
            builder = builder.query(&[("channelId", channel_id)]);
        }
        self.execute(builder).await
    }

    /// `POST /movies/{id}/increment-views`.
    pub async fn increment_views(&self, movie_id: i64) -> FetchResult<ViewCount> {
        let url = self.endpoint(&format!("movies/{movie_id}/increment-views"))?;
        self.execute(self.request(Method::POST, url)).await
    }

    /// `GET /movies/year/{year}`.
    pub async fn movies_by_year(
        &self,
        year: i32,
        skip: usize,
        limit: usize,
    ) -> FetchResult<Vec<Movie>> {
        let url = self.endpoint(&format!("movies/year/{year}"))?;
        self.execute(self.request(Method::GET, url).query(&[("skip", skip), ("limit", limit)]))
            .await
    }

    /// `GET /movies/genre/{genre}`.
    pub async fn movies_by_genre(
        &self,
        genre: &str,
        skip: usize,
        limit: usize,
    ) -> FetchResult<Vec<Movie>> {
        let url = self.endpoint(&format!("movies/genre/{genre}"))?;
        self.execute(self.request(Method::GET, url).query(&[("skip", skip), ("limit", limit)]))
            .await
    }

    /// `POST /playlists/import` - import a playlist by its public URL.
    pub async fn import_playlist(&self, playlist_url: &str, limit: u64) -> FetchResult<ImportReport> {
        let url = self.endpoint("playlists/import")?;
        debug!(playlist_url, limit, "importing playlist");
        self.execute(
            self.request(Method::POST, url)
                .query(&[("rutube_playlist_url", playlist_url)])
                .query(&[("limit", limit)]),
        )
        .await
    }

    /// `POST /channels/import` - import or create a channel by its public
    /// URL, optionally pulling its recent videos and playlists.
    pub async fn import_channel(
        &self,
        channel_url: &str,
        options: &ChannelImportOptions,
    ) -> FetchResult<ImportReport> {
        let url = self.endpoint("channels/import")?;
        debug!(channel_url, "importing channel");
        self.execute(
            self.request(Method::POST, url)
                .query(&[("rutube_channel_url", channel_url)])
                .query(options),
        )
        .await
    }

    /// CRUD handle for the generic `/items` resource.
    pub fn items(self: &Arc<Self>) -> RestResource<Item, NewItem, ItemPatch> {
        RestResource::new(Arc::clone(self), "items/")
    }

    /// CRUD handle for the `/movies` resource.
    pub fn movies(self: &Arc<Self>) -> RestResource<Movie, MovieCreate, MovieUpdate> {
        RestResource::new(Arc::clone(self), "movies/")
    }

    pub(crate) fn endpoint(&self, path: &str) -> FetchResult<Url> {
        self.base_url.join(path).map_err(|err| FetchError::Network {
            message: format!("invalid endpoint {path}: {err}"),
        })
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> FetchResult<T> {
        let response = builder.send().await.map_err(FetchError::from)?;
        let status = response.status();
        if !status.is_success() {
            let message = error_detail(response).await;
            return Err(FetchError::status(status.as_u16(), message));
        }
        response.json::<T>().await.map_err(FetchError::from)
    }
}

/// Pull the `detail` field out of a JSON error body, if there is one.
async fn error_detail(response: Response) -> Option<String> {
    let body = response.json::<serde_json::Value>().await.ok()?;
    match body.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
        None => None,
    }
}

/// Filter key for the playlist videos list: the selected playlist plus an
/// optional channel narrowing. "No playlist selected" is represented by the
/// store-level `None` sentinel, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFilter {
    pub playlist_id: i64,
    pub channel_id: Option<i64>,
}

/// Page transport over the playlist videos endpoint.
pub struct VideoPages(pub Arc<CatalogApi>);

#[async_trait]
impl PageTransport for VideoPages {
    type Item = Movie;
    type Filter = VideoFilter;

    async fn fetch_page(
        &self,
        filter: &VideoFilter,
        offset: usize,
        limit: usize,
    ) -> FetchResult<Vec<Movie>> {
        self.0
            .list_playlist_videos(filter.playlist_id, filter.channel_id, offset, limit)
            .await
    }
}

/// Page transport over the channel collection.
pub struct ChannelPages(pub Arc<CatalogApi>);

#[async_trait]
impl PageTransport for ChannelPages {
    type Item = Channel;
    type Filter = ();

    async fn fetch_page(&self, _: &(), offset: usize, limit: usize) -> FetchResult<Vec<Channel>> {
        self.0.list_channels(offset, limit).await
    }
}

/// Page transport over the playlist collection.
pub struct PlaylistPages(pub Arc<CatalogApi>);

#[async_trait]
impl PageTransport for PlaylistPages {
    type Item = Playlist;
    type Filter = ();

    async fn fetch_page(&self, _: &(), offset: usize, limit: usize) -> FetchResult<Vec<Playlist>> {
        self.0.list_playlists(offset, limit).await
    }
}
