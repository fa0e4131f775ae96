//! Concrete catalog stores
//!
//! One `RemoteListStore` per collection, wired to the matching page
//! transport, plus the surrounding behavior each view needs: filter
//! composition for videos, selection and import for channels and
//! playlists. Stores are explicitly constructed - there is no global
//! registry; each owning view builds or clones its own handle.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::core::api_client::{
    CatalogApi, ChannelImportOptions, ChannelPages, PlaylistPages, VideoFilter, VideoPages,
};
use crate::core::errors::FetchResult;
use crate::core::list_store::RemoteListStore;
use crate::core::models::{Channel, ImportReport, Movie, Playlist, ViewCount};

/// Paginated videos of the selected playlist, optionally narrowed to a
/// channel.
#[derive(Clone)]
pub struct VideoStore {
    list: RemoteListStore<VideoPages>,
    api: Arc<CatalogApi>,
}

impl VideoStore {
    pub fn new(api: Arc<CatalogApi>, page_size: usize) -> Self {
        Self {
            list: RemoteListStore::new(Arc::new(VideoPages(Arc::clone(&api))), page_size),
            api,
        }
    }

    /// The underlying list store, for snapshots, events and `load_more`.
    pub fn list(&self) -> &RemoteListStore<VideoPages> {
        &self.list
    }

    /// Select which playlist (and optionally which channel within it) the
    /// video list shows. No playlist selected means an empty list and no
    /// network traffic.
    pub async fn set_selection(&self, playlist_id: Option<i64>, channel_id: Option<i64>) {
        let filter = playlist_id.map(|playlist_id| VideoFilter {
            playlist_id,
            channel_id,
        });
        self.list.set_filter(filter).await;
    }

    pub async fn reload(&self) {
        self.list.reload().await;
    }

    pub async fn load_more(&self) {
        self.list.load_more().await;
    }

    pub fn videos(&self) -> Vec<Movie> {
        self.list.items()
    }

    /// Bump a movie's view counter on the server.
    pub async fn increment_views(&self, movie_id: i64) -> FetchResult<ViewCount> {
        self.api.increment_views(movie_id).await
    }
}

/// Paginated channel collection with a selection and channel import.
#[derive(Clone)]
pub struct ChannelStore {
    list: RemoteListStore<ChannelPages>,
    api: Arc<CatalogApi>,
    selected: Arc<RwLock<Option<i64>>>,
}

impl ChannelStore {
    pub fn new(api: Arc<CatalogApi>, page_size: usize) -> Self {
        Self {
            list: RemoteListStore::new(Arc::new(ChannelPages(Arc::clone(&api))), page_size),
            api,
            selected: Arc::new(RwLock::new(None)),
        }
    }

    pub fn list(&self) -> &RemoteListStore<ChannelPages> {
        &self.list
    }

    /// Load the channel collection: first page on first call, fresh first
    /// page afterwards.
    pub async fn refresh(&self) {
        if self.list.filter().is_none() {
            self.list.set_filter(Some(())).await;
        } else {
            self.list.reload().await;
        }
    }

    pub async fn load_more(&self) {
        self.list.load_more().await;
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.list.items()
    }

    pub fn select(&self, channel_id: Option<i64>) {
        *self.selected.write() = channel_id;
    }

    pub fn selected(&self) -> Option<i64> {
        *self.selected.read()
    }

    /// Import or create a channel from its public URL, then refresh the
    /// list. The import call itself reports failure through its result;
    /// the list state is untouched when the import fails.
    pub async fn import_channel(
        &self,
        channel_url: &str,
        options: &ChannelImportOptions,
    ) -> FetchResult<ImportReport> {
        let report = self.api.import_channel(channel_url, options).await?;
        info!(channel_url, "channel import finished");
        self.refresh().await;
        Ok(report)
    }
}

/// Paginated playlist collection with a selection and playlist import.
#[derive(Clone)]
pub struct PlaylistStore {
    list: RemoteListStore<PlaylistPages>,
    api: Arc<CatalogApi>,
    selected: Arc<RwLock<Option<i64>>>,
}

impl PlaylistStore {
    pub fn new(api: Arc<CatalogApi>, page_size: usize) -> Self {
        Self {
            list: RemoteListStore::new(Arc::new(PlaylistPages(Arc::clone(&api))), page_size),
            api,
            selected: Arc::new(RwLock::new(None)),
        }
    }

    pub fn list(&self) -> &RemoteListStore<PlaylistPages> {
        &self.list
    }

    /// Load the playlist collection: first page on first call, fresh first
    /// page afterwards.
    pub async fn refresh(&self) {
        if self.list.filter().is_none() {
            self.list.set_filter(Some(())).await;
        } else {
            self.list.reload().await;
        }
    }

    pub async fn load_more(&self) {
        self.list.load_more().await;
    }

    pub fn playlists(&self) -> Vec<Playlist> {
        self.list.items()
    }

    pub fn select(&self, playlist_id: Option<i64>) {
        *self.selected.write() = playlist_id;
    }

    pub fn selected(&self) -> Option<i64> {
        *self.selected.read()
    }

    /// Import a playlist from its public URL, refresh the list, and select
    /// the imported playlist when the server reports its id.
    pub async fn import_playlist(
        &self,
        playlist_url: &str,
        limit: u64,
    ) -> FetchResult<ImportReport> {
        let report = self.api.import_playlist(playlist_url, limit).await?;
        info!(playlist_url, "playlist import finished");
        self.refresh().await;
        if let Some(playlist_id) = report.playlist_id {
            self.select(Some(playlist_id));
        }
        Ok(report)
    }
}
