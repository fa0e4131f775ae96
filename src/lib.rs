//! Video Catalog Client - Core Library
//!
//! Client-side engine for browsing a remote catalog of videos, channels
//! and playlists: typed API client, paginated list stores with
//! staleness-safe loading, and a generic CRUD handle for flat resources.

pub mod core;

// Re-export commonly used types
pub use crate::core::{
    api_client::{CatalogApi, ChannelImportOptions, VideoFilter},
    config::ClientConfig,
    errors::{FetchError, FetchResult},
    items::RestResource,
    list_store::{ListEvent, ListState, ListStatus, RemoteListStore},
    models::{Channel, ImportReport, Item, Movie, Playlist, ViewCount},
    stores::{ChannelStore, PlaylistStore, VideoStore},
};

use std::sync::Arc;

/// Aggregate client state: one API handle plus the three catalog stores.
///
/// Replaces any notion of process-wide store singletons; construct one per
/// backend (or per test) and clone the stores into their owning views.
#[derive(Clone)]
pub struct CatalogClient {
    pub api: Arc<CatalogApi>,
    pub videos: VideoStore,
    pub channels: ChannelStore,
    pub playlists: PlaylistStore,
    pub config: ClientConfig,
}

impl CatalogClient {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let api = Arc::new(CatalogApi::new(&config)?);

        Ok(Self {
            videos: VideoStore::new(Arc::clone(&api), config.page_size),
            channels: ChannelStore::new(Arc::clone(&api), config.page_size),
            playlists: PlaylistStore::new(Arc::clone(&api), config.page_size),
            api,
            config,
        })
    }

    /// Build a client from the persisted configuration, creating a default
    /// config file when none exists.
    pub fn from_saved_config() -> anyhow::Result<Self> {
        let config = ClientConfig::load()?;
        Self::new(config)
    }
}
