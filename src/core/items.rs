//! Generic CRUD client for flat REST collections
//!
//! Covers the `/items` and `/movies` resources: list, get, create, update,
//! delete against `<collection>/` and `<collection>/{id}`. These are plain
//! request/response calls; any loading/error presentation belongs to the
//! caller, not here.

use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::api_client::CatalogApi;
use crate::core::errors::FetchResult;

/// Typed CRUD handle for one collection path.
///
/// `T` is the record type, `N` the creation payload, `U` the partial
/// update payload. Obtained from `CatalogApi::items()` / `::movies()`.
pub struct RestResource<T, N, U> {
    api: Arc<CatalogApi>,
    /// Collection path relative to the API base, with trailing slash,
    /// e.g. `items/`.
    collection: &'static str,
    _marker: PhantomData<fn() -> (T, N, U)>,
}

impl<T, N, U> Clone for RestResource<T, N, U> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            collection: self.collection,
            _marker: PhantomData,
        }
    }
}

impl<T, N, U> RestResource<T, N, U>
where
    T: DeserializeOwned,
    N: Serialize + Sync,
    U: Serialize + Sync,
{
    pub(crate) fn new(api: Arc<CatalogApi>, collection: &'static str) -> Self {
        Self {
            api,
            collection,
            _marker: PhantomData,
        }
    }

    /// `GET <collection>/` with skip/limit pagination.
    pub async fn list(&self, skip: usize, limit: usize) -> FetchResult<Vec<T>> {
        let url = self.api.endpoint(self.collection)?;
        self.api
            .execute(
                self.api
                    .request(Method::GET, url)
                    .query(&[("skip", skip), ("limit", limit)]),
            )
            .await
    }

    /// `GET <collection>/{id}`.
    pub async fn get(&self, id: i64) -> FetchResult<T> {
        let url = self.api.endpoint(&format!("{}{id}", self.collection))?;
        self.api.execute(self.api.request(Method::GET, url)).await
    }

    /// `POST <collection>/`.
    pub async fn create(&self, payload: &N) -> FetchResult<T> {
        let url = self.api.endpoint(self.collection)?;
        self.api
            .execute(self.api.request(Method::POST, url).json(payload))
            .await
    }

    /// `PUT <collection>/{id}`.
    pub async fn update(&self, id: i64, payload: &U) -> FetchResult<T> {
        let url = self.api.endpoint(&format!("{}{id}", self.collection))?;
        self.api
            .execute(self.api.request(Method::PUT, url).json(payload))
            .await
    }

    /// `DELETE <collection>/{id}`; returns the deleted record.
    pub async fn delete(&self, id: i64) -> FetchResult<T> {
        let url = self.api.endpoint(&format!("{}{id}", self.collection))?;
        self.api.execute(self.api.request(Method::DELETE, url)).await
    }
}
