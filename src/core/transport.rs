//! Page transport contract
//!
//! The list stores never talk HTTP directly; they go through this trait so
//! the fetch side can be swapped out in tests and the stores stay
//! independently constructible.

use async_trait::async_trait;

use crate::core::errors::FetchResult;

/// An async source of pages from a remote, filterable collection.
///
/// `fetch_page` returns the items at `[offset, offset + limit)` of the
/// collection identified by `filter`, in server order. Returning fewer than
/// `limit` items (including zero) means the collection is exhausted; it is
/// a valid terminal page, not an error.
#[async_trait]
pub trait PageTransport: Send + Sync {
    type Item: Send + 'static;
    type Filter: Clone + PartialEq + Send + Sync + 'static;

    async fn fetch_page(
        &self,
        filter: &Self::Filter,
        offset: usize,
        limit: usize,
    ) -> FetchResult<Vec<Self::Item>>;
}
