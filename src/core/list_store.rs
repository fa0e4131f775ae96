//! Remote list store - paginated, filterable view over a remote collection
//!
//! This is the one state machine the three catalog stores share: load the
//! first page for the active filter, append further pages on demand, and
//! never let a slow response for a superseded filter or operation overwrite
//! newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::errors::FetchError;
use crate::core::transport::PageTransport;

/// List loading status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListStatus {
    /// No filter selected; the list is intentionally empty.
    Idle,
    /// First page for the current filter is in flight.
    LoadingInitial,
    /// A further page is in flight; existing items remain visible.
    LoadingMore,
    /// Last fetch applied successfully.
    Ready,
    /// Last fetch failed; see `last_error`.
    Failed,
}

/// Observable state of a remote list.
///
/// `cursor` is the count of items fetched so far for the current filter and
/// doubles as the next page's offset. `has_more` is recomputed from the
/// size of the most recent page only, never from server-side totals.
#[derive(Debug, Clone)]
pub struct ListState<T, F> {
    pub items: Vec<T>,
    pub cursor: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub status: ListStatus,
    pub last_error: Option<FetchError>,
    /// Active filter. `None` is the "nothing selected" sentinel: the list
    /// stays empty and no fetches are issued.
    pub filter: Option<F>,
}

impl<T, F> ListState<T, F> {
    fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            page_size,
            has_more: false,
            status: ListStatus::Idle,
            last_error: None,
            filter: None,
        }
    }
}

/// Events emitted by a list store on every state transition.
#[derive(Debug, Clone)]
pub enum ListEvent {
    FilterChanged,
    LoadStarted { initial: bool },
    PageLoaded { appended: usize, has_more: bool },
    LoadFailed { error: FetchError },
    /// A completed fetch was dropped because a newer operation superseded
    /// it. Never surfaced as an error.
    ResultDiscarded,
}

/// Channel types for list store event subscribers.
pub type ListEventSender = mpsc::UnboundedSender<ListEvent>;
pub type ListEventReceiver = mpsc::UnboundedReceiver<ListEvent>;

enum FetchMode {
    Replace,
    Append,
}

/// Paginated, filterable view over a remote collection.
///
/// Cheap to clone; clones share state. All mutating operations are async
/// and resolve when their fetch has been applied or discarded; they never
/// return `Err` for expected failures - callers observe `status` and
/// `last_error` instead.
pub struct RemoteListStore<P: PageTransport> {
    transport: Arc<P>,
    state: Arc<RwLock<ListState<P::Item, P::Filter>>>,
    /// Monotonic operation-sequence counter. Every issued fetch captures
    /// the value minted for it; a completion applies only if its token is
    /// still the latest issued.
    op_seq: Arc<AtomicU64>,
    subscribers: Arc<Mutex<Vec<ListEventSender>>>,
}

impl<P: PageTransport> Clone for RemoteListStore<P> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            state: Arc::clone(&self.state),
            op_seq: Arc::clone(&self.op_seq),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<P: PageTransport> RemoteListStore<P>
where
    P::Item: Clone,
{
    pub fn new(transport: Arc<P>, page_size: usize) -> Self {
        assert!(page_size > 0, "page_size must be greater than zero");
        Self {
            transport,
            state: Arc::new(RwLock::new(ListState::new(page_size))),
            op_seq: Arc::new(AtomicU64::new(0)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to state-transition events.
    pub fn subscribe(&self) -> ListEventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Switch the active filter.
    ///
    /// Setting the current filter again is a no-op and does not disturb an
    /// in-flight fetch. Setting `None` empties the list without a network
    /// call. Any other change discards the current items and loads the
    /// first page for the new filter.
    pub async fn set_filter(&self, new_filter: Option<P::Filter>) {
        let token;
        {
            let mut state = self.state.write();
            if state.filter == new_filter {
                return;
            }
            token = self.next_token();
            state.filter = new_filter.clone();
            state.items.clear();
            state.cursor = 0;
            state.last_error = None;
            if new_filter.is_some() {
                state.has_more = true;
                state.status = ListStatus::LoadingInitial;
            } else {
                state.has_more = false;
                state.status = ListStatus::Idle;
            }
        }
        self.emit(ListEvent::FilterChanged);

        let Some(filter) = new_filter else {
            debug!("filter cleared, list emptied without a fetch");
            return;
        };
        self.emit(ListEvent::LoadStarted { initial: true });
        self.run_fetch(token, filter, 0, FetchMode::Replace).await;
    }

    /// Re-fetch the first page for the current filter.
    ///
    /// Existing items stay visible while the fetch runs and are kept if it
    /// fails; they are only replaced by a successful page.
    pub async fn reload(&self) {
        let token;
        let filter;
        {
            let mut state = self.state.write();
            let Some(current) = state.filter.clone() else {
                debug!("reload ignored, no filter selected");
                return;
            };
            token = self.next_token();
            filter = current;
            state.status = ListStatus::LoadingInitial;
            state.last_error = None;
            state.cursor = 0;
        }
        self.emit(ListEvent::LoadStarted { initial: true });
        self.run_fetch(token, filter, 0, FetchMode::Replace).await;
    }

    /// Fetch the next page and append it.
    ///
    /// No-op when the collection is exhausted, no filter is selected, or a
    /// fetch is already in flight; redundant scroll-triggered calls are
    /// expected and harmless.
    pub async fn load_more(&self) {
        let token;
        let filter;
        let offset;
        {
            let mut state = self.state.write();
            if !state.has_more {
                debug!("load_more ignored, collection exhausted");
                return;
            }
            if matches!(
                state.status,
                ListStatus::LoadingInitial | ListStatus::LoadingMore
            ) {
                debug!("load_more ignored, a fetch is already in flight");
                return;
            }
            let Some(current) = state.filter.clone() else {
                return;
            };
            token = self.next_token();
            filter = current;
            offset = state.cursor;
            state.status = ListStatus::LoadingMore;
            state.last_error = None;
        }
        self.emit(ListEvent::LoadStarted { initial: false });
        self.run_fetch(token, filter, offset, FetchMode::Append).await;
    }

    /// Snapshot of the full list state.
    pub fn snapshot(&self) -> ListState<P::Item, P::Filter> {
        self.state.read().clone()
    }

    pub fn items(&self) -> Vec<P::Item> {
        self.state.read().items.clone()
    }

    pub fn status(&self) -> ListStatus {
        self.state.read().status
    }

    pub fn has_more(&self) -> bool {
        self.state.read().has_more
    }

    pub fn cursor(&self) -> usize {
        self.state.read().cursor
    }

    pub fn page_size(&self) -> usize {
        self.state.read().page_size
    }

    pub fn last_error(&self) -> Option<FetchError> {
        self.state.read().last_error.clone()
    }

    pub fn filter(&self) -> Option<P::Filter> {
        self.state.read().filter.clone()
    }

    fn next_token(&self) -> u64 {
        self.op_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn run_fetch(&self, token: u64, filter: P::Filter, offset: usize, mode: FetchMode) {
        let limit = self.page_size();
        let result = self.transport.fetch_page(&filter, offset, limit).await;

        // Compare-and-apply: the token check and the state mutation happen
        // under one lock acquisition, with no suspension point between.
        let event = {
            let mut state = self.state.write();
            if self.op_seq.load(Ordering::SeqCst) != token {
                debug!(token, "discarding superseded fetch result");
                ListEvent::ResultDiscarded
            } else {
                match result {
                    Ok(page) => {
                        let appended = page.len();
                        state.has_more = appended == limit;
                        match mode {
                            FetchMode::Replace => {
                                state.items = page;
                                state.cursor = appended;
                            }
                            FetchMode::Append => {
                                state.items.extend(page);
                                state.cursor += appended;
                            }
                        }
                        state.status = ListStatus::Ready;
                        state.last_error = None;
                        ListEvent::PageLoaded {
                            appended,
                            has_more: state.has_more,
                        }
                    }
                    Err(error) => {
                        warn!(%error, offset, "page fetch failed");
                        state.status = ListStatus::Failed;
                        state.last_error = Some(error.clone());
                        ListEvent::LoadFailed { error }
                    }
                }
            }
        };
        self.emit(event);
    }

    fn emit(&self, event: ListEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
