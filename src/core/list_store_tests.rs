//! Remote list store unit tests
//!
//! Exercises the pagination state machine against a scripted in-memory
//! transport: page concatenation, boundary handling, no-op preconditions,
//! failure policies, and staleness discards for superseded fetches.

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    use crate::core::errors::{FetchError, FetchResult};
    use crate::core::list_store::{ListEvent, ListStatus, RemoteListStore};
    use crate::core::transport::PageTransport;

    struct ScriptedPage {
        result: FetchResult<Vec<&'static str>>,
        gate: Option<oneshot::Receiver<()>>,
    }

    /// Transport returning pre-scripted pages in call order. A gated page
    /// stays in flight until the test releases its sender.
    #[derive(Default)]
    struct MockTransport {
        script: Mutex<VecDeque<ScriptedPage>>,
        calls: Mutex<Vec<(String, usize, usize)>>,
    }

    impl MockTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn push_page(&self, result: FetchResult<Vec<&'static str>>) {
            self.script.lock().push_back(ScriptedPage { result, gate: None });
        }

        fn push_gated_page(&self, result: FetchResult<Vec<&'static str>>) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.script.lock().push_back(ScriptedPage {
                result,
                gate: Some(rx),
            });
            tx
        }

        fn calls(&self) -> Vec<(String, usize, usize)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl PageTransport for MockTransport {
        type Item = &'static str;
        type Filter = String;

        async fn fetch_page(
            &self,
            filter: &String,
            offset: usize,
            limit: usize,
        ) -> FetchResult<Vec<&'static str>> {
            self.calls.lock().push((filter.clone(), offset, limit));
            let page = self.script.lock().pop_front().expect("unscripted fetch");
            if let Some(gate) = page.gate {
                let _ = gate.await;
            }
            page.result
        }
    }

    fn store(transport: &Arc<MockTransport>, page_size: usize) -> RemoteListStore<MockTransport> {
        RemoteListStore::new(Arc::clone(transport), page_size)
    }

    async fn wait_for_calls(transport: &MockTransport, n: usize) {
        timeout(Duration::from_secs(1), async {
            loop {
                if transport.calls.lock().len() >= n {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("expected transport call was never issued");
    }

    #[tokio::test]
    async fn new_store_is_idle_and_inert() {
        let transport = MockTransport::new();
        let list = store(&transport, 2);

        assert_eq!(list.status(), ListStatus::Idle);
        assert!(list.items().is_empty());
        assert!(!list.has_more());
        assert_eq!(list.cursor(), 0);

        // No filter selected: load_more and reload must not hit the network.
        list.load_more().await;
        list.reload().await;
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn set_filter_loads_first_page() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        let list = store(&transport, 2);

        list.set_filter(Some("X".to_string())).await;

        assert_eq!(list.items(), vec!["a", "b"]);
        assert_eq!(list.status(), ListStatus::Ready);
        assert_eq!(list.cursor(), 2);
        assert!(list.has_more());
        assert_eq!(transport.calls(), vec![("X".to_string(), 0, 2)]);
    }

    #[tokio::test]
    async fn pages_concatenate_in_call_order() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        transport.push_page(Ok(vec!["c", "d"]));
        transport.push_page(Ok(vec!["e"]));
        let list = store(&transport, 2);

        list.set_filter(Some("X".to_string())).await;
        list.load_more().await;
        list.load_more().await;

        assert_eq!(list.items(), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(list.cursor(), 5);
        assert!(!list.has_more());
        assert_eq!(
            transport.calls(),
            vec![
                ("X".to_string(), 0, 2),
                ("X".to_string(), 2, 2),
                ("X".to_string(), 4, 2),
            ]
        );
    }

    #[tokio::test]
    async fn short_page_ends_pagination() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        transport.push_page(Ok(vec!["c"]));
        let list = store(&transport, 2);

        list.set_filter(Some("X".to_string())).await;
        list.load_more().await;

        assert_eq!(list.items(), vec!["a", "b", "c"]);
        assert!(!list.has_more());

        // Exhausted: further load_more calls are no-ops.
        list.load_more().await;
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn empty_first_page_is_a_valid_terminal_page() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec![]));
        let list = store(&transport, 2);

        list.set_filter(Some("X".to_string())).await;

        assert!(list.items().is_empty());
        assert_eq!(list.status(), ListStatus::Ready);
        assert!(!list.has_more());
        assert!(list.last_error().is_none());
    }

    #[tokio::test]
    async fn full_page_keeps_has_more() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        transport.push_page(Ok(vec!["c", "d"]));
        let list = store(&transport, 2);

        list.set_filter(Some("X".to_string())).await;
        assert!(list.has_more());
        list.load_more().await;
        assert!(list.has_more());
    }

    #[tokio::test]
    async fn load_more_is_noop_while_fetch_in_flight() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        let list = store(&transport, 2);
        list.set_filter(Some("X".to_string())).await;

        let release = transport.push_gated_page(Ok(vec!["c", "d"]));
        let in_flight = {
            let list = list.clone();
            tokio::spawn(async move { list.load_more().await })
        };
        wait_for_calls(&transport, 2).await;
        assert_eq!(list.status(), ListStatus::LoadingMore);

        // Second call while the first is still pending: returns
        // immediately, issues nothing.
        list.load_more().await;
        assert_eq!(transport.calls().len(), 2);

        release.send(()).unwrap();
        in_flight.await.unwrap();

        assert_eq!(list.items(), vec!["a", "b", "c", "d"]);
        assert_eq!(list.cursor(), 4);
    }

    #[tokio::test]
    async fn set_filter_same_value_is_noop() {
        let transport = MockTransport::new();
        let release = transport.push_gated_page(Ok(vec!["a", "b"]));
        let list = store(&transport, 2);

        let first = {
            let list = list.clone();
            tokio::spawn(async move { list.set_filter(Some("X".to_string())).await })
        };
        wait_for_calls(&transport, 1).await;

        // Same filter again: must neither refetch nor invalidate the
        // in-flight initial fetch.
        list.set_filter(Some("X".to_string())).await;
        assert_eq!(transport.calls().len(), 1);

        release.send(()).unwrap();
        first.await.unwrap();

        assert_eq!(list.items(), vec!["a", "b"]);
        assert_eq!(list.status(), ListStatus::Ready);
    }

    #[tokio::test]
    async fn stale_result_for_previous_filter_is_discarded() {
        let transport = MockTransport::new();
        let release_a = transport.push_gated_page(Ok(vec!["a1", "a2"]));
        transport.push_page(Ok(vec!["b1"]));
        let list = store(&transport, 2);
        let mut events = list.subscribe();

        let fetch_a = {
            let list = list.clone();
            tokio::spawn(async move { list.set_filter(Some("A".to_string())).await })
        };
        wait_for_calls(&transport, 1).await;

        // Switch filters while A's fetch is still in flight.
        list.set_filter(Some("B".to_string())).await;
        assert_eq!(list.items(), vec!["b1"]);

        // A's late result must not corrupt B's state.
        release_a.send(()).unwrap();
        fetch_a.await.unwrap();

        assert_eq!(list.filter(), Some("B".to_string()));
        assert_eq!(list.items(), vec!["b1"]);
        assert_eq!(list.status(), ListStatus::Ready);
        assert!(!list.has_more());

        let mut discarded = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, ListEvent::ResultDiscarded) {
                discarded += 1;
            }
        }
        assert_eq!(discarded, 1);
    }

    #[tokio::test]
    async fn clearing_filter_empties_without_fetching() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        let list = store(&transport, 2);
        list.set_filter(Some("X".to_string())).await;

        list.set_filter(None).await;

        assert_eq!(list.status(), ListStatus::Idle);
        assert!(list.items().is_empty());
        assert!(!list.has_more());
        assert_eq!(list.cursor(), 0);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn clearing_filter_invalidates_in_flight_fetch() {
        let transport = MockTransport::new();
        let release = transport.push_gated_page(Ok(vec!["a", "b"]));
        let list = store(&transport, 2);

        let fetch = {
            let list = list.clone();
            tokio::spawn(async move { list.set_filter(Some("X".to_string())).await })
        };
        wait_for_calls(&transport, 1).await;

        list.set_filter(None).await;
        release.send(()).unwrap();
        fetch.await.unwrap();

        assert_eq!(list.status(), ListStatus::Idle);
        assert!(list.items().is_empty());
        assert_eq!(list.filter(), None);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_items() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        transport.push_page(Err(FetchError::status(500, Some("boom".to_string()))));
        let list = store(&transport, 2);

        list.set_filter(Some("X".to_string())).await;
        list.reload().await;

        assert_eq!(list.status(), ListStatus::Failed);
        let error = list.last_error().expect("error must be surfaced");
        assert_eq!(
            error,
            FetchError::Status {
                code: 500,
                message: Some("boom".to_string())
            }
        );
        assert!(error.is_retryable());
        // A failed reload never blanks a previously loaded view.
        assert_eq!(list.items(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn failed_load_more_leaves_items_and_cursor_untouched() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        transport.push_page(Err(FetchError::Network {
            message: "connection reset".to_string(),
        }));
        transport.push_page(Ok(vec!["c"]));
        let list = store(&transport, 2);

        list.set_filter(Some("X".to_string())).await;
        list.load_more().await;

        assert_eq!(list.status(), ListStatus::Failed);
        assert_eq!(list.items(), vec!["a", "b"]);
        assert_eq!(list.cursor(), 2);
        assert!(list.has_more());

        // The caller's retry is just another load_more.
        list.load_more().await;
        assert_eq!(list.items(), vec!["a", "b", "c"]);
        assert_eq!(list.status(), ListStatus::Ready);
        assert!(list.last_error().is_none());
        assert_eq!(transport.calls()[2], ("X".to_string(), 2, 2));
    }

    #[tokio::test]
    async fn reload_replaces_items_wholesale() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        transport.push_page(Ok(vec!["c", "d"]));
        transport.push_page(Ok(vec!["fresh"]));
        let list = store(&transport, 2);

        list.set_filter(Some("X".to_string())).await;
        list.load_more().await;
        assert_eq!(list.items().len(), 4);

        list.reload().await;

        assert_eq!(list.items(), vec!["fresh"]);
        assert_eq!(list.cursor(), 1);
        assert!(!list.has_more());
        assert_eq!(transport.calls()[2], ("X".to_string(), 0, 2));
    }

    #[tokio::test]
    async fn events_follow_state_transitions() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a", "b"]));
        transport.push_page(Err(FetchError::Network {
            message: "offline".to_string(),
        }));
        let list = store(&transport, 2);
        let mut events = list.subscribe();

        list.set_filter(Some("X".to_string())).await;
        list.load_more().await;

        assert!(matches!(events.try_recv(), Ok(ListEvent::FilterChanged)));
        assert!(matches!(
            events.try_recv(),
            Ok(ListEvent::LoadStarted { initial: true })
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(ListEvent::PageLoaded {
                appended: 2,
                has_more: true
            })
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(ListEvent::LoadStarted { initial: false })
        ));
        assert!(matches!(events.try_recv(), Ok(ListEvent::LoadFailed { .. })));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn snapshot_reflects_full_state() {
        let transport = MockTransport::new();
        transport.push_page(Ok(vec!["a"]));
        let list = store(&transport, 2);
        list.set_filter(Some("X".to_string())).await;

        let snapshot = list.snapshot();
        assert_eq!(snapshot.items, vec!["a"]);
        assert_eq!(snapshot.cursor, 1);
        assert_eq!(snapshot.page_size, 2);
        assert!(!snapshot.has_more);
        assert_eq!(snapshot.status, ListStatus::Ready);
        assert_eq!(snapshot.filter, Some("X".to_string()));
        assert!(snapshot.last_error.is_none());
    }
}
