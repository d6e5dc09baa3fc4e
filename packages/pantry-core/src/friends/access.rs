//! Friendship data access: store calls with the read-path error policy.
//!
//! Every read here is infallible from the caller's point of view. Failures
//! are logged and become `None` (RPC) or an empty list (queries), so a
//! surface only ever sees "populated" or "empty".

use std::sync::Arc;

use super::{EdgeRow, ExpandedFriend, FriendshipStore};

/// Read access to the friends graph over any [`FriendshipStore`]
#[derive(Clone)]
pub struct FriendshipAccess {
    store: Arc<dyn FriendshipStore>,
}

impl FriendshipAccess {
    /// Wrap a store
    pub fn new(store: Arc<dyn FriendshipStore>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn FriendshipStore> {
        &self.store
    }

    /// Primary strategy: the expansion procedure.
    ///
    /// `None` means the procedure failed and the caller should fall back.
    /// `Some(vec![])` is a usable answer (the subject has no friends).
    pub async fn fetch_expanded_rpc(&self, subject: &str) -> Option<Vec<ExpandedFriend>> {
        match self.store.get_user_friends_expanded(subject).await {
            Ok(rows) => Some(rows.into_iter().map(ExpandedFriend::normalized).collect()),
            Err(e) if e.is_recoverable() => {
                tracing::debug!(subject, error = %e, "Expanded-friends RPC unavailable, falling back");
                None
            }
            Err(e) => {
                tracing::warn!(subject, error = %e, "Expanded-friends RPC failed, falling back");
                None
            }
        }
    }

    /// Fallback strategy: accepted edges touching `subject`, newest first.
    pub async fn fetch_direct_edges(&self, subject: &str) -> Vec<EdgeRow> {
        match self.store.accepted_edges_for(subject).await {
            Ok(rows) => drop_self_loops(rows),
            Err(e) => {
                tracing::warn!(subject, error = %e, "Failed to fetch friendships");
                Vec::new()
            }
        }
    }

    /// Accepted edges with either endpoint in `ids`.
    ///
    /// The requester-side and addressee-side queries run concurrently; the
    /// result is always requester-side rows followed by addressee-side rows.
    /// An edge with both endpoints in `ids` appears twice.
    pub async fn fetch_edges_touching_any(&self, ids: &[String]) -> Vec<EdgeRow> {
        if ids.is_empty() {
            return Vec::new();
        }

        let (by_requester, by_addressee) = tokio::join!(
            self.store.accepted_edges_by_requester(ids),
            self.store.accepted_edges_by_addressee(ids),
        );

        match (by_requester, by_addressee) {
            (Ok(mut rows), Ok(addressee_rows)) => {
                rows.extend(addressee_rows);
                drop_self_loops(rows)
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(count = ids.len(), error = %e, "Failed to fetch friends-of-friends edges");
                Vec::new()
            }
        }
    }
}

fn drop_self_loops(mut rows: Vec<EdgeRow>) -> Vec<EdgeRow> {
    rows.retain(|row| !row.edge.is_self_loop());
    rows
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::friends::{FriendshipEdge, FriendshipStatus};
    use crate::identity::Profile;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// A store with canned answers, for ordering and failure control.
    #[derive(Default)]
    pub(crate) struct ScriptedStore {
        pub rpc: Option<Vec<ExpandedFriend>>,
        pub direct: Option<Vec<EdgeRow>>,
        pub by_requester: Option<Vec<EdgeRow>>,
        pub by_addressee: Option<Vec<EdgeRow>>,
        /// Delay the requester-side query so it completes last
        pub slow_requester: bool,
        pub calls: Mutex<Vec<&'static str>>,
    }

    pub(crate) fn row(id: i64, requester: &str, addressee: &str) -> EdgeRow {
        EdgeRow::new(
            FriendshipEdge {
                id,
                requester_id: requester.into(),
                addressee_id: addressee.into(),
                status: FriendshipStatus::Accepted,
                created_at: format!("2024-05-{:02}T10:00:00.000000Z", id % 28 + 1),
            },
            Some(Profile::new(requester)),
            Some(Profile::new(addressee)),
        )
    }

    fn canned<T: Clone>(value: &Option<T>, what: &str) -> Result<T> {
        value
            .clone()
            .ok_or_else(|| Error::ConnectionFailed(format!("{} offline", what)))
    }

    #[async_trait]
    impl FriendshipStore for ScriptedStore {
        async fn get_user_friends_expanded(&self, _subject: &str) -> Result<Vec<ExpandedFriend>> {
            self.calls.lock().push("rpc");
            self.rpc
                .clone()
                .ok_or_else(|| Error::RpcUnavailable("not deployed".into()))
        }

        async fn accepted_edges_for(&self, _subject: &str) -> Result<Vec<EdgeRow>> {
            self.calls.lock().push("direct");
            canned(&self.direct, "direct")
        }

        async fn accepted_edges_by_requester(&self, _ids: &[String]) -> Result<Vec<EdgeRow>> {
            if self.slow_requester {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            self.calls.lock().push("by_requester");
            canned(&self.by_requester, "by_requester")
        }

        async fn accepted_edges_by_addressee(&self, _ids: &[String]) -> Result<Vec<EdgeRow>> {
            self.calls.lock().push("by_addressee");
            canned(&self.by_addressee, "by_addressee")
        }

        async fn insert_friend_request(
            &self,
            _requester: &str,
            _addressee: &str,
        ) -> Result<FriendshipEdge> {
            Err(Error::Internal("scripted store is read-only".into()))
        }
    }

    fn access(store: ScriptedStore) -> (FriendshipAccess, Arc<ScriptedStore>) {
        let store = Arc::new(store);
        (FriendshipAccess::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_rpc_failure_is_none() {
        let (access, _) = access(ScriptedStore::default());
        assert!(access.fetch_expanded_rpc("s").await.is_none());
    }

    #[tokio::test]
    async fn test_rpc_empty_is_usable() {
        let (access, _) = access(ScriptedStore {
            rpc: Some(Vec::new()),
            ..Default::default()
        });
        assert_eq!(access.fetch_expanded_rpc("s").await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_direct_edges_drop_self_loops() {
        let (access, _) = access(ScriptedStore {
            direct: Some(vec![row(1, "s", "a"), row(2, "s", "s"), row(3, "b", "s")]),
            ..Default::default()
        });
        let ids: Vec<i64> = access
            .fetch_direct_edges("s")
            .await
            .iter()
            .map(|r| r.edge.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_direct_edges_failure_is_empty() {
        let (access, _) = access(ScriptedStore::default());
        assert!(access.fetch_direct_edges("s").await.is_empty());
    }

    #[tokio::test]
    async fn test_touching_any_keeps_requester_side_first() {
        let (access, store) = access(ScriptedStore {
            by_requester: Some(vec![row(10, "a", "c")]),
            by_addressee: Some(vec![row(20, "d", "a")]),
            slow_requester: true,
            ..Default::default()
        });

        let ids: Vec<i64> = access
            .fetch_edges_touching_any(&["a".to_string()])
            .await
            .iter()
            .map(|r| r.edge.id)
            .collect();

        // Network completion order was addressee first...
        assert_eq!(*store.calls.lock(), vec!["by_addressee", "by_requester"]);
        // ...but processing order is fixed.
        assert_eq!(ids, vec![10, 20]);
    }

    #[tokio::test]
    async fn test_touching_any_drops_self_loops() {
        let (access, _) = access(ScriptedStore {
            by_requester: Some(vec![row(1, "a", "a"), row(2, "a", "c")]),
            by_addressee: Some(vec![row(3, "b", "b"), row(4, "d", "b")]),
            ..Default::default()
        });

        let ids: Vec<i64> = access
            .fetch_edges_touching_any(&["a".to_string(), "b".to_string()])
            .await
            .iter()
            .map(|r| r.edge.id)
            .collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_touching_any_failure_is_empty() {
        let (access, _) = access(ScriptedStore {
            by_requester: Some(vec![row(10, "a", "c")]),
            by_addressee: None,
            ..Default::default()
        });
        assert!(access.fetch_edges_touching_any(&["a".to_string()]).await.is_empty());
    }

    #[tokio::test]
    async fn test_touching_any_empty_ids_skips_queries() {
        let (access, store) = access(ScriptedStore::default());
        assert!(access.fetch_edges_touching_any(&[]).await.is_empty());
        assert!(store.calls.lock().is_empty());
    }
}
