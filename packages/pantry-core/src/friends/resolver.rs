//! Direct-friends and friends-of-friends resolution.
//!
//! The async entry points fetch through [`FriendshipAccess`]; the pure
//! `expand_*` helpers hold the projection and deduplication rules so they
//! can be tested against literal edge lists.

use indexmap::{IndexMap, IndexSet};

use super::{EdgeRow, ExpandedFriend, FriendshipAccess};

/// First-degree connections of `subject`.
///
/// Uses the expansion RPC when it answers, otherwise the direct edge query.
/// Order is the RPC's order, or `created_at` descending for the fallback.
pub async fn resolve_direct_friends(access: &FriendshipAccess, subject: &str) -> Vec<ExpandedFriend> {
    if let Some(mut rows) = access.fetch_expanded_rpc(subject).await {
        rows.retain(|friend| friend.friend_id != subject);
        tracing::debug!(subject, count = rows.len(), "Resolved direct friends via RPC");
        return rows;
    }

    let edges = access.fetch_direct_edges(subject).await;
    let friends = expand_direct_edges(&edges, subject);
    tracing::debug!(subject, count = friends.len(), "Resolved direct friends via edge query");
    friends
}

/// Project edges onto the counterpart of `subject`, keeping order.
///
/// Edges that do not touch `subject`, and self-loops, are skipped.
pub fn expand_direct_edges(edges: &[EdgeRow], subject: &str) -> Vec<ExpandedFriend> {
    edges
        .iter()
        .filter(|row| !row.edge.is_self_loop())
        .filter_map(|row| {
            let (friend_id, profile) = row.counterpart(subject)?;
            Some(ExpandedFriend::from_edge(&row.edge, friend_id, profile))
        })
        .collect()
}

/// Second-degree connections of `subject` as seen by `viewer`.
///
/// Returns empty without touching the store unless the viewer is known,
/// differs from the subject, and `direct` is non-empty.
pub async fn resolve_friends_of_friends(
    access: &FriendshipAccess,
    direct: &[ExpandedFriend],
    viewer: Option<&str>,
    subject: &str,
) -> Vec<ExpandedFriend> {
    let viewer = match viewer {
        Some(v) if v != subject => v,
        _ => return Vec::new(),
    };
    if direct.is_empty() {
        return Vec::new();
    }

    let friend_ids: IndexSet<String> = direct.iter().map(|f| f.friend_id.clone()).collect();
    let ids: Vec<String> = friend_ids.iter().cloned().collect();

    let candidates = access.fetch_edges_touching_any(&ids).await;
    let result = expand_second_degree(&candidates, &friend_ids, viewer, subject);

    tracing::debug!(
        subject,
        viewer,
        candidates = candidates.len(),
        count = result.len(),
        "Resolved friends of friends"
    );
    result
}

/// Deduplicated non-friend endpoints of edges that have exactly one
/// endpoint in `friend_ids`.
///
/// The viewer, the subject and every direct friend are excluded, as are
/// endpoints without a profile. The first edge mentioning an identity wins
/// and the output follows the order of `edges`.
pub fn expand_second_degree(
    edges: &[EdgeRow],
    friend_ids: &IndexSet<String>,
    viewer: &str,
    subject: &str,
) -> Vec<ExpandedFriend> {
    let is_excluded = |id: &str| id == viewer || id == subject || friend_ids.contains(id);
    let mut admitted: IndexMap<&str, ExpandedFriend> = IndexMap::new();

    for row in edges {
        let requester_is_friend = friend_ids.contains(row.edge.requester_id.as_str());
        let addressee_is_friend = friend_ids.contains(row.edge.addressee_id.as_str());

        let (other_id, other_profile) = match (requester_is_friend, addressee_is_friend) {
            (true, false) => (row.edge.addressee_id.as_str(), row.addressee_profile()),
            (false, true) => (row.edge.requester_id.as_str(), row.requester_profile()),
            // Between two direct friends, or unrelated
            _ => continue,
        };

        if is_excluded(other_id) || admitted.contains_key(other_id) {
            continue;
        }
        let Some(profile) = other_profile else {
            continue;
        };

        admitted.insert(other_id, ExpandedFriend::synthesized(other_id, profile));
    }

    admitted.into_values().collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friends::access::tests::{row, ScriptedStore};
    use crate::friends::FriendshipStore;
    use std::sync::Arc;

    fn ids(friends: &[ExpandedFriend]) -> Vec<&str> {
        friends.iter().map(|f| f.friend_id.as_str()).collect()
    }

    fn friend_set(ids: &[&str]) -> IndexSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn direct(id: &str) -> ExpandedFriend {
        ExpandedFriend {
            friendship_id: Some(1),
            friend_id: id.into(),
            friend_username: None,
            friend_name: None,
            friend_email: None,
            created_at: Some("2024-05-01T10:00:00.000000Z".into()),
        }
    }

    fn access(store: ScriptedStore) -> (FriendshipAccess, Arc<ScriptedStore>) {
        let store = Arc::new(store);
        let dyn_store: Arc<dyn FriendshipStore> = store.clone();
        (FriendshipAccess::new(dyn_store), store)
    }

    #[test]
    fn test_expand_direct_picks_counterpart() {
        let edges = vec![row(2, "s", "b"), row(1, "a", "s")];
        let friends = expand_direct_edges(&edges, "s");

        assert_eq!(ids(&friends), vec!["b", "a"]);
        assert_eq!(friends[0].friendship_id, Some(2));
        assert_eq!(friends[1].created_at, Some(edges[1].edge.created_at.clone()));
    }

    #[test]
    fn test_expand_direct_never_contains_subject() {
        let edges = vec![row(1, "s", "s"), row(2, "x", "y"), row(3, "s", "a")];
        let friends = expand_direct_edges(&edges, "s");
        assert_eq!(ids(&friends), vec!["a"]);
    }

    #[test]
    fn test_expand_direct_without_profile() {
        use crate::friends::Embedded;

        let mut missing = row(4, "s", "a");
        missing.addressee = None;
        let mut empty = row(5, "b", "s");
        empty.requester = Some(Embedded::Many(Vec::new()));

        let friends = expand_direct_edges(&[missing, empty], "s");
        assert_eq!(ids(&friends), vec!["a", "b"]);
        for (friend, id) in friends.iter().zip([4, 5]) {
            assert_eq!(friend.friendship_id, Some(id));
            assert!(friend.friend_username.is_none());
            assert!(friend.friend_name.is_none());
            assert!(friend.friend_email.is_none());
            assert!(friend.created_at.is_some());
        }
    }

    #[test]
    fn test_second_degree_basic() {
        // S - A, S - B, A - C
        let edges = vec![row(5, "a", "c"), row(1, "s", "a"), row(2, "b", "s")];
        let out = expand_second_degree(&edges, &friend_set(&["a", "b"]), "v", "s");
        assert_eq!(ids(&out), vec!["c"]);
        assert!(out[0].is_synthesized());
    }

    #[test]
    fn test_second_degree_skips_edges_between_friends() {
        // A - B are both direct friends of S
        let edges = vec![row(7, "a", "b"), row(7, "a", "b")];
        let out = expand_second_degree(&edges, &friend_set(&["a", "b"]), "v", "s");
        assert!(out.is_empty());
    }

    #[test]
    fn test_second_degree_excludes_viewer_and_subject() {
        let edges = vec![row(1, "a", "v"), row(2, "s", "a"), row(3, "a", "d")];
        let out = expand_second_degree(&edges, &friend_set(&["a"]), "v", "s");
        assert_eq!(ids(&out), vec!["d"]);
    }

    #[test]
    fn test_second_degree_dedup_first_wins() {
        let mut first = row(1, "a", "c");
        if let Some(crate::friends::Embedded::One(p)) = first.addressee.as_mut() {
            p.username = Some("first".into());
        }
        let mut second = row(2, "c", "b");
        if let Some(crate::friends::Embedded::One(p)) = second.requester.as_mut() {
            p.username = Some("second".into());
        }

        let out = expand_second_degree(&[first, second], &friend_set(&["a", "b"]), "v", "s");
        assert_eq!(ids(&out), vec!["c"]);
        assert_eq!(out[0].friend_username.as_deref(), Some("first"));
    }

    #[test]
    fn test_second_degree_requires_profile() {
        let mut no_profile = row(1, "a", "c");
        no_profile.addressee = None;
        let out = expand_second_degree(
            &[no_profile, row(2, "a", "d")],
            &friend_set(&["a"]),
            "v",
            "s",
        );
        assert_eq!(ids(&out), vec!["d"]);
    }

    #[test]
    fn test_second_degree_skips_unrelated_edges() {
        let out = expand_second_degree(&[row(1, "x", "y")], &friend_set(&["a"]), "v", "s");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_direct_uses_rpc_when_available() {
        let (access, store) = access(ScriptedStore {
            rpc: Some(vec![direct("b"), direct("s"), direct("a")]),
            direct: Some(vec![row(9, "s", "z")]),
            ..Default::default()
        });

        let friends = resolve_direct_friends(&access, "s").await;
        assert_eq!(ids(&friends), vec!["b", "a"]);
        assert_eq!(*store.calls.lock(), vec!["rpc"]);
    }

    #[tokio::test]
    async fn test_direct_falls_back_like_direct_query() {
        let edges = vec![row(2, "s", "b"), row(1, "a", "s")];
        let (access, store) = access(ScriptedStore {
            rpc: None,
            direct: Some(edges.clone()),
            ..Default::default()
        });

        let friends = resolve_direct_friends(&access, "s").await;
        assert_eq!(friends, expand_direct_edges(&edges, "s"));
        assert_eq!(*store.calls.lock(), vec!["rpc", "direct"]);
    }

    #[tokio::test]
    async fn test_direct_both_paths_fail() {
        let (access, _) = access(ScriptedStore::default());
        assert!(resolve_direct_friends(&access, "s").await.is_empty());
    }

    #[tokio::test]
    async fn test_direct_is_repeatable() {
        let (access, _) = access(ScriptedStore {
            direct: Some(vec![row(3, "s", "c"), row(2, "b", "s"), row(1, "s", "a")]),
            ..Default::default()
        });
        let first = resolve_direct_friends(&access, "s").await;
        let second = resolve_direct_friends(&access, "s").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fof_preconditions_skip_fetch() {
        let (access, store) = access(ScriptedStore {
            by_requester: Some(vec![row(5, "a", "c")]),
            by_addressee: Some(Vec::new()),
            ..Default::default()
        });
        let friends = vec![direct("a")];

        // Own profile
        assert!(resolve_friends_of_friends(&access, &friends, Some("s"), "s").await.is_empty());
        // Anonymous viewer
        assert!(resolve_friends_of_friends(&access, &friends, None, "s").await.is_empty());
        // No direct friends
        assert!(resolve_friends_of_friends(&access, &[], Some("v"), "s").await.is_empty());

        assert!(store.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_fof_requester_side_then_addressee_side() {
        let (access, _) = access(ScriptedStore {
            by_requester: Some(vec![row(5, "a", "c"), row(6, "b", "d")]),
            by_addressee: Some(vec![row(7, "e", "a"), row(8, "c", "b")]),
            slow_requester: true,
            ..Default::default()
        });

        let out =
            resolve_friends_of_friends(&access, &[direct("a"), direct("b")], Some("v"), "s").await;
        assert_eq!(ids(&out), vec!["c", "d", "e"]);
    }
}
