//! Friend request writer.

use serde::Serialize;

use super::{FriendshipEdge, FriendshipStore};
use crate::error::Error;

/// What happened when a friend request was sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// A new pending edge was created
    Sent {
        /// The inserted edge
        edge: FriendshipEdge,
    },
    /// An edge between the two users already exists
    AlreadyRequested,
    /// Nobody is signed in; nothing was attempted
    NoViewer,
    /// The insert failed for any other reason
    Failed {
        /// Error text for logs
        reason: String,
    },
}

impl RequestOutcome {
    /// User-facing message
    pub fn message(&self) -> &'static str {
        match self {
            RequestOutcome::Sent { .. } => "Friend request sent!",
            RequestOutcome::AlreadyRequested => "Friend request already sent.",
            RequestOutcome::NoViewer => "Sign in to send friend requests.",
            RequestOutcome::Failed { .. } => "Failed to send friend request.",
        }
    }

    /// Only a generic failure counts as an error; a duplicate is informational
    pub fn is_error(&self) -> bool {
        matches!(self, RequestOutcome::Failed { .. })
    }
}

/// Insert a pending edge from `viewer` to `target`.
///
/// No reverse-direction check is made here: whether a request from the
/// target already blocks this one is up to the store's uniqueness rule.
pub async fn send_friend_request(
    store: &dyn FriendshipStore,
    viewer: Option<&str>,
    target: &str,
) -> RequestOutcome {
    let Some(viewer) = viewer else {
        return RequestOutcome::NoViewer;
    };

    if viewer == target {
        return RequestOutcome::Failed {
            reason: Error::CannotAddSelf.to_string(),
        };
    }

    match store.insert_friend_request(viewer, target).await {
        Ok(edge) => {
            tracing::info!(requester = viewer, addressee = target, id = edge.id, "Sent friend request");
            RequestOutcome::Sent { edge }
        }
        Err(e) if e.is_conflict() => {
            tracing::info!(requester = viewer, addressee = target, "Friend request already exists");
            RequestOutcome::AlreadyRequested
        }
        Err(e) => {
            tracing::warn!(requester = viewer, addressee = target, error = %e, "Failed to send friend request");
            RequestOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friends::FriendshipStatus;
    use crate::identity::Profile;
    use crate::storage::Database;

    async fn seeded() -> Database {
        let db = Database::open(None).await.unwrap();
        for id in ["v", "x"] {
            db.upsert_profile(&Profile::new(id)).unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_send_creates_pending_edge() {
        let db = seeded().await;
        let outcome = send_friend_request(&db, Some("v"), "x").await;

        match outcome {
            RequestOutcome::Sent { ref edge } => {
                assert_eq!(edge.requester_id, "v");
                assert_eq!(edge.addressee_id, "x");
                assert_eq!(edge.status, FriendshipStatus::Pending);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(outcome.message(), "Friend request sent!");
    }

    #[tokio::test]
    async fn test_duplicate_is_already_requested() {
        let db = seeded().await;
        send_friend_request(&db, Some("v"), "x").await;

        let again = send_friend_request(&db, Some("v"), "x").await;
        assert_eq!(again, RequestOutcome::AlreadyRequested);
        assert!(!again.is_error());
    }

    #[tokio::test]
    async fn test_reverse_direction_is_a_new_request() {
        let db = seeded().await;
        send_friend_request(&db, Some("x"), "v").await;

        let outcome = send_friend_request(&db, Some("v"), "x").await;
        assert!(matches!(outcome, RequestOutcome::Sent { .. }));
    }

    #[tokio::test]
    async fn test_no_viewer_is_noop() {
        let db = seeded().await;
        assert_eq!(send_friend_request(&db, None, "x").await, RequestOutcome::NoViewer);
        assert!(db.edges_between("v", "x").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_request_fails() {
        let db = seeded().await;
        let outcome = send_friend_request(&db, Some("v"), "v").await;
        assert!(outcome.is_error());
    }

    #[tokio::test]
    async fn test_other_failures_are_generic() {
        let db = seeded().await;
        // No profile row for the addressee: foreign key violation
        let outcome = send_friend_request(&db, Some("v"), "ghost").await;
        assert!(outcome.is_error());
        assert_eq!(outcome.message(), "Failed to send friend request.");
    }
}
