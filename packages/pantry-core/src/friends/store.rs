//! Backend contract for the friends graph.
//!
//! Implemented by [`Database`](crate::storage::Database) (embedded SQLite)
//! and [`RestStore`](crate::remote::RestStore) (PostgREST over HTTP).
//! Implementations return raw results and errors; the catch-and-log policy
//! lives one layer up in [`FriendshipAccess`](super::FriendshipAccess).

use async_trait::async_trait;

use super::{EdgeRow, ExpandedFriend, FriendshipEdge};
use crate::error::Result;

/// Name of the server-side expansion procedure
pub const EXPANDED_FRIENDS_RPC: &str = "get_user_friends_expanded";

/// Read and write primitives over the `friendships` / `profiles` tables
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// Call the expansion procedure for `subject`.
    ///
    /// Rows are already projected onto the counterpart. Returns
    /// [`Error::RpcUnavailable`](crate::Error::RpcUnavailable) when the
    /// procedure is not deployed.
    async fn get_user_friends_expanded(&self, subject: &str) -> Result<Vec<ExpandedFriend>>;

    /// Accepted edges with `subject` on either side, profiles embedded,
    /// newest first.
    async fn accepted_edges_for(&self, subject: &str) -> Result<Vec<EdgeRow>>;

    /// Accepted edges whose requester is in `ids`, profiles embedded.
    async fn accepted_edges_by_requester(&self, ids: &[String]) -> Result<Vec<EdgeRow>>;

    /// Accepted edges whose addressee is in `ids`, profiles embedded.
    async fn accepted_edges_by_addressee(&self, ids: &[String]) -> Result<Vec<EdgeRow>>;

    /// Insert a pending edge from `requester` to `addressee`.
    ///
    /// A uniqueness violation is reported as
    /// [`Error::RequestPending`](crate::Error::RequestPending).
    async fn insert_friend_request(&self, requester: &str, addressee: &str)
        -> Result<FriendshipEdge>;
}
