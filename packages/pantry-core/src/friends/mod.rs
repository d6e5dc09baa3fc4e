//! # Friends Module
//!
//! The friends graph: direct friends, friends of friends, friend requests.
//!
//! ## Graph Expansion
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    FRIENDS-OF-FRIENDS EXPANSION                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Viewer V looks at subject S's profile                                 │
//! │                                                                         │
//! │  1. Direct friends of S                                                │
//! │  ┌──────────────────────────┐     RPC ok?  ──► pass rows through       │
//! │  │ get_user_friends_expanded│ ──►                                      │
//! │  └──────────────────────────┘     RPC err? ──► accepted edges with     │
//! │                                               requester=S OR addressee=S│
//! │                                               (created_at desc), pick  │
//! │                                               the other endpoint       │
//! │                                                                         │
//! │  2. Friends of friends (only when V is known and V != S)               │
//! │                                                                         │
//! │        F = { direct friend ids }                                       │
//! │        ┌────────────────────┐   ┌────────────────────┐                 │
//! │        │ requester_id ∈ F   │   │ addressee_id ∈ F   │  (concurrent)   │
//! │        └─────────┬──────────┘   └─────────┬──────────┘                 │
//! │                  └──────── concat ────────┘  requester side first      │
//! │                               │                                         │
//! │            both ends in F ──► skip    neither end in F ──► skip        │
//! │            other end ∈ {V, S} ∪ F ──► skip                             │
//! │            other end has no profile ──► skip                           │
//! │            first occurrence wins, insertion order kept                 │
//! │                                                                         │
//! │  3. Friend request: insert {requester: V, addressee: T}                │
//! │     unique violation ──► AlreadyRequested (informational)             │
//! │     other failure    ──► Failed                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod access;
mod requests;
mod resolver;
mod service;
mod store;

pub use access::FriendshipAccess;
pub use requests::{send_friend_request, RequestOutcome};
pub use resolver::{
    expand_direct_edges, expand_second_degree, resolve_direct_friends,
    resolve_friends_of_friends,
};
pub use service::{FriendsService, FriendsView, LoadTicket, ViewGuard};
pub use store::{FriendshipStore, EXPANDED_FRIENDS_RPC};

use serde::{Deserialize, Serialize};

use crate::identity::{label_for, Identity, Profile};

/// Status of a friendship edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    /// Waiting for the addressee
    Pending,
    /// Both sides are friends
    Accepted,
    /// Addressee declined
    Rejected,
    /// One side blocked the other
    Blocked,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl FriendshipStatus {
    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Rejected => "rejected",
            FriendshipStatus::Blocked => "blocked",
            FriendshipStatus::Unknown => "unknown",
        }
    }

    /// Parse from database string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FriendshipStatus::Pending),
            "accepted" => Some(FriendshipStatus::Accepted),
            "rejected" => Some(FriendshipStatus::Rejected),
            "blocked" => Some(FriendshipStatus::Blocked),
            "unknown" => Some(FriendshipStatus::Unknown),
            _ => None,
        }
    }
}

/// A row of the `friendships` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendshipEdge {
    /// Server-assigned edge id
    pub id: i64,
    /// Who sent the request
    pub requester_id: Identity,
    /// Who received it
    pub addressee_id: Identity,
    /// Current status
    pub status: FriendshipStatus,
    /// RFC 3339 creation time
    pub created_at: String,
}

impl FriendshipEdge {
    /// Whether both endpoints are the same identity
    pub fn is_self_loop(&self) -> bool {
        self.requester_id == self.addressee_id
    }

    /// The endpoint opposite `id`, if the edge touches `id`
    pub fn counterpart(&self, id: &str) -> Option<&str> {
        if self.requester_id == id {
            Some(&self.addressee_id)
        } else if self.addressee_id == id {
            Some(&self.requester_id)
        } else {
            None
        }
    }
}

/// An embedded join result: PostgREST returns a single object for a
/// many-to-one embed and an array when it cannot prove the cardinality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Embedded<T> {
    /// `{ .. }`
    One(T),
    /// `[{ .. }, ..]`
    Many(Vec<T>),
}

impl<T> Embedded<T> {
    /// The object itself, or the first array element
    pub fn first(&self) -> Option<&T> {
        match self {
            Embedded::One(value) => Some(value),
            Embedded::Many(values) => values.first(),
        }
    }
}

impl<T> From<T> for Embedded<T> {
    fn from(value: T) -> Self {
        Embedded::One(value)
    }
}

/// An edge with both endpoints' profiles embedded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRow {
    /// The edge columns
    #[serde(flatten)]
    pub edge: FriendshipEdge,
    /// Requester's profile
    #[serde(default)]
    pub requester: Option<Embedded<Profile>>,
    /// Addressee's profile
    #[serde(default)]
    pub addressee: Option<Embedded<Profile>>,
}

impl EdgeRow {
    /// Build a row with both profiles present
    pub fn new(edge: FriendshipEdge, requester: Option<Profile>, addressee: Option<Profile>) -> Self {
        Self {
            edge,
            requester: requester.map(Embedded::One),
            addressee: addressee.map(Embedded::One),
        }
    }

    /// Normalized requester profile
    pub fn requester_profile(&self) -> Option<&Profile> {
        self.requester.as_ref().and_then(Embedded::first)
    }

    /// Normalized addressee profile
    pub fn addressee_profile(&self) -> Option<&Profile> {
        self.addressee.as_ref().and_then(Embedded::first)
    }

    /// The endpoint opposite `id` and that endpoint's profile
    pub fn counterpart(&self, id: &str) -> Option<(&str, Option<&Profile>)> {
        let other = self.edge.counterpart(id)?;
        let profile = if self.edge.requester_id == id {
            self.addressee_profile()
        } else {
            self.requester_profile()
        };
        Some((other, profile))
    }
}

/// One endpoint of an edge, resolved relative to a subject, with the
/// friend's profile fields flattened in.
///
/// Entries synthesized by the friends-of-friends expansion have no edge of
/// their own: `friendship_id` and `created_at` are `None` for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedFriend {
    /// Edge id, `None` when synthesized
    #[serde(default)]
    pub friendship_id: Option<i64>,
    /// The other party
    pub friend_id: Identity,
    /// Other party's username
    #[serde(default)]
    pub friend_username: Option<String>,
    /// Other party's full name
    #[serde(default)]
    pub friend_name: Option<String>,
    /// Other party's email
    #[serde(default)]
    pub friend_email: Option<String>,
    /// Edge creation time, `None` when synthesized
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ExpandedFriend {
    /// Project an edge onto `friend_id`'s side
    pub fn from_edge(edge: &FriendshipEdge, friend_id: &str, profile: Option<&Profile>) -> Self {
        Self {
            friendship_id: Some(edge.id),
            friend_id: friend_id.to_string(),
            friend_username: profile.and_then(|p| p.username.clone()),
            friend_name: profile.and_then(|p| p.name.clone()),
            friend_email: profile.and_then(|p| p.email.clone()),
            created_at: Some(edge.created_at.clone()),
        }
    }

    /// A second-degree entry with no edge of its own
    pub fn synthesized(friend_id: &str, profile: &Profile) -> Self {
        Self {
            friendship_id: None,
            friend_id: friend_id.to_string(),
            friend_username: profile.username.clone(),
            friend_name: profile.name.clone(),
            friend_email: profile.email.clone(),
            created_at: None,
        }
    }

    /// Whether this entry was synthesized rather than read from an edge
    pub fn is_synthesized(&self) -> bool {
        self.friendship_id.is_none()
    }

    /// Map the legacy `0` / `""` placeholders some RPC versions emit to `None`
    pub fn normalized(mut self) -> Self {
        if self.friendship_id == Some(0) {
            self.friendship_id = None;
        }
        if self.created_at.as_deref().is_some_and(str::is_empty) {
            self.created_at = None;
        }
        self
    }

    /// Best human-readable label
    pub fn display_label(&self) -> String {
        label_for(
            &self.friend_id,
            self.friend_username.as_deref(),
            self.friend_name.as_deref(),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
