//! The friends service shared by every surface that shows a friends list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use super::{
    resolve_direct_friends, resolve_friends_of_friends, send_friend_request, ExpandedFriend,
    FriendshipAccess, FriendshipStore, RequestOutcome,
};

/// Everything a friends list shows for one subject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FriendsView {
    /// Whose friends these are
    pub subject: String,
    /// First-degree connections
    pub direct: Vec<ExpandedFriend>,
    /// Second-degree connections (empty on your own profile)
    pub friends_of_friends: Vec<ExpandedFriend>,
}

impl FriendsView {
    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.friends_of_friends.is_empty()
    }
}

/// Identifies one load started through a [`ViewGuard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Discards results of loads that were superseded or cancelled.
///
/// A surface keeps one guard. Every new load takes a ticket; starting
/// another load or calling [`cancel`](ViewGuard::cancel) (the surface went
/// away) makes older tickets stale.
#[derive(Debug, Clone, Default)]
pub struct ViewGuard {
    generation: Arc<AtomicU64>,
}

impl ViewGuard {
    /// Create a guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load, invalidating every earlier ticket
    pub fn begin_load(&self) -> LoadTicket {
        LoadTicket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Invalidate every outstanding ticket
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Whether `ticket` is still the latest load
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.0
    }
}

/// Friends list operations over a [`FriendshipStore`]
pub struct FriendsService {
    access: FriendshipAccess,
}

impl FriendsService {
    /// Create a new friends service
    pub fn new(store: Arc<dyn FriendshipStore>) -> Self {
        Self {
            access: FriendshipAccess::new(store),
        }
    }

    /// Data access handle
    pub fn access(&self) -> &FriendshipAccess {
        &self.access
    }

    /// Load the friends view of `subject` as seen by `viewer`.
    ///
    /// Friends of friends are only computed when looking at somebody
    /// else's profile while signed in.
    pub async fn load_view(&self, subject: &str, viewer: Option<&str>) -> FriendsView {
        if subject.is_empty() {
            return FriendsView::default();
        }

        let direct = resolve_direct_friends(&self.access, subject).await;

        let friends_of_friends = match viewer {
            Some(v) if v != subject => {
                resolve_friends_of_friends(&self.access, &direct, Some(v), subject).await
            }
            _ => Vec::new(),
        };

        tracing::info!(
            subject,
            direct = direct.len(),
            friends_of_friends = friends_of_friends.len(),
            "Loaded friends view"
        );

        FriendsView {
            subject: subject.to_string(),
            direct,
            friends_of_friends,
        }
    }

    /// [`load_view`](Self::load_view), dropping the result if `ticket` went
    /// stale while the load was in flight.
    pub async fn load_view_for(
        &self,
        guard: &ViewGuard,
        ticket: LoadTicket,
        subject: &str,
        viewer: Option<&str>,
    ) -> Option<FriendsView> {
        if !guard.is_current(ticket) {
            return None;
        }
        let view = self.load_view(subject, viewer).await;
        if guard.is_current(ticket) {
            Some(view)
        } else {
            tracing::debug!(subject, "Discarding stale friends view");
            None
        }
    }

    /// Send a friend request from `viewer` to `target`
    pub async fn send_request(&self, viewer: Option<&str>, target: &str) -> RequestOutcome {
        send_friend_request(&**self.access.store(), viewer, target).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
