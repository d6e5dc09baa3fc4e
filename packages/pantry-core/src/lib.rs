//! # Pantry Core
//!
//! Friends-list and friends-of-friends resolution for the Pantry social
//! graph, over an embedded SQLite store or a hosted PostgREST backend.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         PANTRY CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       FriendsService                            │   │
//! │  │  load_view ──► direct friends ──► friends of friends            │   │
//! │  │  send_request                                                   │   │
//! │  └───────────────────────────────┬─────────────────────────────────┘   │
//! │                                  │                                      │
//! │  ┌─────────────┐  ┌──────────────▼──────────────┐  ┌──────────────┐   │
//! │  │  Identity   │  │     FriendshipStore         │  │   Session    │   │
//! │  │             │  │                             │  │              │   │
//! │  │ - Identity  │  │  ┌──────────┐ ┌──────────┐  │  │ - Viewer     │   │
//! │  │ - Profile   │  │  │ Database │ │RestStore │  │  │   provider   │   │
//! │  └─────────────┘  │  │ (SQLite) │ │ (HTTP)   │  │  └──────────────┘   │
//! │                   │  └──────────┘ └──────────┘  │                     │
//! │                   └─────────────────────────────┘                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`config`] - Backend selection and remote settings
//! - [`identity`] - Identities and profiles
//! - [`friends`] - Graph model, resolvers, request writer, service
//! - [`storage`] - Embedded SQLite store
//! - [`remote`] - Hosted REST store
//! - [`session`] - Signed-in viewer

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod error;
pub mod friends;
pub mod identity;
pub mod remote;
pub mod session;
pub mod storage;
/// RFC 3339 timestamp helpers.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::{BackendConfig, RemoteConfig};
pub use error::{Error, Result};
pub use friends::{
    ExpandedFriend, FriendsService, FriendsView, FriendshipStore, RequestOutcome, ViewGuard,
};
pub use identity::{Identity, Profile};
pub use session::{StaticViewer, ViewerProvider};

use std::sync::Arc;

// ============================================================================
// BACKEND
// ============================================================================

/// Open the store described by `config`
pub async fn connect(config: &BackendConfig) -> Result<Arc<dyn FriendshipStore>> {
    config.validate()?;

    match config {
        BackendConfig::Local {
            database_path,
            rpc_enabled,
        } => {
            tracing::info!(
                path = database_path.as_deref().unwrap_or(":memory:"),
                rpc_enabled,
                "Opening local store"
            );
            let db = storage::init(storage::StorageConfig {
                database_path: database_path.clone(),
                rpc_enabled: *rpc_enabled,
            })
            .await?;
            Ok(Arc::new(db))
        }
        BackendConfig::Remote(remote) => {
            tracing::info!(url = %remote.base_url, "Using remote store");
            Ok(Arc::new(remote::RestStore::new(remote.clone())?))
        }
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
