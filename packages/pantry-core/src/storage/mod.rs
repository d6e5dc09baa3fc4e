//! # Storage Module
//!
//! Embedded SQLite backend for the friends graph.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite Database                                                │   │
//! │  │  ───────────────                                                 │   │
//! │  │                                                                 │   │
//! │  │  Tables:                                                       │   │
//! │  │  • profiles - Display fields per account                       │   │
//! │  │  • friendships - Directed edges with status                    │   │
//! │  │                                                                 │   │
//! │  │  Offline use, seeding and tests. Answers the same five         │   │
//! │  │  FriendshipStore calls as the hosted backend, including a      │   │
//! │  │  local expanded-friends procedure.                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod database;
mod schema;

pub use database::Database;
pub use schema::SCHEMA_VERSION;

use crate::error::Result;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the database file (None for in-memory)
    pub database_path: Option<String>,
    /// Whether the local expanded-friends procedure answers
    pub rpc_enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            rpc_enabled: true,
        }
    }
}

/// Open the storage described by `config`
pub async fn init(config: StorageConfig) -> Result<Database> {
    let db = Database::open(config.database_path.as_deref()).await?;
    Ok(db.with_rpc(config.rpc_enabled))
}
