//! # Database
//!
//! SQLite-backed [`FriendshipStore`].
//!
//! ## Database Operations
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DATABASE OPERATIONS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │ FriendsService  │                                                   │
//! │  └────────┬────────┘                                                   │
//! │           │ FriendshipStore                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                   │
//! │  │    Database     │  - Expanded-friends procedure (local SQL)         │
//! │  │   (this file)   │  - Accepted edge queries with profiles joined     │
//! │  │                 │  - Friend request insert                          │
//! │  │                 │  - Seeding (profiles, edges)                      │
//! │  └────────┬────────┘                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                   │
//! │  │   SQLite DB     │  - In-memory for tests                            │
//! │  │                 │  - File for the CLI                               │
//! │  └─────────────────┘                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::Arc;

use super::schema;
use crate::error::{Error, Result};
use crate::friends::{
    EdgeRow, ExpandedFriend, FriendshipEdge, FriendshipStatus, FriendshipStore,
    EXPANDED_FRIENDS_RPC,
};
use crate::identity::{validate_identity, Profile};

/// Edge columns followed by both joined profiles
const EDGE_SELECT: &str = "
    SELECT f.id, f.requester_id, f.addressee_id, f.status, f.created_at,
           r.id, r.username, r.name, r.email,
           a.id, a.username, a.name, a.email
    FROM friendships f
    LEFT JOIN profiles r ON r.id = f.requester_id
    LEFT JOIN profiles a ON a.id = f.addressee_id";

/// The main database handle
pub struct Database {
    /// The underlying SQLite connection
    conn: Arc<Mutex<Connection>>,
    /// Whether the expanded-friends procedure answers
    rpc_enabled: bool,
}

impl Database {
    /// Open or create a database
    ///
    /// If path is None, creates an in-memory database (useful for testing).
    pub async fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| Error::DatabaseError(format!("Failed to open database: {}", e)))?,
            None => Connection::open_in_memory().map_err(|e| {
                Error::DatabaseError(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| Error::DatabaseError(format!("Failed to enable foreign keys: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            rpc_enabled: true,
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Turn the local expanded-friends procedure on or off.
    ///
    /// With it off every direct-friends load takes the edge query path.
    pub fn with_rpc(mut self, enabled: bool) -> Self {
        self.rpc_enabled = enabled;
        self
    }

    /// Whether the expanded-friends procedure answers
    pub fn rpc_enabled(&self) -> bool {
        self.rpc_enabled
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
            .ok();

        match version {
            None => {
                conn.execute_batch(schema::CREATE_TABLES)
                    .map_err(|e| Error::DatabaseError(format!("Failed to create tables: {}", e)))?;

                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![schema::SCHEMA_VERSION],
                )
                .map_err(|e| Error::DatabaseError(format!("Failed to set schema version: {}", e)))?;

                tracing::info!("Database schema created (version {})", schema::SCHEMA_VERSION);
            }
            Some(v) if v > schema::SCHEMA_VERSION => {
                return Err(Error::DatabaseError(format!(
                    "Database schema version {} is newer than supported version {}",
                    v,
                    schema::SCHEMA_VERSION
                )));
            }
            Some(v) => {
                tracing::debug!("Database schema version: {}", v);
            }
        }

        Ok(())
    }

    // ========================================================================
    // PROFILE OPERATIONS
    // ========================================================================

    /// Insert a profile, or replace the display fields of an existing one
    pub fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        profile.validate()?;
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO profiles (id, username, name, email) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 username = excluded.username,
                 name = excluded.name,
                 email = excluded.email",
            params![profile.id, profile.username, profile.name, profile.email],
        )?;

        tracing::debug!(id = %profile.id, "Stored profile");
        Ok(())
    }

    /// Get a profile by id
    pub fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let conn = self.conn.lock();

        let profile = conn
            .query_row(
                "SELECT id, username, name, email FROM profiles WHERE id = ?",
                params![id],
                |row| profile_at(row, 0),
            )
            .optional()?;

        Ok(profile.flatten())
    }

    // ========================================================================
    // EDGE OPERATIONS
    // ========================================================================

    /// Insert an edge with an explicit status.
    ///
    /// For fixtures and seeding; `created_at` defaults to now and is
    /// normalized to the fixed-width form.
    pub fn insert_edge(
        &self,
        requester: &str,
        addressee: &str,
        status: FriendshipStatus,
        created_at: Option<&str>,
    ) -> Result<FriendshipEdge> {
        validate_identity(requester)?;
        validate_identity(addressee)?;

        let created_at = match created_at {
            Some(raw) => crate::time::parse_rfc3339(raw)
                .map(crate::time::format_rfc3339)
                .ok_or_else(|| Error::InvalidConfig(format!("Invalid timestamp: {}", raw)))?,
            None => crate::time::now_rfc3339(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO friendships (requester_id, addressee_id, status, created_at)
             VALUES (?, ?, ?, ?)",
            params![requester, addressee, status.as_str(), created_at],
        )
        .map_err(map_insert_error)?;

        Ok(FriendshipEdge {
            id: conn.last_insert_rowid(),
            requester_id: requester.to_string(),
            addressee_id: addressee.to_string(),
            status,
            created_at,
        })
    }

    /// Every edge between two users, either direction, any status
    pub fn edges_between(&self, a: &str, b: &str) -> Result<Vec<FriendshipEdge>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, requester_id, addressee_id, status, created_at FROM friendships
             WHERE (requester_id = ?1 AND addressee_id = ?2)
                OR (requester_id = ?2 AND addressee_id = ?1)
             ORDER BY id",
        )?;

        let edges = stmt
            .query_map(params![a, b], edge_at)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    fn query_edges(&self, sql: &str, args: &[&str]) -> Result<Vec<EdgeRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;

        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(EdgeRow::new(edge_at(row)?, profile_at(row, 5)?, profile_at(row, 9)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn accepted_edges_with_any(&self, column: &str, ids: &[String]) -> Result<Vec<EdgeRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "{} WHERE f.status = 'accepted' AND f.{} IN ({}) ORDER BY f.id",
            EDGE_SELECT, column, placeholders
        );
        let args: Vec<&str> = ids.iter().map(String::as_str).collect();
        self.query_edges(&sql, &args)
    }
}

#[async_trait]
impl FriendshipStore for Database {
    async fn get_user_friends_expanded(&self, subject: &str) -> Result<Vec<ExpandedFriend>> {
        if !self.rpc_enabled {
            return Err(Error::RpcUnavailable(format!("{} is disabled", EXPANDED_FRIENDS_RPC)));
        }

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT f.id,
                    CASE WHEN f.requester_id = ?1 THEN f.addressee_id ELSE f.requester_id END,
                    p.username, p.name, p.email, f.created_at
             FROM friendships f
             LEFT JOIN profiles p
                 ON p.id = CASE WHEN f.requester_id = ?1 THEN f.addressee_id ELSE f.requester_id END
             WHERE f.status = 'accepted'
               AND (f.requester_id = ?1 OR f.addressee_id = ?1)
               AND f.requester_id <> f.addressee_id
             ORDER BY f.created_at DESC, f.id DESC",
        )?;

        let rows = stmt
            .query_map(params![subject], |row| {
                Ok(ExpandedFriend {
                    friendship_id: Some(row.get(0)?),
                    friend_id: row.get(1)?,
                    friend_username: row.get(2)?,
                    friend_name: row.get(3)?,
                    friend_email: row.get(4)?,
                    created_at: Some(row.get(5)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn accepted_edges_for(&self, subject: &str) -> Result<Vec<EdgeRow>> {
        let sql = format!(
            "{} WHERE f.status = 'accepted' AND (f.requester_id = ?1 OR f.addressee_id = ?1)
             ORDER BY f.created_at DESC, f.id DESC",
            EDGE_SELECT
        );
        self.query_edges(&sql, &[subject])
    }

    async fn accepted_edges_by_requester(&self, ids: &[String]) -> Result<Vec<EdgeRow>> {
        self.accepted_edges_with_any("requester_id", ids)
    }

    async fn accepted_edges_by_addressee(&self, ids: &[String]) -> Result<Vec<EdgeRow>> {
        self.accepted_edges_with_any("addressee_id", ids)
    }

    async fn insert_friend_request(&self, requester: &str, addressee: &str) -> Result<FriendshipEdge> {
        validate_identity(requester)?;
        validate_identity(addressee)?;

        // status comes from the column default
        let conn = self.conn.lock();
        conn.query_row(
            "INSERT INTO friendships (requester_id, addressee_id, created_at)
             VALUES (?, ?, ?)
             RETURNING id, requester_id, addressee_id, status, created_at",
            params![requester, addressee, crate::time::now_rfc3339()],
            edge_at,
        )
        .map_err(map_insert_error)
    }
}

/// Unique violations become [`Error::RequestPending`]; foreign key and
/// other constraint failures stay generic.
fn map_insert_error(err: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return Error::RequestPending;
        }
    }
    Error::from(err)
}

fn edge_at(row: &Row<'_>) -> rusqlite::Result<FriendshipEdge> {
    let status: String = row.get(3)?;
    Ok(FriendshipEdge {
        id: row.get(0)?,
        requester_id: row.get(1)?,
        addressee_id: row.get(2)?,
        status: FriendshipStatus::parse(&status).unwrap_or(FriendshipStatus::Unknown),
        created_at: row.get(4)?,
    })
}

/// Profile columns starting at `offset`; `None` when the join found nothing
fn profile_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Option<Profile>> {
    let id: Option<String> = row.get(offset)?;
    Ok(match id {
        Some(id) => Some(Profile {
            id,
            username: row.get(offset + 1)?,
            name: row.get(offset + 2)?,
            email: row.get(offset + 3)?,
        }),
        None => None,
    })
}

// ============================================================================
// TESTS
// ============================================================================
