//! # Database Schema
//!
//! SQL schema definitions for the embedded Pantry store.
//!
//! ## Schema Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DATABASE SCHEMA                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐          ┌─────────────────┐                      │
//! │  │    profiles     │          │   friendships   │                      │
//! │  ├─────────────────┤          ├─────────────────┤                      │
//! │  │ id              │◄─────────│ requester_id    │                      │
//! │  │ username        │◄─────────│ addressee_id    │                      │
//! │  │ name            │          │ id              │                      │
//! │  │ email           │          │ status          │                      │
//! │  └─────────────────┘          │ created_at      │                      │
//! │                               └─────────────────┘                      │
//! │                                                                         │
//! │  UNIQUE(requester_id, addressee_id): one edge per direction            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Public profile of every account
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY NOT NULL,
    username TEXT,
    name TEXT,
    email TEXT
);

-- Directed friendship edges
-- 'accepted' edges are read as symmetric
CREATE TABLE IF NOT EXISTS friendships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    requester_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    addressee_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    -- 'pending', 'accepted', 'rejected' or 'blocked'
    status TEXT NOT NULL DEFAULT 'pending',
    -- RFC 3339, fixed width so text order is time order
    created_at TEXT NOT NULL,
    UNIQUE (requester_id, addressee_id)
);
CREATE INDEX IF NOT EXISTS idx_friendships_requester ON friendships(requester_id, status);
CREATE INDEX IF NOT EXISTS idx_friendships_addressee ON friendships(addressee_id, status);
CREATE INDEX IF NOT EXISTS idx_friendships_created ON friendships(created_at DESC);
"#;
