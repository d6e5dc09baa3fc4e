//! # Remote Module
//!
//! Hosted backend access over PostgREST conventions.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         REMOTE BACKEND                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  POST /rest/v1/rpc/get_user_friends_expanded   {"user_id": "<id>"}      │
//! │  GET  /rest/v1/friendships?select=..&status=eq.accepted&or=(..)         │
//! │  GET  /rest/v1/friendships?select=..&requester_id=in.(..)               │
//! │  GET  /rest/v1/friendships?select=..&addressee_id=in.(..)               │
//! │  POST /rest/v1/friendships            Prefer: return=representation     │
//! │                                                                         │
//! │  Headers: apikey, Authorization: Bearer <token>                         │
//! │  Errors:  {code, message, details, hint}; 23505 = unique violation      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod client;
pub mod query;

pub use client::RestStore;
