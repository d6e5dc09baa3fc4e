//! # Identity Module
//!
//! User identities and the profile fields joined onto friendship edges.
//!
//! An [`Identity`] is the opaque account id assigned by the auth provider.
//! Pantry never mints or parses identities; it only compares them. The
//! only local rule is that an identity is non-empty and free of the
//! characters that would break a PostgREST filter expression.

mod profile;

pub use profile::{Profile, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_USERNAME_LENGTH};
pub(crate) use profile::label_for;

use crate::error::{Error, Result};

/// Opaque unique user identifier
pub type Identity = String;

/// Maximum accepted identity length
pub const MAX_IDENTITY_LENGTH: usize = 128;

/// Characters with meaning inside `or=(..)` / `in.(..)` filter lists
const FILTER_RESERVED: &[char] = &[',', '(', ')', '"', '\\'];

/// Validate an identity before it is bound into a store query.
pub fn validate_identity(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidIdentity("identity cannot be empty".into()));
    }
    if id.len() > MAX_IDENTITY_LENGTH {
        return Err(Error::InvalidIdentity(format!(
            "identity too long: max {} characters",
            MAX_IDENTITY_LENGTH
        )));
    }
    if id.chars().any(|c| c.is_control() || FILTER_RESERVED.contains(&c)) {
        return Err(Error::InvalidIdentity(format!(
            "identity contains reserved characters: {:?}",
            id
        )));
    }
    Ok(())
}
