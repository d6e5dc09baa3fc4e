//! # User Profile
//!
//! The read-only profile row joined onto each side of a friendship edge.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PROFILE ROW                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  id:       Identity (required, primary key)                            │
//! │  username: Option<String>   handle shown as @username                  │
//! │  name:     Option<String>   full display name                          │
//! │  email:    Option<String>                                              │
//! │                                                                         │
//! │  Display fields are nullable server-side; a profile with every         │
//! │  display field empty still counts as "present" for expansion.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum length for a username
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Maximum length for a full name
pub const MAX_NAME_LENGTH: usize = 128;

/// Maximum length for an email address
pub const MAX_EMAIL_LENGTH: usize = 254;

/// A user profile as stored in the `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Profile {
    /// Account identity
    pub id: String,

    /// Handle
    #[serde(default)]
    pub username: Option<String>,

    /// Full name
    #[serde(default)]
    pub name: Option<String>,

    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
}

impl Profile {
    /// Create a profile with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Create a profile with all fields, validating lengths
    pub fn with_all(
        id: impl Into<String>,
        username: Option<String>,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Self> {
        let profile = Self {
            id: id.into(),
            username,
            name,
            email,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Validate the profile
    pub fn validate(&self) -> Result<()> {
        super::validate_identity(&self.id)?;

        check_len("username", self.username.as_deref(), MAX_USERNAME_LENGTH)?;
        check_len("name", self.name.as_deref(), MAX_NAME_LENGTH)?;
        check_len("email", self.email.as_deref(), MAX_EMAIL_LENGTH)?;

        if let Some(email) = self.email.as_deref() {
            if !email.is_empty() && !email.contains('@') {
                return Err(Error::InvalidProfile(format!("invalid email: {}", email)));
            }
        }

        Ok(())
    }

    /// Best human-readable label: name, then @username, then the raw id
    pub fn display_label(&self) -> String {
        label_for(&self.id, self.username.as_deref(), self.name.as_deref())
    }
}

/// Shared labelling rule for profiles and expanded friends.
pub(crate) fn label_for(id: &str, username: Option<&str>, name: Option<&str>) -> String {
    match (name.filter(|n| !n.is_empty()), username.filter(|u| !u.is_empty())) {
        (Some(name), _) => name.to_string(),
        (None, Some(username)) => format!("@{}", username),
        (None, None) => id.to_string(),
    }
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(Error::InvalidProfile(format!(
            "{} too long: max {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_new() {
        let profile = Profile::new("u1");
        assert_eq!(profile.id, "u1");
        assert!(profile.username.is_none());
        assert!(profile.email.is_none());
    }

    #[test]
    fn test_profile_validate_long_username() {
        let profile = Profile {
            id: "u1".into(),
            username: Some("a".repeat(MAX_USERNAME_LENGTH + 1)),
            ..Profile::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_profile_validate_email() {
        assert!(Profile::with_all("u1", None, None, Some("cook@example.com".into())).is_ok());
        assert!(Profile::with_all("u1", None, None, Some("not-an-email".into())).is_err());
    }

    #[test]
    fn test_display_label_fallbacks() {
        let mut profile = Profile::new("u1");
        assert_eq!(profile.display_label(), "u1");

        profile.username = Some("chef".into());
        assert_eq!(profile.display_label(), "@chef");

        profile.name = Some("Julia Child".into());
        assert_eq!(profile.display_label(), "Julia Child");
    }

    #[test]
    fn test_profile_deserializes_sparse_row() {
        let profile: Profile = serde_json::from_str(r#"{"id":"u9","username":null}"#).unwrap();
        assert_eq!(profile, Profile::new("u9"));
    }
}
