//! Who is looking.
//!
//! Only the outermost surface asks a [`ViewerProvider`]; everything below it
//! takes the viewer as a plain `Option<&str>`.

use crate::error::Result;
use crate::identity::{validate_identity, Identity};

/// Source of the signed-in identity
pub trait ViewerProvider: Send + Sync {
    /// The signed-in identity, `None` when anonymous
    fn current_viewer(&self) -> Option<Identity>;
}

/// A viewer fixed at construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticViewer {
    viewer: Option<Identity>,
}

impl StaticViewer {
    /// Signed in as `id`
    pub fn signed_in(id: impl Into<Identity>) -> Result<Self> {
        let id = id.into();
        validate_identity(&id)?;
        Ok(Self { viewer: Some(id) })
    }

    /// Nobody signed in
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// From an optional setting; blank means anonymous
    pub fn from_option(id: Option<String>) -> Result<Self> {
        match id.map(|s| s.trim().to_string()) {
            Some(id) if !id.is_empty() => Self::signed_in(id),
            _ => Ok(Self::anonymous()),
        }
    }
}

impl ViewerProvider for StaticViewer {
    fn current_viewer(&self) -> Option<Identity> {
        self.viewer.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_viewer() {
        let viewer = StaticViewer::signed_in("v").unwrap();
        assert_eq!(viewer.current_viewer().as_deref(), Some("v"));
    }

    #[test]
    fn test_anonymous() {
        let viewer = StaticViewer::anonymous();
        assert!(viewer.current_viewer().is_none());
    }

    #[test]
    fn test_from_option() {
        assert!(StaticViewer::from_option(Some("  ".into()))
            .unwrap()
            .current_viewer()
            .is_none());
        assert_eq!(
            StaticViewer::from_option(Some(" v ".into()))
                .unwrap()
                .current_viewer()
                .as_deref(),
            Some("v")
        );
        assert!(StaticViewer::from_option(Some("a,b".into())).is_err());
    }
}
