//! Hierarchical names
//!
//! Publish prefixes, sync scopes, and fetched data items are all addressed by
//! hierarchical names: an ordered sequence of UTF-8 components, written as a
//! slash-separated URI (`/ndn/edu/colostate/alice`). The client treats names
//! as opaque except for positional component access.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::errors::{ChronoChatError, ChronoChatResult};

// ----------------------------------------------------------------------------
// Name
// ----------------------------------------------------------------------------

/// Ordered-component hierarchical name
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Name {
    components: Vec<String>,
}

impl Name {
    /// Create an empty (root) name
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a slash-separated URI; the leading slash is optional
    ///
    /// Empty components (`/a//b`) are rejected.
    pub fn from_uri(uri: &str) -> ChronoChatResult<Self> {
        let trimmed = uri.strip_prefix('/').unwrap_or(uri);
        if trimmed.is_empty() {
            return Ok(Self::new());
        }

        let mut components = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(ChronoChatError::invalid_name(uri, "empty name component"));
            }
            components.push(segment.to_string());
        }
        Ok(Self { components })
    }

    /// Append one component
    pub fn append(mut self, component: impl Into<String>) -> ChronoChatResult<Self> {
        let component = component.into();
        if component.is_empty() || component.contains('/') {
            return Err(ChronoChatError::invalid_name(
                &component,
                "component must be non-empty and slash-free",
            ));
        }
        self.components.push(component);
        Ok(self)
    }

    /// Concatenate another name onto this one, keeping component order
    pub fn join(&self, other: &Name) -> Name {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        Name { components }
    }

    /// Component at `index`, if the name is deep enough
    pub fn component(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(String::as_str)
    }

    /// The first `count` components as a new name
    ///
    /// Returns `None` if the name is shorter than `count`.
    pub fn prefix(&self, count: usize) -> Option<Name> {
        if count > self.components.len() {
            return None;
        }
        Some(Name {
            components: self.components[..count].to_vec(),
        })
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = ChronoChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_parse_and_display_round_trip() {
        let name = Name::from_uri("/ndn/edu/colostate/alice").unwrap();
        assert_eq!(name.len(), 4);
        assert_eq!(name.to_string(), "/ndn/edu/colostate/alice");
    }

    #[test]
    fn test_leading_slash_is_optional() {
        let with = Name::from_uri("/alice").unwrap();
        let without = Name::from_uri("alice").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_empty_component_rejected() {
        assert!(Name::from_uri("/a//b").is_err());
        assert!(Name::new().append("").is_err());
        assert!(Name::new().append("a/b").is_err());
    }

    #[test]
    fn test_join_keeps_component_order() {
        let routing = Name::from_uri("/ndn/edu/colostate").unwrap();
        let user = Name::from_uri("/alice").unwrap();
        let joined = routing.join(&user);
        assert_eq!(joined.to_string(), "/ndn/edu/colostate/alice");
        assert_eq!(joined.component(3), Some("alice"));
    }

    #[test]
    fn test_prefix_requires_enough_components() {
        let name = Name::from_uri("/a/b/c").unwrap();
        assert_eq!(name.prefix(2).unwrap().to_string(), "/a/b");
        assert_eq!(name.prefix(3).unwrap(), name);
        assert!(name.prefix(4).is_none());
    }

    #[test]
    fn test_root_name_displays_as_slash() {
        assert_eq!(Name::new().to_string(), "/");
        assert_eq!(Name::from_uri("/").unwrap(), Name::new());
    }
}
