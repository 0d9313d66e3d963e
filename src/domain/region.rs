// Region domain model - identifiers for independently refreshable containers
use std::fmt;

/// Stable identifier of a container region (its `id` attribute in the page).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque reference to a non-region element (a menu link, a form, a table).
/// Only the document that handed it out knows how to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementKey(String);

impl ElementKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where a navigation element lives, which decides how it gets highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavScope {
    /// Inside the main menu: exclusive, only one entry is ever active.
    Menu,
    /// Inside an action table: every matching row is marked.
    ActionTable(ElementKey),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKind {
    Link,
    Form,
}

/// A navigation element whose target matches a requested URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavMatch {
    pub element: ElementKey,
    pub scope: NavScope,
    pub kind: NavKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id_display() {
        let id = RegionId::from("col1");
        assert_eq!(id.to_string(), "col1");
        assert_eq!(id.as_str(), "col1");
        assert_eq!(id, RegionId::new(String::from("col1")));
    }
}
