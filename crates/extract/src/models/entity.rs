use std::fmt::{Display, Formatter, Result as FmtResult};

/// Reference to another page on the wiki: a pal, usually.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct EntityRef {
    /// Bare page slug (no host, locale, query or fragment)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Absolute icon URL
    pub icon_url: Option<String>,
}
impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.name, self.slug)
    }
}

/// An item that unlocks or is produced by something (skill fruit, ranch item).
pub type ItemRef = EntityRef;

/// A named link without an icon, e.g. a spawn location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct Link {
    pub slug: String,
    pub name: String,
}
