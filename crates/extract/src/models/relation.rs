use super::{EntityRef, Link};

/// A member of a pal's tribe and the role it plays in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct TribeRow {
    pub entity: EntityRef,
    /// e.g. `Tribe Boss`, `Tribe Normal`
    pub role: String,
}

/// One place a pal spawns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct SpawnRow {
    pub entity: EntityRef,
    /// Spawn classification, e.g. `Normal` or `Alpha`
    pub role: String,
    /// Level range as written, e.g. `Lv. 1–3` (empty when not listed)
    pub level_range: String,
    /// Free-form source text (empty when not listed)
    pub source: String,
    pub locations: Vec<Link>,
}
