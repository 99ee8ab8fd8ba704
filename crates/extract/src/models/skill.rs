use super::ItemRef;

/// An active skill a pal learns at a given level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct SkillEntry {
    pub level: u32,
    pub name: String,
    pub element: Option<String>,
    /// Cooldown in seconds
    pub cooldown: Option<u32>,
    pub power: Option<u32>,
    /// Status effect and magnitude as written, e.g. `Burning 30`
    pub status: Option<String>,
    pub description: Option<String>,
    /// Skill fruit (or other item) that teaches the skill
    pub unlock_item: Option<ItemRef>,
}
