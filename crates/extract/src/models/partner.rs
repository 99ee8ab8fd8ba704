use super::{DropEntry, LevelRow};

/// The pal's partner skill and its per-level tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct PartnerSkill {
    pub name: String,
    pub icon_url: Option<String>,
    pub description: Option<String>,
    pub passive: Vec<LevelRow>,
    pub active: Vec<LevelRow>,
    /// Items produced while assigned to a ranch
    pub ranch_items: Vec<DropEntry>,
}
impl PartnerSkill {
    /// Stats of the active part of the skill at the given level.
    pub fn active_at(&self, level: u32) -> Option<&LevelRow> {
        self.active.iter().find(|row| row.level == level)
    }
}
