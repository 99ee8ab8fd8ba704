use super::{
    BreedingCombo, DropEntry, HabitatInfo, KeyValues, PartnerSkill, SkillEntry, SpawnRow, TribeRow, WorkSuitability,
};
use crate::consts::TRIBE_BOSS_ROLE;

/// Everything extracted from a single pal detail page.
///
/// Sections the page does not have (or that could not be located) are
/// `None`; an empty `Vec` means the section exists but had no valid rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct PalDetail {
    /// Page slug the record was requested for
    pub id: String,
    /// Display name, never empty (falls back to `id`)
    pub name: String,
    /// Paldeck number, `0` when the page has none
    pub number: u32,
    /// Number as written, including any variant suffix (e.g. `5B`)
    pub number_raw: Option<String>,
    /// Element tags
    pub elements: Vec<String>,
    pub image_url: Option<String>,
    pub stats: Option<KeyValues>,
    pub movement: Option<KeyValues>,
    pub others: Option<KeyValues>,
    pub work_suitability: Option<Vec<WorkSuitability>>,
    pub partner_skill: Option<PartnerSkill>,
    pub active_skills: Option<Vec<SkillEntry>>,
    pub drops: Option<Vec<DropEntry>>,
    pub tribes: Option<Vec<TribeRow>>,
    pub spawner: Option<Vec<SpawnRow>>,
    pub habitat: Option<HabitatInfo>,
    pub breeding: Option<Vec<BreedingCombo>>,
    /// Internal code of the pal (e.g. `SheepBall`)
    pub code: Option<String>,
    /// Breeding calculator link, present only when `code` is
    pub breeding_calculator_url: Option<String>,
}
impl PalDetail {
    /// Returns `true` if this pal leads a tribe (it is the alpha of its group).
    ///
    /// Derived from the tribe rows every time; it is never stored.
    pub fn is_alpha(&self) -> bool {
        self.tribes
            .as_deref()
            .is_some_and(|rows| rows.iter().any(|row| row.role.eq_ignore_ascii_case(TRIBE_BOSS_ROLE)))
    }

    /// Returns `true` if the pal is a regional variant (`#5B` rather than `#5`).
    pub fn is_variant(&self) -> bool {
        self.number_raw.as_deref().is_some_and(|raw| raw.ends_with(|c: char| c.is_ascii_alphabetic()))
    }
}
