/// Where (and how often) a pal appears on the world map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct HabitatInfo {
    pub day: Option<HabitatSlot>,
    pub night: Option<HabitatSlot>,
}
impl HabitatInfo {
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.night.is_none()
    }
}

/// Occurrence count and map link for one time of day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct HabitatSlot {
    pub count: Option<u32>,
    pub map_url: Option<String>,
}
