/// A kind of base work the pal can do, with its suitability level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct WorkSuitability {
    pub name: String,
    pub level: u32,
    pub icon_url: Option<String>,
}
