/// One entry of the pal list page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct PalSummary {
    pub slug: String,
    pub name: String,
    pub number: u32,
    pub number_raw: Option<String>,
    pub elements: Vec<String>,
    pub icon_url: Option<String>,
}
