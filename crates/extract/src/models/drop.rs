/// An item a pal drops (or produces at the ranch).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct DropEntry {
    pub item_name: String,
    pub item_slug: String,
    pub icon_url: Option<String>,
    /// Quantity exactly as written, which may be a range such as `1–3`.
    pub quantity: Option<String>,
    /// Probability exactly as written, such as `50%`.
    pub probability: Option<String>,
}
