//! Selectors and patterns describing the wiki's current markup.
//!
//! The source site publishes no markup contract. Everything in here is the
//! best-known signature of the pages as they are today, not an invariant;
//! the locator and the row parsers layer fallbacks on top of these so that
//! drift degrades output instead of breaking it.

use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Path prefixes served from the CDN rather than the site origin.
pub(crate) const CDN_PATH_PREFIXES: [&str; 3] = ["/image/", "/cache/", "/img/"];
/// Placeholder origin that relative links are joined onto before their path is read.
pub(crate) const RELATIVE_LINK_BASE: &str = "http://relative.invalid/";
/// Attributes checked, in order, for an image's source (lazy-loading puts the
/// real URL in one of the `data-*` attributes).
pub(crate) const IMAGE_SOURCE_ATTRIBUTES: [&str; 4] = ["src", "data-src", "data-lazy-src", "data-original"];
/// Classification text marking the alpha/boss row of a tribe.
pub const TRIBE_BOSS_ROLE: &str = "Tribe Boss";

// Cards
selector!(CARD_SELECTOR, "div.card");
selector!(CARD_TITLE_SELECTOR, ".card-title");
selector!(HEADING_SELECTOR, "h1, h2, h3, h4, h5, h6");
selector!(FALLBACK_HEADING_SELECTOR, ".card-title, h2, h3, h4, h5");
// Structure
selector!(TABLE_SELECTOR, "table");
selector!(TR_SELECTOR, "tr");
selector!(CELL_SELECTOR, "td, th");
selector!(HEADER_CELL_SELECTOR, "th");
selector!(FLEX_SELECTOR, ".d-flex");
selector!(ANCHOR_SELECTOR, "a[href]");
selector!(IMG_SELECTOR, "img");
// Content markers
selector!(ITEM_ANCHOR_SELECTOR, "a.itemname");
selector!(QUANTITY_SELECTOR, ".quantity, small");
selector!(QUANTITY_CLASS_SELECTOR, ".quantity");
selector!(ELEMENT_SELECTOR, ".element");
selector!(STATUS_SELECTOR, ".status");
selector!(DESCRIPTION_SELECTOR, ".description, .card-text");
selector!(DAY_SELECTOR, ".day, [data-time=\"day\"]");
selector!(NIGHT_SELECTOR, ".night, [data-time=\"night\"]");
// Page header and list page
selector!(H1_SELECTOR, "h1");
selector!(PAL_NAME_SELECTOR, ".pal-name");
selector!(PAL_IMAGE_SELECTOR, "img.pal-image");
selector!(LIST_ENTRY_SELECTOR, "div.col, .pal-list-item");

regex!(NUMBER_MARKER_REGEX, r"#(\d+)([A-Za-z])?");
regex!(LEVEL_PREFIX_REGEX, r"(?i)\bLv\.?\s*(\d+)");
regex!(LEVEL_HEADER_REGEX, r"(?i)^(?:lv\.?|lvl\.?|level)$");
regex!(LEVEL_RANGE_REGEX, r"(?i)^Lv\.?\s*\d+(?:\s*[-–~]\s*\d+)?$");
regex!(BARE_INTEGER_REGEX, r"\b(\d+)\b");
regex!(PERCENT_REGEX, r"\d+(?:[.,]\d+)?\s*%");
regex!(COOLDOWN_REGEX, r"(?i)\b(?:CT|Cooldown)\s*:?\s*(\d+)");
regex!(POWER_REGEX, r"(?i)\bPower\s*:?\s*(\d+)");
regex!(LOCALE_SEGMENT_REGEX, r"^[a-z]{2}(?:[-_][A-Za-z]{2,4})?$");
regex!(ABSOLUTE_URL_REGEX, r"(?i)^https?://");
regex!(HABITAT_DAY_TEXT_REGEX, r"(?i)\bday\b\D{0,12}?(\d+)");
regex!(HABITAT_NIGHT_TEXT_REGEX, r"(?i)\bnight\b\D{0,12}?(\d+)");

// Section titles, matched case-insensitively as substrings of card titles.
pub(crate) const STATS_TITLE: &str = "Stats";
pub(crate) const MOVEMENT_TITLE: &str = "Movement";
pub(crate) const OTHERS_TITLE: &str = "Others";
pub(crate) const WORK_TITLE: &str = "Work Suitability";
pub(crate) const ACTIVE_SKILLS_TITLE: &str = "Active Skill";
pub(crate) const DROPS_TITLE: &str = "Drops";
pub(crate) const TRIBES_TITLE: &str = "Tribes";
pub(crate) const SPAWNER_TITLE: &str = "Spawner";
pub(crate) const HABITAT_TITLE: &str = "Habitat";
pub(crate) const BREEDING_TITLE: &str = "Breeding";
/// Key of the internal code in the "Others" block.
pub(crate) const CODE_KEY: &str = "Code";
