//! Weighted structural scoring of candidate cards.
//!
//! When a section has to be found by its content rather than by its title,
//! several cards usually qualify (the partner skill is mentioned in the page
//! summary, in the stats card, and in its own card). Each candidate is reduced
//! to a set of [`Signals`] and the signals are weighed with [`ScoreWeights`].
//!
//! | Signal              | Kind     | Default weight |
//! |---------------------|----------|----------------|
//! | `<table>` elements  | count    | 4 each         |
//! | flex-layout rows    | presence | 2              |
//! | icon filename match | presence | 6              |
//! | item name/quantity  | presence | 5              |
//! | `passive` table     | presence | 12             |
//! | `active` table      | presence | 12             |
//! | fragment length     | per KiB  | 1, capped at 4 |
//!
//! Specific signals (a classified skill table) outweigh generic ones (size),
//! so a large but unrelated card cannot beat a small, precise one.

use crate::consts;
use crate::rows::image_source;
use scraper::ElementRef;

/// What a content query is looking for.
#[derive(Debug, Clone, Copy)]
pub struct ContentQuery {
    /// Text that must appear somewhere in a candidate (case-insensitive).
    pub needle: &'static str,
    /// Icon filename fragments that indicate the right card (case-insensitive).
    pub icon_patterns: &'static [&'static str],
}

/// Query used to find the partner skill card when its title can't be trusted.
pub const PARTNER_SKILL_QUERY: ContentQuery = ContentQuery {
    needle: "Partner Skill",
    icon_patterns: &["t_icon_skill_pal", "partnerskill", "partner_skill"],
};

/// Structural signals observed in one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub tables: usize,
    pub flex_layout: bool,
    pub icon_pattern: bool,
    pub item_markup: bool,
    pub passive_table: bool,
    pub active_table: bool,
    /// Serialised length of the fragment, in bytes.
    pub length: usize,
}
impl Signals {
    /// Collects the signals of a candidate element for a query.
    pub fn collect(element: ElementRef<'_>, query: &ContentQuery) -> Self {
        let mut signals = Self { length: element.html().len(), ..Self::default() };
        for table in element.select(&consts::TABLE_SELECTOR) {
            signals.tables += 1;
            for class in table.value().classes().map(str::to_ascii_lowercase) {
                if class.contains("passive") {
                    signals.passive_table = true;
                } else if class.contains("active") {
                    signals.active_table = true;
                }
            }
        }
        signals.flex_layout = element.select(&consts::FLEX_SELECTOR).next().is_some();
        signals.item_markup = element.select(&consts::ITEM_ANCHOR_SELECTOR).next().is_some()
            || element.select(&consts::QUANTITY_CLASS_SELECTOR).next().is_some();
        signals.icon_pattern = element.select(&consts::IMG_SELECTOR).any(|img| {
            image_source(img).is_some_and(|src| {
                let src = src.to_ascii_lowercase();
                query.icon_patterns.iter().any(|pattern| src.contains(pattern))
            })
        });
        signals
    }
}

/// Weight table for [`Signals`]; see the module documentation for defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    pub table: i64,
    pub flex_layout: i64,
    pub icon_pattern: i64,
    pub item_markup: i64,
    pub passive_table: i64,
    pub active_table: i64,
    pub per_kibibyte: i64,
    pub max_length: i64,
}
impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            table: 4,
            flex_layout: 2,
            icon_pattern: 6,
            item_markup: 5,
            passive_table: 12,
            active_table: 12,
            per_kibibyte: 1,
            max_length: 4,
        }
    }
}
impl ScoreWeights {
    /// Weighted sum of the signals.
    pub fn score(&self, signals: &Signals) -> i64 {
        let flag = |present: bool, weight: i64| if present { weight } else { 0 };
        let tables = i64::try_from(signals.tables).unwrap_or(i64::MAX / 2).saturating_mul(self.table);
        let kibibytes = i64::try_from(signals.length / 1024).unwrap_or(i64::MAX / 2);
        tables
            .saturating_add(flag(signals.flex_layout, self.flex_layout))
            .saturating_add(flag(signals.icon_pattern, self.icon_pattern))
            .saturating_add(flag(signals.item_markup, self.item_markup))
            .saturating_add(flag(signals.passive_table, self.passive_table))
            .saturating_add(flag(signals.active_table, self.active_table))
            .saturating_add(kibibytes.saturating_mul(self.per_kibibyte).min(self.max_length))
    }
}
