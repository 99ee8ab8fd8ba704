//! Structured data extraction from Palworld wiki pages.
//!
//! The wiki has no API and no markup contract, so extraction is layered:
//!
//! - [`Locator`] finds the card holding a named section, with a weighted
//!   content scorer for ambiguous sections,
//! - the row parsers in this crate turn a located card into typed rows,
//!   skipping rows they can't make sense of,
//! - [`Extractor`] runs both for a whole page and assembles a [`PalDetail`]
//!   (or a list of [`PalSummary`]).
//!
//! Every URL in the output is absolute, see [`UrlResolver`].
//!
//! [`PalDetail`]: models::PalDetail
//! [`PalSummary`]: models::PalSummary

mod consts;
pub mod error;
mod extract;
mod locate;
pub mod models;
mod rows;
mod template;
mod text;
mod url;

pub use crate::consts::TRIBE_BOSS_ROLE;
pub use crate::extract::{Extractor, extract_detail, extract_list};
pub use crate::locate::{Card, ContentQuery, Locator, PARTNER_SKILL_QUERY, ScoreWeights, Signals, Tier};
pub use crate::rows::{
    TableKind, active_skills, breeding, classify_table, drops, habitat, key_values, levelled_table, normalize_slug,
    partner_skill, segment_rows, spawner, tribes, work_suitability,
};
pub use crate::template::UrlTemplate;
pub use crate::text::{clean_key, to_plain_text};
pub use crate::url::{Site, UrlResolver};
