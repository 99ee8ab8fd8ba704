use super::{anchor_name, dedup_by_key, first_image, segments};
use crate::consts;
use crate::models::WorkSuitability;
use crate::text::{clean_key, text_of};
use crate::url::UrlResolver;
use scraper::ElementRef;
use tracing::instrument;

/// Parses the work suitability card: one row per kind of work, each with an
/// icon, a name and a level (`Lv 2`, or the last number of the row).
#[instrument(level = "trace", skip_all)]
pub fn work_suitability(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<WorkSuitability> {
    let rows = segments(scope)
        .iter()
        .filter_map(|segment| {
            let root = segment.root();
            let text = segment.text();
            let level = level(&text)?;
            let name = root
                .select(&consts::ANCHOR_SELECTOR)
                .map(anchor_name)
                .find(|name| !name.is_empty())
                .or_else(|| {
                    root.select(&consts::IMG_SELECTOR)
                        .filter_map(|img| img.value().attr("alt").map(clean_key))
                        .find(|alt| !alt.is_empty())
                })
                .or_else(|| segment.cells().first().map(|cell| strip_level(&text_of(*cell))))
                .filter(|name| !name.is_empty())?;
            Some(WorkSuitability { name, level, icon_url: first_image(root, resolver) })
        })
        .collect();
    dedup_by_key(rows, |w: &WorkSuitability| w.name.to_lowercase())
}

fn level(text: &str) -> Option<u32> {
    let prefixed = consts::LEVEL_PREFIX_REGEX.captures(text).and_then(|c| c.get(1));
    let last = || consts::BARE_INTEGER_REGEX.captures_iter(text).filter_map(|c| c.get(1)).last();
    prefixed.or_else(last)?.as_str().parse().ok().filter(|level| *level > 0)
}

fn strip_level(text: &str) -> String {
    let text = consts::LEVEL_PREFIX_REGEX.replace_all(text, "");
    clean_key(text.trim_end_matches(|c: char| c.is_ascii_digit() || c.is_whitespace()))
}
