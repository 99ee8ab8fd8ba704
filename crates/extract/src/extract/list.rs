use super::header::{elements, number_marker};
use crate::consts;
use crate::models::PalSummary;
use crate::rows::{anchor_name, dedup_by_key, first_image, has_nested, normalize_slug};
use crate::text::{clean_key, text_of};
use crate::url::UrlResolver;
use scraper::ElementRef;

/// Entries of the list page: innermost list items that link a page and show
/// a `#N` marker. The first entry for a slug wins.
pub(super) fn summaries(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<PalSummary> {
    let entries = scope
        .select(&consts::LIST_ENTRY_SELECTOR)
        .filter(|entry| !has_nested(*entry, &consts::LIST_ENTRY_SELECTOR))
        .filter_map(|entry| summary(entry, resolver))
        .collect();
    dedup_by_key(entries, |s: &PalSummary| s.slug.clone())
}

fn summary(entry: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Option<PalSummary> {
    let (number, number_raw) = number_marker(&text_of(entry))?;
    let (slug, name) = entry.select(&consts::ANCHOR_SELECTOR).find_map(|anchor| {
        let slug = anchor.value().attr("href").and_then(normalize_slug)?;
        let name = clean_key(&consts::NUMBER_MARKER_REGEX.replace_all(&anchor_name(anchor), ""));
        (!name.is_empty()).then_some((slug, name))
    })?;
    Some(PalSummary {
        slug,
        name,
        number,
        number_raw: Some(number_raw),
        elements: elements(entry),
        icon_url: first_image(entry, resolver),
    })
}
