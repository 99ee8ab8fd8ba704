use super::{Segment, anchor_name, fill_missing, first_image, merge_by_key, normalize_slug, segments};
use crate::consts;
use crate::models::DropEntry;
use crate::text::text_of;
use crate::url::UrlResolver;
use scraper::ElementRef;
use tracing::instrument;

/// Parses a drop table (or any item table) into drop entries.
///
/// Rows without an item anchor that has both a name and a slug are skipped.
/// Duplicate rows (same item, quantity and probability) are collapsed into
/// the first, which takes a later copy's icon if it has none.
#[instrument(level = "trace", skip_all)]
pub fn drops(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<DropEntry> {
    let entries = segments(scope).iter().filter_map(|segment| drop_entry(segment, resolver)).collect();
    merge_by_key(
        entries,
        |d: &DropEntry| (d.item_slug.clone(), d.item_name.clone(), d.quantity.clone(), d.probability.clone()),
        |kept, duplicate| fill_missing(&mut kept.icon_url, duplicate.icon_url),
    )
}

fn drop_entry(segment: &Segment, resolver: &UrlResolver<'_>) -> Option<DropEntry> {
    let anchor = segment.select(&consts::ITEM_ANCHOR_SELECTOR).next().or_else(|| {
        segment
            .select(&consts::ANCHOR_SELECTOR)
            .find(|a| a.value().attr("href").and_then(normalize_slug).is_some())
    })?;
    let item_slug = anchor.value().attr("href").and_then(normalize_slug)?;
    let quantity = segment
        .select(&consts::QUANTITY_SELECTOR)
        .map(text_of)
        .find(|q| !q.is_empty() && !q.ends_with('%'));
    let mut item_name = anchor_name(anchor);
    if let Some(quantity) = quantity.as_deref()
        && let Some(stripped) = item_name.strip_suffix(quantity)
    {
        item_name = stripped.trim().to_string();
    }
    if item_name.is_empty() {
        return None;
    }
    // The icon is either inside the anchor or right next to it.
    let icon_url = first_image(anchor, resolver)
        .or_else(|| anchor.parent().and_then(ElementRef::wrap).and_then(|parent| first_image(parent, resolver)));
    // Leading percentages in a row can belong to other columns; the drop
    // chance is always the last one.
    let probability = consts::PERCENT_REGEX.find_iter(&segment.text()).last().map(|m| m.as_str().replace(' ', ""));
    Some(DropEntry { item_name, item_slug, icon_url, quantity, probability })
}
