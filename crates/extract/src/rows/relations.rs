use super::{Segment, anchor_name, entity_refs, fill_missing, merge_by_key, normalize_slug, segments};
use crate::consts;
use crate::models::{Link, SpawnRow, TribeRow};
use crate::text::text_of;
use crate::url::UrlResolver;
use scraper::ElementRef;
use tracing::instrument;

/// Parses the tribe card: one row per tribe member with its role.
///
/// The entity is the first linked page of the row, the role is the last cell
/// that holds plain text only. Rows missing either are dropped; rows naming
/// the same entity and role are one entry, whichever copy carries the icon.
#[instrument(level = "trace", skip_all)]
pub fn tribes(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<TribeRow> {
    let rows = segments(scope)
        .iter()
        .filter_map(|segment| {
            let entity = entity_refs(segment.root(), resolver).into_iter().next()?;
            let role = segment
                .cells()
                .into_iter()
                .rev()
                .filter(|cell| !has_anchor(*cell))
                .map(text_of)
                .find(|text| !text.is_empty())?;
            Some(TribeRow { entity, role })
        })
        .collect();
    merge_by_key(
        rows,
        |row: &TribeRow| (row.entity.slug.clone(), row.entity.name.clone(), row.role.clone()),
        |kept, duplicate| fill_missing(&mut kept.entity.icon_url, duplicate.entity.icon_url),
    )
}

/// Parses the spawner card.
///
/// The first cell holds the pal. Of the remaining cells, a level range
/// (`Lv. 1–3`) is recognised by shape, cells with links contribute spawn
/// locations, the first plain cell is the role and any further plain cells
/// are the source text.
#[instrument(level = "trace", skip_all)]
pub fn spawner(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<SpawnRow> {
    let rows = segments(scope).iter().filter_map(|segment| spawn_row(segment, resolver)).collect();
    merge_by_key(
        rows,
        |row: &SpawnRow| {
            let SpawnRow { entity, role, level_range, source, locations } = row;
            let (slug, name) = (entity.slug.clone(), entity.name.clone());
            (slug, name, role.clone(), level_range.clone(), source.clone(), locations.clone())
        },
        |kept, duplicate| fill_missing(&mut kept.entity.icon_url, duplicate.entity.icon_url),
    )
}

fn spawn_row(segment: &Segment, resolver: &UrlResolver<'_>) -> Option<SpawnRow> {
    let cells = segment.cells();
    let (first, rest) = cells.split_first()?;
    let entity = entity_refs(*first, resolver).into_iter().next()?;
    let mut role = None;
    let mut level_range = String::new();
    let mut source = Vec::new();
    let mut locations = Vec::new();
    for cell in rest {
        let text = text_of(*cell);
        if consts::LEVEL_RANGE_REGEX.is_match(&text) {
            level_range = text;
        } else if has_anchor(*cell) {
            locations.extend(cell.select(&consts::ANCHOR_SELECTOR).filter_map(|anchor| {
                let slug = anchor.value().attr("href").and_then(normalize_slug)?;
                let name = anchor_name(anchor);
                (!name.is_empty()).then_some(Link { slug, name })
            }));
        } else if text.is_empty() {
            continue;
        } else if role.is_none() {
            role = Some(text);
        } else {
            source.push(text);
        }
    }
    Some(SpawnRow { entity, role: role?, level_range, source: source.join(" "), locations })
}

fn has_anchor(element: ElementRef<'_>) -> bool {
    element.select(&consts::ANCHOR_SELECTOR).next().is_some()
}
