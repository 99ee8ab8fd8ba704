use super::{Segment, entity_refs, fill_missing, merge_by_key, table_rows};
use crate::consts;
use crate::models::{BreedingCombo, EntityRef};
use crate::url::UrlResolver;
use scraper::ElementRef;
use tracing::instrument;

/// Parses breeding combinations (parent + parent = child).
///
/// Each table row, or each innermost flex block linking exactly three pals,
/// is one combination. Rows with any other number of links are skipped
/// rather than guessed at. A combination is identified by its three slugs.
#[instrument(level = "trace", skip_all)]
pub fn breeding(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<BreedingCombo> {
    let tables: Vec<_> = if scope.value().name() == "table" {
        vec![scope]
    } else {
        scope.select(&consts::TABLE_SELECTOR).collect()
    };
    let candidates: Vec<Vec<EntityRef>> = if tables.is_empty() {
        flex_candidates(scope, resolver)
    } else {
        tables
            .into_iter()
            .flat_map(table_rows)
            .map(|segment| row_refs(&segment, resolver))
            .collect()
    };
    let combos = candidates.into_iter().filter_map(combo).collect();
    merge_by_key(
        combos,
        |c: &BreedingCombo| [&c.parents[0], &c.parents[1], &c.child].map(|e| e.slug.clone()),
        |kept, duplicate| {
            let [first, second] = duplicate.parents;
            fill_missing(&mut kept.parents[0].icon_url, first.icon_url);
            fill_missing(&mut kept.parents[1].icon_url, second.icon_url);
            fill_missing(&mut kept.child.icon_url, duplicate.child.icon_url);
        },
    )
}

/// One reference per cell, so that a pal bred with itself is not merged
/// into a single link. Single-cell rows fall back to the whole row.
fn row_refs(segment: &Segment, resolver: &UrlResolver<'_>) -> Vec<EntityRef> {
    let cells = segment.cells();
    if cells.len() < 2 {
        return entity_refs(segment.root(), resolver);
    }
    cells.into_iter().filter_map(|cell| entity_refs(cell, resolver).into_iter().next()).collect()
}

/// Flex blocks holding exactly three pals, excluding wrappers of such blocks.
///
/// Unlike stat rows, a combination's parents are often flex blocks of their
/// own (icon next to name), so "innermost" alone would split a combination.
fn flex_candidates(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<Vec<EntityRef>> {
    let blocks: Vec<_> = scope
        .select(&consts::FLEX_SELECTOR)
        .map(|block| (block, entity_refs(block, resolver)))
        .filter(|(_, refs)| refs.len() == 3)
        .collect();
    blocks
        .iter()
        .filter(|(block, _)| {
            !blocks
                .iter()
                .any(|(other, _)| other.id() != block.id() && other.ancestors().any(|a| a.id() == block.id()))
        })
        .map(|(_, refs)| refs.clone())
        .collect()
}

fn combo(refs: Vec<EntityRef>) -> Option<BreedingCombo> {
    let [first, second, child]: [EntityRef; 3] = refs.try_into().ok()?;
    Some(BreedingCombo { parents: [first, second], child })
}
