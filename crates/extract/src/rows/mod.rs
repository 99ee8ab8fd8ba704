//! Row parsers for the contents of located cards.
//!
//! Every parser takes a card (or a single table inside one) and returns the
//! rows it could make sense of. None of them fail: a row missing a required
//! field is skipped, and the rest of the table is still parsed.

mod combos;
mod items;
mod keyvalue;
mod occurrence;
mod partner;
mod relations;
mod skills;
mod work;

pub use self::combos::breeding;
pub use self::items::drops;
pub use self::keyvalue::key_values;
pub use self::occurrence::habitat;
pub use self::partner::{TableKind, classify_table, levelled_table, partner_skill};
pub use self::relations::{spawner, tribes};
pub use self::skills::active_skills;
pub use self::work::work_suitability;

use crate::consts;
use crate::models::EntityRef;
use crate::text::text_of;
use crate::url::UrlResolver;
use ::url::{ParseError, Url};
use memchr::memmem;
use scraper::{ElementRef, Html, Selector};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Splits table markup into one slice per `<tr`.
///
/// Segmentation does not rely on `</tr>`: some pages omit closing tags, and a
/// row simply runs until the next `<tr` (or the end of the input). Anything
/// before the first row (the `<table>` and `<thead>` openings) is dropped.
///
/// ```rust
/// use paldeck_extract::segment_rows;
/// let closed = "<table><tr><td>1</td></tr><tr><td>2</td></tr></table>";
/// let unclosed = "<table><tr><td>1</td><tr><td>2</td></table>";
/// assert_eq!(segment_rows(closed).len(), 2);
/// assert_eq!(segment_rows(unclosed).len(), 2);
/// ```
pub fn segment_rows(table_html: &str) -> Vec<&str> {
    let lower = table_html.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let starts: Vec<usize> = memmem::find_iter(bytes, b"<tr")
        .filter(|&start| bytes.get(start + 3).is_none_or(|b| b.is_ascii_whitespace() || matches!(*b, b'>' | b'/')))
        .collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| &table_html[start..starts.get(i + 1).copied().unwrap_or(table_html.len())])
        .collect()
}

/// One logical row: a table row or a flex block, re-parsed on its own so its
/// cells can be queried without trusting the surrounding markup.
pub(crate) struct Segment {
    html: Html,
    tabular: bool,
}
impl Segment {
    /// Parses a `<tr` segment. The synthetic table wrapper puts the tree
    /// builder into table mode, otherwise `<tr>`/`<td>` would be discarded.
    pub(crate) fn from_row(segment: &str) -> Self {
        Self {
            html: Html::parse_fragment(&format!("<table><tbody>{segment}</tbody></table>")),
            tabular: true,
        }
    }

    pub(crate) fn from_block(block: ElementRef<'_>) -> Self {
        Self { html: Html::parse_fragment(&block.html()), tabular: false }
    }

    /// The row (`<tr>`) or block element.
    pub(crate) fn root(&self) -> ElementRef<'_> {
        let root = self.html.root_element();
        if self.tabular {
            root.select(&consts::TR_SELECTOR).next().unwrap_or(root)
        } else {
            root.children().find_map(ElementRef::wrap).unwrap_or(root)
        }
    }

    /// Table cells, or the direct child elements of a block.
    pub(crate) fn cells(&self) -> Vec<ElementRef<'_>> {
        let root = self.root();
        if self.tabular {
            root.children()
                .filter_map(ElementRef::wrap)
                .filter(|e| matches!(e.value().name(), "td" | "th"))
                .collect()
        } else {
            root.children().filter_map(ElementRef::wrap).collect()
        }
    }

    /// `true` for table rows made only of `<th>` cells.
    pub(crate) fn is_header(&self) -> bool {
        let cells = self.cells();
        self.tabular && !cells.is_empty() && cells.iter().all(|c| c.value().name() == "th")
    }

    pub(crate) fn text(&self) -> String {
        text_of(self.root())
    }

    pub(crate) fn select<'s>(&'s self, selector: &'s Selector) -> impl Iterator<Item = ElementRef<'s>> + 's {
        self.root().select(selector)
    }
}

/// Rows of one table.
pub(crate) fn table_rows(table: ElementRef<'_>) -> Vec<Segment> {
    segment_rows(&table.html()).into_iter().map(Segment::from_row).collect()
}

/// Rows of every table in the scope (or of the scope itself, when it is a
/// table); when there is no table, its innermost flex blocks instead.
pub(crate) fn segments(scope: ElementRef<'_>) -> Vec<Segment> {
    if scope.value().name() == "table" {
        return table_rows(scope);
    }
    let tables: Vec<_> = scope.select(&consts::TABLE_SELECTOR).collect();
    if !tables.is_empty() {
        return tables.into_iter().flat_map(table_rows).collect();
    }
    scope
        .select(&consts::FLEX_SELECTOR)
        .filter(|block| !has_nested(*block, &consts::FLEX_SELECTOR))
        .map(Segment::from_block)
        .collect()
}

/// `true` if a descendant (other than the element itself) matches.
pub(crate) fn has_nested(element: ElementRef<'_>, selector: &Selector) -> bool {
    element.select(selector).any(|e| e.id() != element.id())
}

/// Level of a row: a numeric first cell, else `Lv. N`, else the first bare integer.
pub(crate) fn level_of(first_cell: Option<&str>, row_text: &str) -> Option<u32> {
    let positive = |n: u32| (n > 0).then_some(n);
    first_cell
        .and_then(|cell| cell.trim().parse::<u32>().ok())
        .and_then(positive)
        .or_else(|| {
            consts::LEVEL_PREFIX_REGEX
                .captures(row_text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .and_then(positive)
        })
        .or_else(|| {
            consts::BARE_INTEGER_REGEX
                .captures_iter(row_text)
                .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()))
                .find_map(positive)
        })
}

/// First usable source attribute of an image, following lazy-load conventions.
pub(crate) fn image_source<'e>(img: ElementRef<'e>) -> Option<&'e str> {
    consts::IMAGE_SOURCE_ATTRIBUTES.iter().find_map(|attr| {
        img.value()
            .attr(attr)
            .map(str::trim)
            .filter(|src| !src.is_empty() && !src.to_ascii_lowercase().starts_with("data:"))
    })
}

/// Absolute URL of the first resolvable image in the scope.
pub(crate) fn first_image(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Option<String> {
    scope.select(&consts::IMG_SELECTOR).find_map(|img| image_source(img).and_then(|src| resolver.resolve(src)))
}

/// Reduces a link to a bare page slug.
///
/// Scheme and host, query string, fragment, and a leading locale segment
/// (`en`, `zh-Hans`, ...) are stripped. Returns `None` when nothing is left
/// or the link has no path at all (`javascript:`, `mailto:`). Non-ASCII
/// characters stay percent-encoded, so the slug can be put back into a URL.
///
/// ```rust
/// use paldeck_extract::normalize_slug;
/// assert_eq!(normalize_slug("https://paldb.cc/en/Lamball?x=1#top").as_deref(), Some("Lamball"));
/// assert_eq!(normalize_slug("/ja/Wool").as_deref(), Some("Wool"));
/// assert_eq!(normalize_slug("#"), None);
/// ```
pub fn normalize_slug(href: &str) -> Option<String> {
    let href = href.trim();
    let url = match Url::parse(href) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(consts::RELATIVE_LINK_BASE).ok()?.join(href).ok()?,
        Err(_) => return None,
    };
    let mut parts: Vec<&str> = url.path_segments()?.filter(|p| !p.is_empty()).collect();
    if parts.len() > 1 && consts::LOCALE_SEGMENT_REGEX.is_match(parts[0]) {
        parts.remove(0);
    }
    let slug = parts.join("/");
    (!slug.is_empty()).then_some(slug)
}

/// Entity references of every anchor in the scope, in order.
///
/// Pages often link the same entity twice in a row (once around the icon,
/// once around the name); consecutive anchors with the same slug are merged
/// into one reference. References without a name are dropped.
pub(crate) fn entity_refs(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<EntityRef> {
    let mut refs: Vec<EntityRef> = Vec::new();
    for anchor in scope.select(&consts::ANCHOR_SELECTOR) {
        let Some(slug) = anchor.value().attr("href").and_then(normalize_slug) else {
            continue;
        };
        let name = anchor_name(anchor);
        let icon_url = first_image(anchor, resolver);
        match refs.last_mut() {
            Some(last) if last.slug == slug => {
                if last.name.is_empty() {
                    last.name = name;
                }
                if last.icon_url.is_none() {
                    last.icon_url = icon_url;
                }
            },
            _ => refs.push(EntityRef { slug, name, icon_url }),
        }
    }
    refs.retain(|r| !r.name.is_empty());
    refs
}

/// Visible text of an anchor, falling back to its image's `alt`.
pub(crate) fn anchor_name(anchor: ElementRef<'_>) -> String {
    let text = text_of(anchor);
    if !text.is_empty() {
        return text;
    }
    anchor
        .select(&consts::IMG_SELECTOR)
        .find_map(|img| img.value().attr("alt").map(crate::text::clean_key).filter(|alt| !alt.is_empty()))
        .unwrap_or_default()
}

/// Removes rows whose key was already seen, keeping the first.
pub(crate) fn dedup_by_key<T, K: Eq + Hash>(rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter().filter(|row| seen.insert(key(row))).collect()
}

/// Collapses rows sharing a key into the first one, folding each later
/// duplicate into it with `merge`.
pub(crate) fn merge_by_key<T, K: Eq + Hash>(rows: Vec<T>, key: impl Fn(&T) -> K, merge: impl Fn(&mut T, T)) -> Vec<T> {
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut merged: Vec<T> = Vec::with_capacity(rows.len());
    for row in rows {
        match positions.entry(key(&row)) {
            Entry::Occupied(position) => merge(&mut merged[*position.get()], row),
            Entry::Vacant(position) => {
                position.insert(merged.len());
                merged.push(row);
            },
        }
    }
    merged
}

/// Keeps `target`'s value, or takes the duplicate's when it has none.
pub(crate) fn fill_missing<T>(target: &mut Option<T>, duplicate: Option<T>) {
    if target.is_none() {
        *target = duplicate;
    }
}
