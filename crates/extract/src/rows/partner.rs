use super::{drops, image_source, level_of, table_rows};
use crate::consts;
use crate::locate::{Card, PARTNER_SKILL_QUERY};
use crate::models::{KeyValueRow, KeyValues, LevelRow, PartnerSkill};
use crate::text::text_of;
use crate::url::UrlResolver;
use scraper::ElementRef;
use tracing::{instrument, trace};

/// What a table inside the partner skill card holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Per-level passive bonuses
    Passive,
    /// Per-level stats of the active part
    Active,
    /// Ranch items
    Items,
    Unknown,
}

/// Classifies a table by its markup, never by its position in the card.
///
/// A `passive`/`active` class token decides first, then an "Item" header,
/// then item markup co-occurring with a quantity or a percentage.
pub fn classify_table(table: ElementRef<'_>) -> TableKind {
    let class = table.value().attr("class").unwrap_or_default().to_ascii_lowercase();
    if class.contains("passive") {
        return TableKind::Passive;
    }
    if class.contains("active") {
        return TableKind::Active;
    }
    let item_header = table
        .select(&consts::HEADER_CELL_SELECTOR)
        .any(|th| text_of(th).to_lowercase().starts_with("item"));
    if item_header {
        return TableKind::Items;
    }
    let has_items = table.select(&consts::ITEM_ANCHOR_SELECTOR).next().is_some();
    let has_amounts = table.select(&consts::QUANTITY_SELECTOR).next().is_some()
        || consts::PERCENT_REGEX.is_match(&text_of(table));
    if has_items && has_amounts { TableKind::Items } else { TableKind::Unknown }
}

/// Maps a levelled table onto [`LevelRow`]s.
///
/// Column labels come from the header cells of the first row, minus a
/// leading level column. The first cell of every other row is its level and
/// cell N is labelled with header N-1 (`Value`/`Value N` when there is no
/// such header). A level that appears twice keeps its first position but
/// takes the values of the later row.
#[instrument(level = "trace", skip_all)]
pub fn levelled_table(table: ElementRef<'_>) -> Vec<LevelRow> {
    let rows = table_rows(table);
    let Some((first, rest)) = rows.split_first() else {
        return Vec::new();
    };
    let mut headers: Vec<String> = first
        .cells()
        .into_iter()
        .filter(|cell| cell.value().name() == "th")
        .map(text_of)
        .collect();
    if headers.first().is_some_and(|h| consts::LEVEL_HEADER_REGEX.is_match(h)) {
        headers.remove(0);
    }
    let data = if first.is_header() { rest } else { &rows[..] };

    let mut levelled: Vec<LevelRow> = Vec::new();
    for segment in data {
        let cells = segment.cells();
        if cells.len() < 2 {
            continue;
        }
        let texts: Vec<String> = cells.into_iter().map(text_of).collect();
        let Some(level) = level_of(texts.first().map(String::as_str), &segment.text()) else {
            continue;
        };
        let values: KeyValues = texts
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, value)| !value.is_empty())
            .map(|(n, value)| KeyValueRow { key: column_label(&headers, n), value: value.clone(), icon_url: None })
            .collect();
        let row = LevelRow { level, values };
        match levelled.iter_mut().find(|existing| existing.level == level) {
            Some(existing) => *existing = row,
            None => levelled.push(row),
        }
    }
    levelled
}

fn column_label(headers: &[String], n: usize) -> String {
    match headers.get(n - 1).filter(|h| !h.is_empty()) {
        Some(header) => header.clone(),
        None if n == 1 => "Value".to_string(),
        None => format!("Value {n}"),
    }
}

/// Assembles the partner skill from its card.
///
/// The name is the part of the card title after the colon
/// (`Partner Skill: Fluffy Shield`), or the whole title when there is none.
/// Returns `None` for a card that yields nothing at all.
#[instrument(level = "trace", skip_all, fields(title = %card.title))]
pub fn partner_skill(card: &Card<'_>, resolver: &UrlResolver<'_>) -> Option<PartnerSkill> {
    let name = match card.title.split_once(':') {
        Some((_, name)) => name.trim().to_string(),
        None => card.title.clone(),
    };
    let scope = card.element();
    let icon_url = skill_icon(scope, resolver);
    let description = scope
        .select(&consts::DESCRIPTION_SELECTOR)
        .filter(|element| !inside_table(*element))
        .map(text_of)
        .find(|text| !text.is_empty());

    let mut skill = PartnerSkill { name, icon_url, description, ..PartnerSkill::default() };
    for table in scope.select(&consts::TABLE_SELECTOR) {
        match classify_table(table) {
            TableKind::Passive => skill.passive.extend(levelled_table(table)),
            TableKind::Active => skill.active.extend(levelled_table(table)),
            TableKind::Items => skill.ranch_items.extend(drops(table, resolver)),
            TableKind::Unknown => trace!("skipping unclassified table"),
        }
    }
    let empty = skill.name.is_empty()
        && skill.description.is_none()
        && skill.passive.is_empty()
        && skill.active.is_empty()
        && skill.ranch_items.is_empty();
    (!empty).then_some(skill)
}

/// The skill's own icon: one matching a partner skill file name, else the
/// first image outside the card's tables.
fn skill_icon(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Option<String> {
    let matching = scope.select(&consts::IMG_SELECTOR).find_map(|img| {
        let src = image_source(img)?;
        let lower = src.to_ascii_lowercase();
        PARTNER_SKILL_QUERY
            .icon_patterns
            .iter()
            .any(|pattern| lower.contains(pattern))
            .then(|| resolver.resolve(src))
            .flatten()
    });
    matching.or_else(|| {
        scope
            .select(&consts::IMG_SELECTOR)
            .filter(|img| !inside_table(*img))
            .find_map(|img| image_source(img).and_then(|src| resolver.resolve(src)))
    })
}

fn inside_table(element: ElementRef<'_>) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(|a| a.value().name() == "table")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::Locator;
    use crate::url::Site;
    use scraper::Html;

    fn first_table(fragment: &Html) -> ElementRef<'_> {
        fragment.select(&consts::TABLE_SELECTOR).next().unwrap()
    }

    #[test]
    fn test_classify_table() {
        let cases = [
            (r#"<table class="table passive"><tr><td>1</td></tr></table>"#, TableKind::Passive),
            (r#"<table class="Active"><tr><td>1</td></tr></table>"#, TableKind::Active),
            ("<table><tr><th>Item</th><th>Count</th></tr></table>", TableKind::Items),
            (r#"<table><tr><td><a class="itemname" href="/en/Wool">Wool</a></td><td>50%</td></tr></table>"#, TableKind::Items),
            (r#"<table><tr><td><a class="itemname" href="/en/Wool">Wool</a></td></tr></table>"#, TableKind::Unknown),
            ("<table><tr><td>1</td></tr></table>", TableKind::Unknown),
        ];
        for (html, expected) in cases {
            let fragment = Html::parse_fragment(html);
            assert_eq!(classify_table(first_table(&fragment)), expected, "{html}");
        }
    }

    #[test]
    fn test_levelled_table_last_row_wins() {
        let fragment = Html::parse_fragment(
            r#"<table class="active">
                <tr><th>Level</th><th>Damage</th><th>CT</th></tr>
                <tr><td>1</td><td>100</td><td>10</td></tr>
                <tr><td>5</td><td>300</td><td>8</td></tr>
                <tr><td>2</td><td>150</td><td>9</td></tr>
                <tr><td>5</td><td>320</td><td>7</td></tr>
                <tr><td>3</td></tr>
            </table>"#,
        );
        let rows = levelled_table(first_table(&fragment));
        assert_eq!(rows.iter().map(|r| r.level).collect::<Vec<_>>(), [1, 5, 2]);
        assert_eq!(rows[1].values.get("Damage"), Some("320"));
        assert_eq!(rows[1].values.get("CT"), Some("7"));
        assert_eq!(rows[0].values.keys().collect::<Vec<_>>(), ["Damage", "CT"]);
    }

    #[test]
    fn test_levelled_table_without_headers() {
        let fragment = Html::parse_fragment("<table><tr><td>Lv.1</td><td>Defense +10%</td><td>x</td><tr><td>Lv.2</td><td>Defense +20%</td></table>");
        let rows = levelled_table(first_table(&fragment));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].level, 1);
        assert_eq!(rows[0].values.get("Value"), Some("Defense +10%"));
        assert_eq!(rows[0].values.get("Value 2"), Some("x"));
    }

    #[test]
    fn test_partner_skill_card() {
        let document = Html::parse_document(
            r#"<div class="card"><div class="card-body">
                <h5 class="card-title">Partner Skill: Fluffy Shield</h5>
                <img src="/image/Pal/Texture/T_icon_skill_pal_01.png">
                <p class="card-text">Equips a shield when activated.</p>
                <table class="passive"><tr><th>Lv</th><th>Effect</th></tr><tr><td>1</td><td>Shield 300</td></tr></table>
                <table><tr><th>Item</th><th>Rate</th></tr>
                    <tr><td><a class="itemname" href="/en/Wool"><img src="/image/wool.png">Wool</a></td><td>100%</td></tr></table>
            </div></div>"#,
        );
        let site = Site::default();
        let locator = Locator::new(&document);
        let card = locator.partner_skill().unwrap();
        let skill = partner_skill(card, &site.resolver()).unwrap();
        assert_eq!(skill.name, "Fluffy Shield");
        assert_eq!(skill.icon_url.as_deref(), Some("https://cdn.paldb.cc/image/Pal/Texture/T_icon_skill_pal_01.png"));
        assert_eq!(skill.description.as_deref(), Some("Equips a shield when activated."));
        assert_eq!(skill.passive.len(), 1);
        assert_eq!(skill.passive[0].values.get("Effect"), Some("Shield 300"));
        assert!(skill.active.is_empty());
        assert_eq!(skill.ranch_items.len(), 1);
        assert_eq!(skill.ranch_items[0].item_slug, "Wool");
    }
}
