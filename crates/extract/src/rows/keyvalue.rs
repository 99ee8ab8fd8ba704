use super::{Segment, first_image, segments};
use crate::models::{KeyValueRow, KeyValues};
use crate::text::text_of;
use crate::url::UrlResolver;
use scraper::ElementRef;
use tracing::instrument;

/// Parses a stat-like block (stats, movement, others) into ordered key/value rows.
///
/// Each row is either a flex block whose first child is the label and whose
/// remaining children are the value, or a table row of at least two cells.
/// Rows with an empty key or value are skipped; the first occurrence of a
/// key wins.
#[instrument(level = "trace", skip_all)]
pub fn key_values(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> KeyValues {
    segments(scope).iter().filter_map(|segment| key_value_row(segment, resolver)).collect()
}

fn key_value_row(segment: &Segment, resolver: &UrlResolver<'_>) -> Option<KeyValueRow> {
    let cells = segment.cells();
    let (label, rest) = cells.split_first()?;
    let key = text_of(*label).trim_end_matches(':').trim().to_string();
    let value = rest.iter().map(|cell| text_of(*cell)).filter(|v| !v.is_empty()).collect::<Vec<_>>().join(" ");
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some(KeyValueRow { key, value, icon_url: first_image(*label, resolver) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::Site;
    use scraper::Html;

    fn parse(html: &str) -> KeyValues {
        let fragment = Html::parse_fragment(html);
        let site = Site::default();
        key_values(fragment.root_element(), &site.resolver())
    }

    #[test]
    fn test_flex_rows() {
        let values = parse(
            r#"<div class="card-body">
                <div class="d-flex justify-content-between"><div><img src="/image/hp.png"> HP</div><div>100</div></div>
                <div class="d-flex justify-content-between"><div>Attack</div><div>50</div></div>
                <div class="d-flex justify-content-between"><div>HP</div><div>999</div></div>
                <div class="d-flex justify-content-between"><div>Empty</div><div> </div></div>
            </div>"#,
        );
        assert_eq!(values.keys().collect::<Vec<_>>(), ["HP", "Attack"]);
        assert_eq!(values.get("HP"), Some("100"));
        assert_eq!(values.row("HP").and_then(|r| r.icon_url.as_deref()), Some("https://cdn.paldb.cc/image/hp.png"));
    }

    #[test]
    fn test_table_rows() {
        let values = parse("<table><tr><th>Code:</th><td>SheepBall</td><tr><td>Rarity</td><td>1</td></table>");
        assert_eq!(values.get("Code"), Some("SheepBall"));
        assert_eq!(values.get("Rarity"), Some("1"));
    }

    #[test]
    fn test_outer_flex_containers_are_ignored() {
        let values = parse(
            r#"<div class="d-flex flex-column">
                <div class="d-flex"><div>Walk Speed</div><div>80</div></div>
                <div class="d-flex"><div>Run Speed</div><div>400</div></div>
            </div>"#,
        );
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("Run Speed"), Some("400"));
    }
}
