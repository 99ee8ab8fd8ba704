use super::{Segment, anchor_name, dedup_by_key, first_image, image_source, level_of, normalize_slug, segments};
use crate::consts;
use crate::models::{ItemRef, SkillEntry};
use crate::text::{clean_key, text_of};
use crate::url::UrlResolver;
use regex::Regex;
use scraper::ElementRef;
use tracing::instrument;

/// Column positions found in a skill table's header row.
#[derive(Debug, Default, Clone, Copy)]
struct Columns {
    level: Option<usize>,
    name: Option<usize>,
    element: Option<usize>,
    cooldown: Option<usize>,
    power: Option<usize>,
    description: Option<usize>,
}
impl Columns {
    fn from_header(segment: &Segment) -> Self {
        let mut columns = Self::default();
        for (i, cell) in segment.cells().into_iter().enumerate() {
            let header = text_of(cell).to_lowercase();
            let slot = if consts::LEVEL_HEADER_REGEX.is_match(&header) {
                &mut columns.level
            } else if header == "ct" || header.contains("cooldown") {
                &mut columns.cooldown
            } else if header.contains("power") {
                &mut columns.power
            } else if header.contains("element") {
                &mut columns.element
            } else if header.contains("description") || header.contains("effect") {
                &mut columns.description
            } else if header.contains("name") || header.contains("skill") {
                &mut columns.name
            } else {
                continue;
            };
            slot.get_or_insert(i);
        }
        columns
    }
}

/// Parses the active skill card.
///
/// Each row needs a level (numeric first cell, `Lv. N`, or the first bare
/// integer) and a name. When a header row is present, its labels decide
/// which cell holds which value; otherwise the values are recognised by
/// markup (`.element`, `.status`, `.description`) and by their `CT`/`Power`
/// prefixes. Duplicates of the same level and name keep the first row.
#[instrument(level = "trace", skip_all)]
pub fn active_skills(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Vec<SkillEntry> {
    let mut columns = Columns::default();
    let mut skills = Vec::new();
    for segment in segments(scope) {
        if segment.is_header() {
            columns = Columns::from_header(&segment);
            continue;
        }
        if let Some(skill) = skill_entry(&segment, &columns, resolver) {
            skills.push(skill);
        }
    }
    dedup_by_key(skills, |s: &SkillEntry| (s.level, s.name.to_lowercase()))
}

fn skill_entry(segment: &Segment, columns: &Columns, resolver: &UrlResolver<'_>) -> Option<SkillEntry> {
    let cells = segment.cells();
    let column = |index: Option<usize>| index.and_then(|i| cells.get(i)).map(|cell| text_of(*cell));
    let row_text = segment.text();

    let level_cell = column(columns.level).or_else(|| cells.first().map(|cell| text_of(*cell)));
    let level = level_of(level_cell.as_deref(), &row_text)?;

    let name = segment
        .select(&consts::ANCHOR_SELECTOR)
        .filter(|anchor| !is_item_anchor(*anchor))
        .map(anchor_name)
        .find(|name| !name.is_empty())
        .or_else(|| column(columns.name))
        .or_else(|| cells.get(1).map(|cell| text_of(*cell)))
        .filter(|name| !name.is_empty())?;

    let element = segment
        .select(&consts::ELEMENT_SELECTOR)
        .map(text_of)
        .find(|text| !text.is_empty())
        .or_else(|| column(columns.element).filter(|text| !text.is_empty()))
        .or_else(|| element_from_icon(segment));

    let cooldown = column(columns.cooldown)
        .and_then(|text| first_number(&text))
        .or_else(|| captured_number(&consts::COOLDOWN_REGEX, &row_text));
    let power = column(columns.power)
        .and_then(|text| first_number(&text))
        .or_else(|| captured_number(&consts::POWER_REGEX, &row_text));

    let status = segment.select(&consts::STATUS_SELECTOR).map(text_of).find(|text| !text.is_empty());
    let description = segment
        .select(&consts::DESCRIPTION_SELECTOR)
        .map(text_of)
        .find(|text| !text.is_empty())
        .or_else(|| column(columns.description).filter(|text| !text.is_empty()));

    let unlock_item = segment.select(&consts::ITEM_ANCHOR_SELECTOR).find_map(|anchor| {
        let slug = anchor.value().attr("href").and_then(normalize_slug)?;
        let name = anchor_name(anchor);
        (!name.is_empty()).then(|| ItemRef { slug, name, icon_url: first_image(anchor, resolver) })
    });

    Some(SkillEntry { level, name, element, cooldown, power, status, description, unlock_item })
}

fn is_item_anchor(anchor: ElementRef<'_>) -> bool {
    anchor.value().classes().any(|class| class == "itemname")
}

/// Element name from an element icon's `alt`, or its file name.
fn element_from_icon(segment: &Segment) -> Option<String> {
    segment.select(&consts::IMG_SELECTOR).find_map(|img| {
        let src = image_source(img)?;
        if !src.to_ascii_lowercase().contains("element") {
            return None;
        }
        let alt = img.value().attr("alt").map(clean_key).unwrap_or_default();
        if !alt.is_empty() {
            return Some(alt);
        }
        let file = src.rsplit('/').next()?.split('.').next()?;
        let name = file.rsplit('_').next()?;
        (!name.is_empty()).then(|| name.to_string())
    })
}

fn first_number(text: &str) -> Option<u32> {
    captured_number(&consts::BARE_INTEGER_REGEX, text)
}

fn captured_number(regex: &Regex, text: &str) -> Option<u32> {
    regex.captures(text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::Site;
    use scraper::Html;

    fn parse(html: &str) -> Vec<SkillEntry> {
        let fragment = Html::parse_fragment(html);
        let site = Site::default();
        active_skills(fragment.root_element(), &site.resolver())
    }

    #[test]
    fn test_table_with_headers() {
        let skills = parse(
            r#"<table>
                <tr><th>Lv</th><th>Skill</th><th>Element</th><th>CT</th><th>Power</th><th>Description</th></tr>
                <tr><td>1</td><td><a href="/en/Roly_Poly">Roly Poly</a></td><td>Neutral</td><td>1</td><td>35</td><td>Rolls at the enemy.</td></tr>
                <tr><td>7</td><td><a href="/en/Air_Cannon">Air Cannon</a></td><td>Neutral</td><td>2</td><td>25</td><td>Fires a blast.</td>
                <tr><td>7</td><td><a href="/en/Air_Cannon">Air Cannon</a></td><td>Neutral</td><td>9</td><td>99</td><td>Duplicate.</td></tr>
                <tr><td>x</td><td>No level anywhere</td></tr>
            </table>"#,
        );
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].level, 1);
        assert_eq!(skills[0].name, "Roly Poly");
        assert_eq!(skills[0].element.as_deref(), Some("Neutral"));
        assert_eq!(skills[0].cooldown, Some(1));
        assert_eq!(skills[0].power, Some(35));
        assert_eq!(skills[0].description.as_deref(), Some("Rolls at the enemy."));
        assert_eq!(skills[1].level, 7);
        assert_eq!(skills[1].power, Some(25));
    }

    #[test]
    fn test_markup_driven_rows() {
        let skills = parse(
            r#"<div class="card-body">
                <div class="d-flex"><span>Lv. 15</span><a href="/en/Spark_Blast">Spark Blast</a>
                    <span class="element">Electric</span><span>CT: 2</span><span>Power: 45</span>
                    <span class="status">Electrocuted 20</span><p class="description">Shoots a spark.</p>
                    <a class="itemname" href="/en/Skill_Fruit_Spark_Blast"><img src="/image/fruit.png">Skill Fruit: Spark Blast</a></div>
                <div class="d-flex"><span>Lv. 22</span><span>Fire Ball</span><img src="/image/element/T_Icon_element_s_Fire.png"></div>
            </div>"#,
        );
        assert_eq!(skills.len(), 2);
        let spark = &skills[0];
        assert_eq!(spark.level, 15);
        assert_eq!(spark.name, "Spark Blast");
        assert_eq!(spark.element.as_deref(), Some("Electric"));
        assert_eq!(spark.cooldown, Some(2));
        assert_eq!(spark.power, Some(45));
        assert_eq!(spark.status.as_deref(), Some("Electrocuted 20"));
        assert_eq!(spark.description.as_deref(), Some("Shoots a spark."));
        let fruit = spark.unlock_item.as_ref().unwrap();
        assert_eq!(fruit.slug, "Skill_Fruit_Spark_Blast");
        assert_eq!(fruit.icon_url.as_deref(), Some("https://cdn.paldb.cc/image/fruit.png"));

        let ball = &skills[1];
        assert_eq!(ball.level, 22);
        assert_eq!(ball.name, "Fire Ball");
        assert_eq!(ball.element.as_deref(), Some("Fire"));
        assert_eq!(ball.cooldown, None);
        assert_eq!(ball.unlock_item, None);
    }
}
