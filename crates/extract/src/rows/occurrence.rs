use super::{first_image, image_source};
use crate::consts;
use crate::models::{HabitatInfo, HabitatSlot};
use crate::text::text_of;
use crate::url::UrlResolver;
use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::instrument;

/// Parses day and night occurrence counts and map links.
///
/// Marked blocks (`.day`, `[data-time="day"]`, and the night equivalents)
/// are preferred. Without them, the counts are read from "Day ... N" text
/// and the map from a link or image whose URL mentions the time of day.
#[instrument(level = "trace", skip_all)]
pub fn habitat(scope: ElementRef<'_>, resolver: &UrlResolver<'_>) -> Option<HabitatInfo> {
    let text = text_of(scope);
    let info = HabitatInfo {
        day: slot(scope, &consts::DAY_SELECTOR, &consts::HABITAT_DAY_TEXT_REGEX, "day", &text, resolver),
        night: slot(scope, &consts::NIGHT_SELECTOR, &consts::HABITAT_NIGHT_TEXT_REGEX, "night", &text, resolver),
    };
    (!info.is_empty()).then_some(info)
}

fn slot(
    scope: ElementRef<'_>,
    marker: &Selector,
    text_pattern: &Regex,
    keyword: &str,
    text: &str,
    resolver: &UrlResolver<'_>,
) -> Option<HabitatSlot> {
    let slot = match scope.select(marker).next() {
        Some(block) => HabitatSlot {
            count: first_integer(&text_of(block)),
            map_url: block
                .select(&consts::ANCHOR_SELECTOR)
                .find_map(|a| a.value().attr("href").and_then(|href| resolver.resolve(href)))
                .or_else(|| first_image(block, resolver)),
        },
        None => HabitatSlot {
            count: text_pattern.captures(text).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse().ok()),
            map_url: keyword_url(scope, keyword, resolver),
        },
    };
    (slot.count.is_some() || slot.map_url.is_some()).then_some(slot)
}

fn first_integer(text: &str) -> Option<u32> {
    consts::BARE_INTEGER_REGEX.captures(text)?.get(1)?.as_str().parse().ok()
}

fn keyword_url(scope: ElementRef<'_>, keyword: &str, resolver: &UrlResolver<'_>) -> Option<String> {
    scope
        .select(&consts::ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .chain(scope.select(&consts::IMG_SELECTOR).filter_map(image_source))
        .filter(|url| url.to_ascii_lowercase().contains(keyword))
        .find_map(|url| resolver.resolve(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::Site;
    use scraper::Html;

    fn parse(html: &str) -> Option<HabitatInfo> {
        let fragment = Html::parse_fragment(html);
        let site = Site::default();
        habitat(fragment.root_element(), &site.resolver())
    }

    #[test]
    fn test_marked_blocks() {
        let info = parse(
            r#"<div class="card-body">
                <div class="day"><a href="/en/Map?pal=SheepBall&amp;t=day">Day</a> <span>42</span></div>
                <div data-time="night"><img src="/cache/map_night_SheepBall.png"> 0</div>
            </div>"#,
        )
        .unwrap();
        let day = info.day.unwrap();
        assert_eq!(day.count, Some(42));
        assert_eq!(day.map_url.as_deref(), Some("https://paldb.cc/en/Map?pal=SheepBall&t=day"));
        let night = info.night.unwrap();
        assert_eq!(night.count, Some(0));
        assert_eq!(night.map_url.as_deref(), Some("https://cdn.paldb.cc/cache/map_night_SheepBall.png"));
    }

    #[test]
    fn test_text_fallback() {
        let info = parse(r#"<div><p>Day: 12 locations</p><img src="/cache/day/SheepBall.png"></div>"#).unwrap();
        let day = info.day.unwrap();
        assert_eq!(day.count, Some(12));
        assert_eq!(day.map_url.as_deref(), Some("https://cdn.paldb.cc/cache/day/SheepBall.png"));
        assert_eq!(info.night, None);
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(parse("<div><p>Unknown habitat</p></div>"), None);
    }
}
