//! The page header: name, paldeck number, elements and portrait.

use crate::consts;
use crate::rows::{first_image, image_source};
use crate::text::{clean_key, text_of};
use crate::url::UrlResolver;
use scraper::{ElementRef, Html};

#[derive(Debug)]
pub(super) struct Header {
    pub name: Option<String>,
    pub number: u32,
    pub number_raw: Option<String>,
    pub elements: Vec<String>,
    pub image_url: Option<String>,
}
impl Header {
    pub fn parse(document: &Html, resolver: &UrlResolver<'_>) -> Self {
        let title = document
            .select(&consts::PAL_NAME_SELECTOR)
            .chain(document.select(&consts::H1_SELECTOR))
            .find(|element| !text_of(*element).is_empty());
        let scope = title.map(header_scope);

        let (number, number_raw) = title
            .and_then(|title| number_marker(&text_of(title)))
            .or_else(|| scope.and_then(|scope| number_marker(&text_of(scope))))
            .map_or((0, None), |(number, raw)| (number, Some(raw)));
        let name = title
            .map(|title| clean_key(&consts::NUMBER_MARKER_REGEX.replace_all(&text_of(title), "")))
            .filter(|name| !name.is_empty());
        let image_url = document
            .select(&consts::PAL_IMAGE_SELECTOR)
            .find_map(|img| image_source(img).and_then(|src| resolver.resolve(src)))
            .or_else(|| scope.and_then(|scope| first_image(scope, resolver)));

        Self { name, number, number_raw, elements: scope.map(elements).unwrap_or_default(), image_url }
    }
}

/// The card around the title, or the title's parent on card-less pages.
fn header_scope(title: ElementRef<'_>) -> ElementRef<'_> {
    title
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| consts::CARD_SELECTOR.matches(ancestor))
        .or_else(|| title.parent().and_then(ElementRef::wrap))
        .unwrap_or(title)
}

/// `#12` → `(12, "12")`, `#12B` → `(12, "12B")`.
pub(super) fn number_marker(text: &str) -> Option<(u32, String)> {
    let captures = consts::NUMBER_MARKER_REGEX.captures(text)?;
    let digits = captures.get(1)?.as_str();
    let suffix = captures.get(2).map_or("", |m| m.as_str());
    let number = digits.parse().unwrap_or_default();
    Some((number, format!("{digits}{suffix}")))
}

/// Element tags in a scope, by their text or, failing that, their icon's `alt`.
pub(super) fn elements(scope: ElementRef<'_>) -> Vec<String> {
    let mut elements: Vec<String> = Vec::new();
    for element in scope.select(&consts::ELEMENT_SELECTOR) {
        let name = Some(text_of(element)).filter(|text| !text.is_empty()).or_else(|| {
            element
                .select(&consts::IMG_SELECTOR)
                .find_map(|img| img.value().attr("alt").map(clean_key).filter(|alt| !alt.is_empty()))
        });
        if let Some(name) = name
            && !elements.contains(&name)
        {
            elements.push(name);
        }
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::Site;
    use rstest::rstest;

    #[rstest]
    #[case("Lamball #1", Some((1, "1")))]
    #[case("#005B Foxparks", Some((5, "005B")))]
    #[case("#99999999999", Some((0, "99999999999")))]
    #[case("Lamball", None)]
    fn test_number_marker(#[case] text: &str, #[case] expected: Option<(u32, &str)>) {
        assert_eq!(number_marker(text), expected.map(|(n, raw)| (n, raw.to_string())));
    }

    #[test]
    fn test_header() {
        let document = Html::parse_document(
            r#"<div class="card"><div class="d-flex">
                <img class="pal-image" data-src="/image/Pal/T_SheepBall_icon.webp">
                <div><h1 class="pal-name">Lamball <small>#1</small></h1>
                <span class="element">Neutral</span><span class="element"><img alt="Ice"></span><span class="element">Neutral</span></div>
            </div></div>"#,
        );
        let site = Site::default();
        let header = Header::parse(&document, &site.resolver());
        assert_eq!(header.name.as_deref(), Some("Lamball"));
        assert_eq!(header.number, 1);
        assert_eq!(header.number_raw.as_deref(), Some("1"));
        assert_eq!(header.elements, ["Neutral", "Ice"]);
        assert_eq!(header.image_url.as_deref(), Some("https://cdn.paldb.cc/image/Pal/T_SheepBall_icon.webp"));
    }

    #[test]
    fn test_marker_only_in_card() {
        let document = Html::parse_document(r#"<div class="card"><h1>Foxparks</h1><span>#5B</span></div>"#);
        let header = Header::parse(&document, &Site::default().resolver());
        assert_eq!(header.name.as_deref(), Some("Foxparks"));
        assert_eq!(header.number, 5);
        assert_eq!(header.number_raw.as_deref(), Some("5B"));
        assert!(header.elements.is_empty());
        assert_eq!(header.image_url, None);
    }
}
