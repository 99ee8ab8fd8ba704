//! Assembly of whole records from a detail or list page.

mod header;
mod list;

use self::header::Header;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::locate::{Card, Locator};
use crate::models::{PalDetail, PalSummary};
use crate::rows;
use crate::template::UrlTemplate;
use crate::url::Site;
use scraper::Html;
use tracing::{debug, instrument, warn};

/// Extracts structured records from one parsed wiki page.
///
/// Extraction never fails once the extractor exists: sections that cannot be
/// located are `None` on the record, rows that cannot be parsed are dropped.
#[derive(Debug)]
pub struct Extractor {
    document: Html,
    site: Site,
    breeding_url: UrlTemplate,
}
impl Extractor {
    /// Parses a page.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::EmptyDocument`] if the input is empty or whitespace,
    /// - [`ErrorKind::Template`] if the site's breeding URL template is invalid.
    pub fn new(html: &str, site: Site) -> Result<Self> {
        if html.trim().is_empty() {
            exn::bail!(ErrorKind::EmptyDocument);
        }
        Self::from_document(Html::parse_document(html), site)
    }

    pub fn from_document(document: Html, site: Site) -> Result<Self> {
        let breeding_url = site.breeding_url_template.parse()?;
        Ok(Self { document, site, breeding_url })
    }

    /// Extracts the detail record of the pal the page describes.
    ///
    /// `slug` is the page the document was requested for. It becomes the
    /// record's `id`, and its `name` when the page shows none.
    #[instrument(level = "debug", skip(self))]
    pub fn detail(&self, slug: &str) -> PalDetail {
        let resolver = self.site.resolver();
        let locator = Locator::new(&self.document);
        let section = |title: &str| locator.find(title).map(Card::element);
        let header = Header::parse(&self.document, &resolver);

        let others = section(consts::OTHERS_TITLE).map(|card| rows::key_values(card, &resolver));
        let code = others.as_ref().and_then(|others| others.get(consts::CODE_KEY)).map(str::to_string);
        let breeding_calculator_url = code.as_deref().and_then(|code| self.breeding_url(code));

        let detail = PalDetail {
            id: slug.to_string(),
            name: header.name.unwrap_or_else(|| slug.to_string()),
            number: header.number,
            number_raw: header.number_raw,
            elements: header.elements,
            image_url: header.image_url,
            stats: section(consts::STATS_TITLE).map(|card| rows::key_values(card, &resolver)),
            movement: section(consts::MOVEMENT_TITLE).map(|card| rows::key_values(card, &resolver)),
            others,
            work_suitability: section(consts::WORK_TITLE).map(|card| rows::work_suitability(card, &resolver)),
            partner_skill: locator.partner_skill().and_then(|card| rows::partner_skill(card, &resolver)),
            active_skills: section(consts::ACTIVE_SKILLS_TITLE).map(|card| rows::active_skills(card, &resolver)),
            drops: section(consts::DROPS_TITLE).map(|card| rows::drops(card, &resolver)),
            tribes: section(consts::TRIBES_TITLE).map(|card| rows::tribes(card, &resolver)),
            spawner: section(consts::SPAWNER_TITLE).map(|card| rows::spawner(card, &resolver)),
            habitat: section(consts::HABITAT_TITLE).and_then(|card| rows::habitat(card, &resolver)),
            breeding: section(consts::BREEDING_TITLE).map(|card| rows::breeding(card, &resolver)),
            code,
            breeding_calculator_url,
        };
        debug!(tier = ?locator.tier(), cards = locator.cards().len(), "extracted detail");
        detail
    }

    /// Extracts every entry of the pal list page.
    #[instrument(level = "debug", skip(self))]
    pub fn summaries(&self) -> Vec<PalSummary> {
        list::summaries(self.document.root_element(), &self.site.resolver())
    }

    /// Calculator link for a code, resolved like any other link on the page.
    fn breeding_url(&self, code: &str) -> Option<String> {
        match self.breeding_url.render(&self.site, code) {
            Ok(url) => self.site.resolver().resolve(&url),
            Err(err) => {
                let kind: &ErrorKind = &err;
                warn!(code, error = %kind, "could not render breeding calculator URL");
                None
            },
        }
    }
}

/// Top-level entrypoint for a detail page.
///
/// Equivalent to [`Extractor::new`] followed by [`Extractor::detail`]. The
/// same input always produces the same record.
#[instrument(skip(html, site), fields(html_size = html.len()))]
pub fn extract_detail(html: &str, slug: &str, site: &Site) -> Result<PalDetail> {
    Ok(Extractor::new(html, site.clone())?.detail(slug))
}

/// Top-level entrypoint for the pal list page.
#[instrument(skip(html, site), fields(html_size = html.len()))]
pub fn extract_list(html: &str, site: &Site) -> Result<Vec<PalSummary>> {
    Ok(Extractor::new(html, site.clone())?.summaries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   \n\t ")]
    fn test_empty_document(#[case] html: &str) {
        let result = extract_detail(html, "Lamball", &Site::default());
        assert!(matches!(result.map_err(|e| (*e).clone()), Err(ErrorKind::EmptyDocument)));
        let result = extract_list(html, &Site::default());
        assert!(matches!(result.map_err(|e| (*e).clone()), Err(ErrorKind::EmptyDocument)));
    }

    #[test]
    fn test_invalid_template() {
        let site = Site { breeding_url_template: "{{ code ".to_string(), ..Site::default() };
        let result = Extractor::new("<p>x</p>", site);
        assert!(matches!(result.map_err(|e| (*e).clone()), Err(ErrorKind::Template(_))));
    }

    #[test]
    fn test_unrelated_document_has_no_sections() {
        let detail = extract_detail("<html><body><p>Not a pal</p></body></html>", "Lamball", &Site::default()).unwrap();
        assert_eq!(detail.id, "Lamball");
        assert_eq!(detail.name, "Lamball");
        assert_eq!(detail.number, 0);
        assert_eq!(detail.number_raw, None);
        assert_eq!(detail.stats, None);
        assert_eq!(detail.partner_skill, None);
        assert_eq!(detail.breeding_calculator_url, None);
        assert!(!detail.is_alpha());
    }

    #[test]
    fn test_breeding_url_needs_code() {
        let card = |title: &str, body: &str| {
            format!(r#"<div class="card"><div class="card-body"><h5 class="card-title">{title}</h5>{body}</div></div>"#)
        };
        let others = card("Others", r#"<div class="d-flex"><div>Code</div><div>SheepBall</div></div>"#);
        let detail = extract_detail(&others, "Lamball", &Site::default()).unwrap();
        assert_eq!(detail.code.as_deref(), Some("SheepBall"));
        assert_eq!(detail.breeding_calculator_url.as_deref(), Some("https://paldb.cc/en/Breed?child=SheepBall"));

        let others = card("Others", r#"<div class="d-flex"><div>Rarity</div><div>1</div></div>"#);
        let detail = extract_detail(&others, "Lamball", &Site::default()).unwrap();
        assert_eq!(detail.code, None);
        assert_eq!(detail.breeding_calculator_url, None);
        assert_eq!(detail.others.as_ref().map(|o| o.len()), Some(1));
    }

    #[test]
    fn test_render_failure_only_drops_the_url() {
        let site = Site { breeding_url_template: "{{ unknown }}".to_string(), ..Site::default() };
        let html = r#"<div class="card"><h5 class="card-title">Others</h5><div class="d-flex"><div>Code</div><div>X</div></div></div>"#;
        let detail = extract_detail(html, "X", &site).unwrap();
        assert_eq!(detail.code.as_deref(), Some("X"));
        assert_eq!(detail.breeding_calculator_url, None);
    }

    #[test]
    fn test_relative_breeding_template_is_resolved() {
        let site = Site { breeding_url_template: "/{{ locale }}/Breed?child={{ code }}".to_string(), ..Site::default() };
        let html = r#"<div class="card"><h5 class="card-title">Others</h5><div class="d-flex"><div>Code</div><div>Sheep Ball</div></div></div>"#;
        let detail = extract_detail(html, "Lamball", &site).unwrap();
        assert_eq!(detail.breeding_calculator_url.as_deref(), Some("https://paldb.cc/en/Breed?child=Sheep+Ball"));
    }

    const LAMBALL: &str = include_str!("../../fixtures/lamball.html");

    fn lamball() -> PalDetail {
        extract_detail(LAMBALL, "Lamball", &Site::default()).unwrap()
    }

    fn urls(detail: &PalDetail) -> Vec<&str> {
        let mut urls: Vec<Option<&String>> = vec![detail.image_url.as_ref(), detail.breeding_calculator_url.as_ref()];
        for values in [&detail.stats, &detail.movement, &detail.others].into_iter().flatten() {
            urls.extend(values.iter().map(|row| row.icon_url.as_ref()));
        }
        urls.extend(detail.work_suitability.iter().flatten().map(|w| w.icon_url.as_ref()));
        if let Some(skill) = &detail.partner_skill {
            urls.push(skill.icon_url.as_ref());
            urls.extend(skill.ranch_items.iter().map(|d| d.icon_url.as_ref()));
        }
        for skill in detail.active_skills.iter().flatten() {
            urls.extend(skill.unlock_item.iter().map(|i| i.icon_url.as_ref()));
        }
        urls.extend(detail.drops.iter().flatten().map(|d| d.icon_url.as_ref()));
        urls.extend(detail.tribes.iter().flatten().map(|t| t.entity.icon_url.as_ref()));
        urls.extend(detail.spawner.iter().flatten().map(|s| s.entity.icon_url.as_ref()));
        for slot in detail.habitat.iter().flat_map(|h| [&h.day, &h.night]).flatten() {
            urls.push(slot.map_url.as_ref());
        }
        for combo in detail.breeding.iter().flatten() {
            urls.extend(combo.parents.iter().chain([&combo.child]).map(|p| p.icon_url.as_ref()));
        }
        urls.into_iter().flatten().map(String::as_str).collect()
    }

    #[test]
    fn test_page_header() {
        let detail = lamball();
        assert_eq!(detail.id, "Lamball");
        assert_eq!(detail.name, "Lamball");
        assert_eq!(detail.number, 1);
        assert_eq!(detail.number_raw.as_deref(), Some("1"));
        assert!(!detail.is_variant());
        assert_eq!(detail.elements, ["Neutral"]);
        assert_eq!(
            detail.image_url.as_deref(),
            Some("https://cdn.paldb.cc/image/Pal/Texture/PalIcon/Normal/T_SheepBall_icon_normal.webp")
        );
    }

    #[test]
    fn test_page_key_value_sections() {
        let detail = lamball();
        let stats = detail.stats.as_ref().unwrap();
        assert_eq!(stats.keys().collect::<Vec<_>>(), ["HP", "Attack", "Defense"]);
        assert_eq!(stats.get("HP"), Some("70"));
        assert_eq!(stats.row("HP").and_then(|r| r.icon_url.as_deref()), Some("https://cdn.paldb.cc/image/Icon/T_Icon_HP.webp"));
        assert_eq!(detail.movement.as_ref().and_then(|m| m.get("Run Speed")), Some("400"));
        assert_eq!(detail.code.as_deref(), Some("SheepBall"));
        assert_eq!(detail.breeding_calculator_url.as_deref(), Some("https://paldb.cc/en/Breed?child=SheepBall"));
        let work = detail.work_suitability.as_ref().unwrap();
        assert_eq!(work.iter().map(|w| w.name.as_str()).collect::<Vec<_>>(), ["Handiwork", "Transporting", "Farming"]);
        assert!(work.iter().all(|w| w.level == 1));
    }

    #[test]
    fn test_page_partner_skill() {
        let skill = lamball().partner_skill.unwrap();
        assert_eq!(skill.name, "Fluffy Shield");
        assert_eq!(skill.icon_url.as_deref(), Some("https://cdn.paldb.cc/image/Pal/Texture/T_icon_skill_pal_00.webp"));
        assert_eq!(skill.description.as_deref(), Some("When activated, equips to the player and becomes a shield."));
        assert_eq!(skill.passive.len(), 2);
        assert_eq!(skill.passive[1].values.get("Effect"), Some("Shield 360"));
        // Level 5 is listed twice; the later row wins.
        assert_eq!(skill.active.iter().map(|r| r.level).collect::<Vec<_>>(), [1, 5]);
        let level5 = skill.active_at(5).unwrap();
        assert_eq!(level5.values.get("Shield HP"), Some("650"));
        assert_eq!(level5.values.get("CT"), Some("25"));
        assert_eq!(skill.ranch_items.len(), 1);
        assert_eq!(skill.ranch_items[0].item_name, "Wool");
        assert_eq!(skill.ranch_items[0].quantity.as_deref(), Some("1"));
    }

    #[test]
    fn test_page_active_skills() {
        let skills = lamball().active_skills.unwrap();
        assert_eq!(skills.iter().map(|s| (s.level, s.name.as_str())).collect::<Vec<_>>(), [
            (1, "Roly Poly"),
            (7, "Air Cannon"),
            (15, "Power Shot")
        ]);
        assert_eq!(skills[0].cooldown, Some(1));
        assert_eq!(skills[0].power, Some(35));
        assert_eq!(skills[1].unlock_item.as_ref().map(|i| i.slug.as_str()), Some("Skill_Fruit_Air_Cannon"));
        assert_eq!(skills[2].power, Some(35));
        assert_eq!(skills[2].status.as_deref(), Some("Stun 10"));
    }

    #[test]
    fn test_page_drops() {
        let drops = lamball().drops.unwrap();
        assert_eq!(drops.len(), 2);
        assert_eq!(drops[0].item_slug, "Wool");
        assert_eq!(drops[0].quantity.as_deref(), Some("1–3"));
        assert_eq!(drops[0].probability.as_deref(), Some("100%"));
        // No image source at all: the icon is absent, the entry is not.
        assert_eq!(drops[1].item_name, "Lamball Mutton");
        assert_eq!(drops[1].item_slug, "Lamball_Mutton");
        assert_eq!(drops[1].icon_url, None);
    }

    #[test]
    fn test_page_relations() {
        let detail = lamball();
        let tribes = detail.tribes.as_ref().unwrap();
        assert_eq!(tribes.len(), 2);
        assert_eq!(tribes[0].role, "Tribe Boss");
        assert!(detail.is_alpha());

        let spawner = detail.spawner.as_ref().unwrap();
        assert_eq!(spawner.len(), 2);
        assert_eq!(spawner[1].role, "Alpha");
        assert_eq!(spawner[1].level_range, "Lv. 10 – 13");
        assert_eq!(spawner[1].locations[0].slug, "Small_Settlement");

        let habitat = detail.habitat.as_ref().unwrap();
        assert_eq!(habitat.day.as_ref().and_then(|d| d.count), Some(128));
        assert_eq!(habitat.night.as_ref().and_then(|n| n.count), Some(0));

        let breeding = detail.breeding.as_ref().unwrap();
        assert_eq!(breeding.len(), 2);
        assert_eq!(breeding[1].parents[1].slug, "Cattiva");
        assert_eq!(breeding[1].parents[1].icon_url.as_deref(), Some("https://cdn.paldb.cc/image/Pal/T_PinkCat_icon.webp"));
    }

    #[test]
    fn test_page_is_deterministic() {
        assert_eq!(lamball(), lamball());
    }

    #[test]
    fn test_page_urls_are_absolute() {
        let detail = lamball();
        let urls = urls(&detail);
        assert!(urls.len() > 10);
        for url in urls {
            assert!(url.starts_with("https://"), "{url}");
        }
    }

    #[test]
    fn test_closing_row_tags_do_not_matter() {
        let closed = LAMBALL.replace("</td>\n      <tr>", "</td></tr>\n      <tr>");
        assert_ne!(closed, LAMBALL);
        let detail = extract_detail(&closed, "Lamball", &Site::default()).unwrap();
        assert_eq!(detail.drops, lamball().drops);
    }

    #[test]
    fn test_list_page() {
        let html = r#"<div class="row">
            <div class="col"><a href="/en/Lamball"><img src="/image/Pal/T_SheepBall_icon.webp"></a> <a href="/en/Lamball">Lamball</a> #1</div>
            <div class="col"><a href="/en/Cattiva">Cattiva</a> #2</div>
        </div>"#;
        let entries = extract_list(html, &Site::default()).unwrap();
        assert_eq!(entries.iter().map(|e| e.slug.as_str()).collect::<Vec<_>>(), ["Lamball", "Cattiva"]);
        assert_eq!(entries[1].number, 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(lamball()).unwrap();
        assert_eq!(json["numberRaw"], "1");
        assert_eq!(json["stats"][0]["key"], "HP");
        assert_eq!(json["partnerSkill"]["ranchItems"][0]["itemSlug"], "Wool");
        assert_eq!(json["breedingCalculatorUrl"], "https://paldb.cc/en/Breed?child=SheepBall");
        assert!(json.get("isAlpha").is_none());
    }
}
