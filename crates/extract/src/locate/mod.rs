//! Finding the card that holds a named section of a detail page.
//!
//! Two structural tiers are tried, and the first that yields anything is used
//! for the whole document:
//!
//! 1. innermost `div.card` containers, titled by their `.card-title` (or
//!    first heading),
//! 2. a slice per card-ish heading, running to the next heading of the same
//!    rank, for pages (or page drift) where sections are not wrapped in a
//!    `.card`.
//!
//! Sections are then looked up by title, or by content with a weighted
//! [`score`] when a title alone is ambiguous or untrustworthy.

mod score;

pub use self::score::{ContentQuery, PARTNER_SKILL_QUERY, ScoreWeights, Signals};
use crate::consts;
use crate::rows::has_nested;
use crate::text::{clean_key, text_of};
use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

/// Which structural tier produced the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Innermost `div.card` containers
    Card,
    /// Heading-to-next-heading slices
    Heading,
}

#[derive(Debug, Clone)]
enum Scope<'a> {
    /// A container in the document
    Element(ElementRef<'a>),
    /// A run of siblings re-parsed on its own
    Fragment(Html),
}

/// A titled region of the page.
#[derive(Debug, Clone)]
pub struct Card<'a> {
    /// Title as displayed, whitespace collapsed
    pub title: String,
    scope: Scope<'a>,
}
impl<'a> Card<'a> {
    /// The region's root element.
    pub fn element(&self) -> ElementRef<'_> {
        match &self.scope {
            Scope::Element(element) => *element,
            Scope::Fragment(html) => html.root_element(),
        }
    }

    /// Serialised HTML of the region.
    pub fn html(&self) -> String {
        self.element().html()
    }

    fn title_matches(&self, title: &str) -> bool {
        !title.is_empty() && self.title.to_lowercase().contains(&title.to_lowercase())
    }

    fn has_table(&self) -> bool {
        self.element().select(&consts::TABLE_SELECTOR).next().is_some()
    }
}

/// All candidate cards of one document, in document order.
#[derive(Debug)]
pub struct Locator<'a> {
    cards: Vec<Card<'a>>,
    tier: Tier,
    weights: ScoreWeights,
}
impl<'a> Locator<'a> {
    /// Builds the candidate list in a single pass over the document.
    #[instrument(level = "trace", skip_all)]
    pub fn new(document: &'a Html) -> Self {
        let cards = Self::card_tier(document);
        if !cards.is_empty() {
            return Self { cards, tier: Tier::Card, weights: ScoreWeights::default() };
        }
        let cards = Self::heading_tier(document);
        debug!(candidates = cards.len(), "no card containers found, using heading blocks");
        Self { cards, tier: Tier::Heading, weights: ScoreWeights::default() }
    }

    /// Replaces the weights used by [`best_by_content`](Self::best_by_content).
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Innermost cards only: a wrapper card would otherwise borrow the title
    /// of its first child and swallow every sibling section.
    fn card_tier(document: &'a Html) -> Vec<Card<'a>> {
        document
            .select(&consts::CARD_SELECTOR)
            .filter(|element| !has_nested(*element, &consts::CARD_SELECTOR))
            .map(|element| {
                let heading = element
                    .select(&consts::CARD_TITLE_SELECTOR)
                    .next()
                    .or_else(|| element.select(&consts::HEADING_SELECTOR).next());
                Card { title: heading.map(text_of).unwrap_or_default(), scope: Scope::Element(element) }
            })
            .collect()
    }

    /// One slice per heading: the heading and the siblings after it, up to
    /// the next heading of the same or a higher rank. A heading with nothing
    /// after it stands for its parent block.
    fn heading_tier(document: &'a Html) -> Vec<Card<'a>> {
        document
            .select(&consts::FALLBACK_HEADING_SELECTOR)
            .filter_map(|heading| {
                let title = clean_key(&text_of(heading));
                let scope = match heading_slice(heading) {
                    Some(html) => Scope::Fragment(Html::parse_fragment(&html)),
                    None => {
                        let parent = heading.parent().and_then(ElementRef::wrap)?;
                        if matches!(parent.value().name(), "html" | "body") {
                            return None;
                        }
                        Scope::Element(parent)
                    },
                };
                Some(Card { title, scope })
            })
            .collect()
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn cards(&self) -> &[Card<'a>] {
        &self.cards
    }

    /// First card whose title contains `title`, case-insensitively.
    pub fn find(&self, title: &str) -> Option<&Card<'a>> {
        let card = self.cards.iter().find(|card| card.title_matches(title));
        if card.is_none() {
            debug!(title, "section not found");
        }
        card
    }

    /// Highest-scoring card whose text contains the query's needle.
    ///
    /// Ties are broken by document order (the first candidate wins).
    pub fn best_by_content(&self, query: &ContentQuery) -> Option<&Card<'a>> {
        let needle = query.needle.to_lowercase();
        let mut best: Option<(i64, &Card<'a>)> = None;
        for card in &self.cards {
            if !card.element().text().collect::<String>().to_lowercase().contains(&needle) {
                continue;
            }
            let score = self.weights.score(&Signals::collect(card.element(), query));
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, card));
            }
        }
        best.map(|(_, card)| card)
    }

    /// The partner skill card.
    ///
    /// Tries the cheap path first (a card titled "Partner Skill" that holds a
    /// table), then falls back to the content scorer.
    pub fn partner_skill(&self) -> Option<&Card<'a>> {
        self.cards
            .iter()
            .find(|card| card.title_matches(PARTNER_SKILL_QUERY.needle) && card.has_table())
            .or_else(|| self.best_by_content(&PARTNER_SKILL_QUERY))
    }
}

/// Rank of a heading: `h2` is 2, a non-`h` `.card-title` ranks lowest.
fn heading_rank(element: ElementRef<'_>) -> u8 {
    match element.value().name().as_bytes() {
        [b'h', digit @ b'1'..=b'6'] => digit - b'0',
        _ => 7,
    }
}

/// Serialised heading plus following siblings, or `None` when no element
/// follows it before the next heading of the same or a higher rank.
fn heading_slice(heading: ElementRef<'_>) -> Option<String> {
    let rank = heading_rank(heading);
    let mut html = heading.html();
    let mut has_content = false;
    for sibling in heading.next_siblings() {
        if let Some(element) = ElementRef::wrap(sibling) {
            let stops = (consts::FALLBACK_HEADING_SELECTOR.matches(&element) && heading_rank(element) <= rank)
                || has_nested(element, &consts::FALLBACK_HEADING_SELECTOR);
            if stops {
                break;
            }
            html.push_str(&element.html());
            has_content = true;
        } else if let Some(text) = sibling.value().as_text() {
            html.push_str(&escape_text(text));
        }
    }
    has_content.then_some(format!("<div>{html}</div>"))
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
