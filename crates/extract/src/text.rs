//! Plain-text normalisation of HTML fragments.
//!
//! Both functions are total: any input, including the empty string and
//! garbage markup, produces a (possibly empty) string.

use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

static SCRIPT_STYLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap());
static BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static BLOCK_CLOSE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(?:p|div|li|ul|ol|tr|table|thead|tbody|section|article|header|footer|h[1-6]|dt|dd|blockquote)\s*>")
        .unwrap()
});
static CELL_CLOSE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</t[dh]\s*>").unwrap());
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Entities decoded by [`to_plain_text`]. `&amp;` must stay last, otherwise
/// `&amp;lt;` would decode twice.
const ENTITIES: [(&str, &str); 8] = [
    ("&nbsp;", "\u{a0}"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&amp;", "&"),
];

/// Converts an HTML fragment into readable plain text.
///
/// Script and style blocks are removed, line breaks and block-level closing
/// tags become newlines, every other tag is dropped, a fixed set of entities
/// is decoded, and whitespace is collapsed line by line. Blank lines are
/// removed entirely.
///
/// ```rust
/// use paldeck_extract::to_plain_text;
/// let html = "<div><p>Fluffy&nbsp;&amp; soft</p><br><script>x()</script>Lv.&nbsp;5</div>";
/// assert_eq!(to_plain_text(html), "Fluffy & soft\nLv. 5");
/// ```
pub fn to_plain_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let text = SCRIPT_STYLE_REGEX.replace_all(html, "");
    let text = BREAK_REGEX.replace_all(&text, "\n");
    let text = BLOCK_CLOSE_REGEX.replace_all(&text, "\n");
    let text = CELL_CLOSE_REGEX.replace_all(&text, " ");
    let mut text = TAG_REGEX.replace_all(&text, "").into_owned();
    for (entity, decoded) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, decoded);
        }
    }
    text.lines().map(clean_key).filter(|line| !line.is_empty()).collect::<Vec<_>>().join("\n")
}

/// Collapses every whitespace run (non-breaking spaces included) into a
/// single space and trims both ends.
///
/// ```rust
/// use paldeck_extract::clean_key;
/// assert_eq!(clean_key("  Max\u{a0} HP \n"), "Max HP");
/// ```
pub fn clean_key(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapsed text content of a DOM element.
///
/// Text nodes are joined with a space so that adjacent cells and blocks do
/// not run into each other.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    clean_key(&element.text().collect::<Vec<_>>().join(" "))
}
