//! Text cleaning pipeline.
//!
//! Turns raw document text into analysis-ready prose by running five
//! stages in a fixed order: markup, code blocks, URLs, boilerplate
//! phrases, whitespace. Every stage is total; malformed markup is
//! tolerated rather than reported.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::borrow::Cow;
use tracing::debug;

/// Elements dropped together with everything inside them.
const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "button", "aside",
];

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`.*?`").unwrap());
static CODE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<code>.*?</code>").unwrap());
static PRE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<pre>.*?</pre>").unwrap());

// `[$-_@.&+]` is a range from `$` to `_`, which covers `/?=:#` and friends.
static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z0-9]|[$-_@.&+]|[!*(),]|%[0-9a-fA-F]{2})+").unwrap()
});

/// Page furniture removed wherever it appears, case-insensitively.
///
/// The bare navigation words ("Menu", "Search", "Close") also hit ordinary
/// prose that uses them as standalone words.
const BOILERPLATE_PATTERNS: &[&str] = &[
    r"\baccept (?:all )?cookies?\b",
    r"\bcookie policy\b",
    r"\bprivacy policy\b",
    r"\bterms (?:of|and) (?:use|service)\b",
    r"\bsubscribe to our newsletter\b",
    r"\bsign up\b",
    r"\blog in\b",
    r"\bmenu\b",
    r"\bsearch\b",
    r"\bclose\b",
    r"\[advertisement\]",
    r"\bshare this\b",
    r"\bfollow us\b",
    r"©[^\r\n]*",
    r"\[read more\]",
    r"\[click here\]",
    r"\[\.\.\.\]",
];

static BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    BOILERPLATE_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
        .collect()
});

static LINE_ENDINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

/// Run the full cleaning pipeline.
pub fn clean(text: &str) -> String {
    let stripped = strip_markup(text);
    let stripped = strip_code_blocks(&stripped);
    let stripped = strip_urls(&stripped);
    let stripped = strip_boilerplate(&stripped);
    let cleaned = normalize_whitespace(&stripped);

    debug!(
        "Cleaned text: {} -> {} chars",
        text.chars().count(),
        cleaned.chars().count()
    );

    cleaned
}

/// Parse as HTML and keep only the visible text.
///
/// Plain text without markup passes through unchanged apart from entity
/// decoding. A `<` with no `>` after it is kept as literal text.
pub fn strip_markup(text: &str) -> String {
    let document = Html::parse_document(&escape_unterminated_tags(text));
    let mut visible = String::with_capacity(text.len());
    collect_visible_text(document.root_element(), &mut visible);
    visible
}

/// Escape every `<` that follows the last `>`.
///
/// html5ever reads `a<b` as an open tag and swallows the rest of the input
/// when no `>` ever closes it.
fn escape_unterminated_tags(text: &str) -> Cow<'_, str> {
    let tail_start = text.rfind('>').map(|idx| idx + 1).unwrap_or(0);
    let tail = &text[tail_start..];
    if !tail.contains('<') {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    escaped.push_str(&text[..tail_start]);
    escaped.push_str(&tail.replace('<', "&lt;"));
    Cow::Owned(escaped)
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if DROPPED_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_visible_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

/// Remove fenced blocks, inline code spans and `<code>`/`<pre>` regions.
///
/// In `clean` this runs after `strip_markup`, so real `<code>` and `<pre>`
/// elements are already reduced to their text and their content stays.
/// Only tags that survive markup stripping, such as entity-escaped ones,
/// are matched here.
pub fn strip_code_blocks(text: &str) -> String {
    let text = FENCED_BLOCK.replace_all(text, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = CODE_TAG.replace_all(&text, "");
    PRE_TAG.replace_all(&text, "").into_owned()
}

/// Remove `http://` and `https://` URLs.
pub fn strip_urls(text: &str) -> String {
    URL.replace_all(text, "").into_owned()
}

/// Remove known boilerplate phrases.
pub fn strip_boilerplate(text: &str) -> String {
    BOILERPLATE
        .iter()
        .fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, "").into_owned()
        })
}

/// Collapse blank-line runs to one blank line and space runs to one space,
/// then trim. Applying it twice gives the same result as applying it once.
pub fn normalize_whitespace(text: &str) -> String {
    let text = LINE_ENDINGS.replace_all(text, "\n");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    text.trim().to_string()
}
