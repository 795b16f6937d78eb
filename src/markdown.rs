use regex::Regex;
use std::sync::LazyLock;

// Substitution order matters: fenced blocks before inline code, images before
// links (image syntax is a superset), bold before italic.
static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]+\)").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").expect("valid regex"));
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*+]\s+").expect("valid regex"));
static NUMBERED_LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").expect("valid regex"));
static QUOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*>\s+").expect("valid regex"));
static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[-_*]{3,}$").expect("valid regex"));

/// Reduces Markdown to plain text by stripping syntax in a fixed order.
/// Pure and idempotent; the result is trimmed.
pub fn strip(text: &str) -> String {
    let text = CODE_BLOCK.replace_all(text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = IMAGE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = NUMBERED_LIST_MARKER.replace_all(&text, "");
    let text = QUOTE_MARKER.replace_all(&text, "");
    let text = HORIZONTAL_RULE.replace_all(&text, "");
    text.trim().to_owned()
}

/// True iff stripping would change the text, i.e. it carries Markdown syntax
/// (or surrounding whitespace).
pub fn has_formatting(text: &str) -> bool {
    strip(text) != text
}
