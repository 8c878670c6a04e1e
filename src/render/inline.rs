use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::escape::escape_html;

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("inline code pattern"));

/// Heading patterns, longest prefix first: a `######` line must become an
/// `<h6>`, not an `<h1>` wrapping literal hashes.
static HEADINGS: LazyLock<[(Regex, &'static str); 6]> = LazyLock::new(|| {
    [
        (Regex::new(r"(?m)^######\s*(.+)$").expect("h6"), "h6"),
        (Regex::new(r"(?m)^#####\s*(.+)$").expect("h5"), "h5"),
        (Regex::new(r"(?m)^####\s*(.+)$").expect("h4"), "h4"),
        (Regex::new(r"(?m)^###\s*(.+)$").expect("h3"), "h3"),
        (Regex::new(r"(?m)^##\s*(.+)$").expect("h2"), "h2"),
        (Regex::new(r"(?m)^#\s*(.+)$").expect("h1"), "h1"),
    ]
});

static BOLD_ASTERISK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold asterisk pattern"));
static BOLD_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").expect("bold underscore pattern"));
static ITALIC_ASTERISK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("italic asterisk pattern"));
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(.+?)_").expect("italic underscore pattern"));

/// Apply the inline substitutions over already-escaped text.
///
/// Fixed order: inline code, headings (h6 down to h1), bold, italic. Bold
/// runs before italic so `**text**` is not consumed as two italic markers.
/// All patterns are non-greedy and none of them matches across a newline,
/// which keeps spans from bleeding into restored `<pre>` blocks.
///
/// Inline-code content is escaped a second time here even though the whole
/// text was already escaped — entity sequences inside backticks come out
/// double-escaped. That matches the single-pass escape-then-markup design
/// and is deliberately not "fixed".
pub(super) fn transform(text: &str) -> String {
    let mut text = INLINE_CODE
        .replace_all(text, |caps: &Captures| {
            format!("<code>{}</code>", escape_html(&caps[1]))
        })
        .into_owned();

    for (pattern, tag) in HEADINGS.iter() {
        text = pattern
            .replace_all(&text, format!("<{tag}>${{1}}</{tag}>"))
            .into_owned();
    }

    text = BOLD_ASTERISK
        .replace_all(&text, "<strong>${1}</strong>")
        .into_owned();
    text = BOLD_UNDERSCORE
        .replace_all(&text, "<strong>${1}</strong>")
        .into_owned();
    text = ITALIC_ASTERISK.replace_all(&text, "<em>${1}</em>").into_owned();
    text = ITALIC_UNDERSCORE.replace_all(&text, "<em>${1}</em>").into_owned();

    text
}
