use std::sync::LazyLock;

use regex::Regex;

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank line pattern"));

/// Opening tags that mark a block as already block-level HTML.
const BLOCK_TAGS: [&str; 11] = [
    "<h1>", "<h2>", "<h3>", "<h4>", "<h5>", "<h6>", "<pre>", "<ul>", "<ol>", "<blockquote>",
    "<table>",
];

fn is_block_level(block: &str) -> bool {
    let trimmed = block.trim();
    BLOCK_TAGS.iter().any(|tag| {
        trimmed
            .get(..tag.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(tag))
    })
}

/// Split the fully transformed text on runs of blank lines and wrap each
/// plain block in a paragraph.
///
/// A block whose trimmed form opens with a recognized block-level tag is
/// passed through untouched — in particular a `<pre>` block keeps its
/// literal newlines. Everything else gets single newlines turned into
/// `<br>` and a `<p>` wrapper. The trim is for classification only; the
/// block's own content is emitted as-is. Blocks are re-joined with a single
/// newline.
pub(super) fn assemble(text: &str) -> String {
    BLANK_LINES
        .split(text)
        .map(|block| {
            if is_block_level(block) {
                block.to_string()
            } else {
                format!("<p>{}</p>", block.replace('\n', "<br>"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
