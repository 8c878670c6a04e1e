mod blocks;
mod code;
mod escape;
mod inline;

pub use escape::escape_html;

/// Convert model output (plain prose or a small markdown subset) into HTML
/// that is safe to embed directly in a page.
///
/// The transform is a fixed pipeline of stateless passes over one working
/// buffer: normalize line endings, pull fenced code blocks out behind
/// placeholder tokens, escape everything that remains, splice the
/// pre-rendered code HTML back in, apply inline markup (inline code,
/// headings, bold, italic), then wrap blank-line separated blocks in
/// paragraphs. Stage order is a compatibility contract — later passes rely
/// on earlier ones having already run.
///
/// Total over all inputs: `None` and the empty string render as the empty
/// string, and no input panics or fails. Safe for concurrent use — all
/// intermediate state is local to the call.
pub fn render(input: Option<&str>) -> String {
    let Some(raw) = input else {
        return String::new();
    };
    if raw.is_empty() {
        return String::new();
    }

    // Normalize CRLF
    let text = raw.replace("\r\n", "\n");

    // Pull fenced code blocks out before escaping can corrupt them
    let (text, code_blocks) = code::extract(&text);

    // Escape remaining HTML (placeholders contain no escapable characters)
    let text = escape::escape_html(&text);

    // Splice the already-escaped code HTML back over its placeholders
    let text = code::restore(text, &code_blocks);

    // Inline code, headings, bold, italic — in that order
    let text = inline::transform(&text);

    // Blank-line boundaries become paragraphs
    blocks::assemble(&text)
}

/// Render any displayable value by way of its string form.
///
/// Covers callers holding non-string payloads (numbers, JSON scalars)
/// without a separate error path.
pub fn render_display<T: std::fmt::Display>(value: T) -> String {
    render(Some(&value.to_string()))
}
