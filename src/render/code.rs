use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::escape::escape_html;

/// A fenced region: three backticks, an optional language tag, a newline,
/// then a non-greedy body ending at the first closing fence.
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\n([\s\S]*?)```").expect("fence pattern"));

fn placeholder(index: usize) -> String {
    format!("@@CODEBLOCK_{index}@@")
}

/// Pull fenced code blocks out of the working text, left to right.
///
/// Each match is rendered to its final `<pre><code>` HTML immediately (body
/// escaped verbatim, language tag escaped into a `language-<tag>` class) and
/// replaced in the text by a placeholder token carrying its extraction
/// index. The token literal is chosen to be unlikely in user text; a
/// colliding input garbles its own output but never produces unescaped HTML.
///
/// An opening fence with no closing fence does not match and falls through
/// to the later passes as literal text.
pub(super) fn extract(text: &str) -> (String, Vec<String>) {
    let mut rendered: Vec<String> = Vec::new();
    let replaced = FENCE.replace_all(text, |caps: &Captures| {
        let body = escape_html(&caps[2]);
        let class = match caps.get(1) {
            Some(lang) => format!(" class=\"language-{}\"", escape_html(lang.as_str())),
            None => String::new(),
        };
        let token = placeholder(rendered.len());
        rendered.push(format!("<pre><code{class}>{body}</code></pre>"));
        token
    });
    (replaced.into_owned(), rendered)
}

/// Splice each pre-rendered block back over its placeholder, in index order.
///
/// Exact literal substitution of the first occurrence only, never a
/// pattern-based replace: the rendered HTML must land in the text
/// byte-for-byte.
pub(super) fn restore(mut text: String, rendered: &[String]) -> String {
    for (index, html) in rendered.iter().enumerate() {
        let token = placeholder(index);
        if let Some(pos) = text.find(&token) {
            text.replace_range(pos..pos + token.len(), html);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_tagged_fence() {
        let (text, blocks) = extract("```js\nconsole.log(1)\n```");
        assert_eq!(text, "@@CODEBLOCK_0@@");
        assert_eq!(
            blocks,
            vec!["<pre><code class=\"language-js\">console.log(1)\n</code></pre>"]
        );
    }

    #[test]
    fn untagged_fence_has_no_class_attribute() {
        let (_, blocks) = extract("```\nplain\n```");
        assert_eq!(blocks, vec!["<pre><code>plain\n</code></pre>"]);
    }

    #[test]
    fn body_is_escaped_and_whitespace_preserved() {
        let (_, blocks) = extract("```\n  a < b && c\n\n\ttabbed\n```");
        assert_eq!(
            blocks,
            vec!["<pre><code>  a &lt; b &amp;&amp; c\n\n\ttabbed\n</code></pre>"]
        );
    }

    #[test]
    fn blocks_are_indexed_in_order_of_appearance() {
        let (text, blocks) = extract("```\nfirst\n```mid```\nsecond\n```");
        assert!(text.starts_with("@@CODEBLOCK_0@@"));
        assert!(text.contains("@@CODEBLOCK_1@@"));
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn unterminated_fence_is_left_alone() {
        let input = "```js\nno closing fence";
        let (text, blocks) = extract(input);
        assert_eq!(text, input);
        assert!(blocks.is_empty());
    }

    #[test]
    fn restore_replaces_first_occurrence_literally() {
        let rendered = vec!["<pre><code>$1 &amp; $2</code></pre>".to_string()];
        let out = restore("@@CODEBLOCK_0@@".to_string(), &rendered);
        assert_eq!(out, "<pre><code>$1 &amp; $2</code></pre>");
    }

    #[test]
    fn language_tag_is_escaped_into_the_class() {
        let (_, blocks) = extract("```rust\nfn main() {}\n```");
        assert!(blocks[0].contains("class=\"language-rust\""));
    }
}
