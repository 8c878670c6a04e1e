/// Replace the HTML-significant characters with character references.
///
/// Ampersand goes first so entities introduced by the later substitutions
/// are not themselves re-escaped. The forward-slash escape is part of the
/// output safety contract, not something the HTML spec demands.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('/', "&#x2F;")
}
