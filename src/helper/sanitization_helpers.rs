use std::collections::HashSet;

/// Strips every HTML tag from a single-line field (titles, author names) and
/// decodes entities back, so "Tom &amp; Jerry" is stored as "Tom & Jerry".
/// Work text is never passed through here; it is stored verbatim and escaped
/// at render time.
pub fn strip_all_html(input: &str) -> String {
    let cleaned = ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string();
    html_escape::decode_html_entities(&cleaned).trim().to_string()
}
