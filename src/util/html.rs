//! Minimal HTML tag scanning used by feed autodiscovery and image extraction.
//!
//! Uses simple string scanning (no HTML parser dependency). Handles attribute
//! ordering variations, quote styles, and mixed-case markup. This is not a
//! general HTML parser: it only needs to locate specific tags and read
//! their attributes.

/// Returns every occurrence of `<{tag} ...>` in document order, as slices of
/// the original (case-preserved) markup including the closing `>`.
///
/// Matching is case-insensitive on the tag name. Tags whose closing `>` is
/// missing are skipped.
pub fn find_tags<'a>(html: &'a str, tag: &str) -> Vec<&'a str> {
    // ASCII-only lowering keeps byte offsets aligned with the original
    // markup; Unicode case folding can change string length.
    let html_lower = html.to_ascii_lowercase();
    let needle = format!("<{}", tag.to_ascii_lowercase());
    let mut tags = Vec::new();
    let mut search_from = 0;

    while let Some(pos) = html_lower[search_from..].find(&needle) {
        let abs_start = search_from + pos;
        let after = abs_start + needle.len();

        // Require a boundary so "<link" does not match "<linkage".
        let boundary = html_lower[after..]
            .chars()
            .next()
            .map_or(true, |c| c.is_whitespace() || c == '>' || c == '/');
        if !boundary {
            search_from = after;
            continue;
        }

        match html_lower[abs_start..].find('>') {
            Some(rel_end) => {
                let abs_end = abs_start + rel_end;
                tags.push(&html[abs_start..=abs_end]);
                search_from = abs_end + 1;
            }
            None => break,
        }
    }

    tags
}

/// Extracts the value of an attribute from a tag string, preserving the
/// value's original case. Attribute names match case-insensitively and only
/// at word boundaries, so `href` does not match `data-href`.
pub fn attr_value<'a>(tag: &'a str, attr_name: &str) -> Option<&'a str> {
    let tag_lower = tag.to_ascii_lowercase();
    let attr_prefix = format!("{}=", attr_name.to_ascii_lowercase());

    let mut search_from = 0;
    while let Some(pos) = tag_lower[search_from..].find(&attr_prefix) {
        let abs_start = search_from + pos;

        // Word boundary check: preceding char must be whitespace or a quote
        // boundary, otherwise this is a longer attribute's suffix.
        let bounded = tag_lower[..abs_start]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace());
        if !bounded {
            search_from = abs_start + attr_prefix.len();
            continue;
        }

        let value_start = abs_start + attr_prefix.len();
        if value_start >= tag.len() {
            return None;
        }

        let rest = &tag[value_start..];
        let quote = *rest.as_bytes().first()?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }

        let inner = &rest[1..];
        let end = inner.find(quote as char)?;
        return Some(&inner[..end]);
    }

    None
}

/// Returns the `src` of the first `<img>` tag in the markup, if the tag
/// carries one. A first `<img>` without a `src` attribute yields `None`;
/// callers fall back to regex extraction in that case.
pub fn first_img_src(html: &str) -> Option<&str> {
    let tag = find_tags(html, "img").into_iter().next()?;
    attr_value(tag, "src").filter(|src| !src.is_empty())
}
