// src/core/html.rs
// Low-level HTML string scanning.
// Case-insensitive on ASCII tag and attribute names. Matching compares bytes
// with `eq_ignore_ascii_case` in place, so offsets index the input and no
// lowered copy of the page is ever built.

use super::sanitize::{decode_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Byte offset of the first ASCII-case-insensitive match of `needle` in
/// `hay`, starting at `from`.
pub fn find_ci(hay: &str, needle: &str, from: usize) -> Option<usize> {
    let h = hay.as_bytes();
    let n = needle.as_bytes();
    let Some(&first) = n.first() else {
        return (from <= h.len()).then_some(from);
    };
    let first = first.to_ascii_lowercase();
    let last_start = h.len().checked_sub(n.len())?;
    (from..=last_start).find(|&i| {
        h[i].to_ascii_lowercase() == first && h[i..i + n.len()].eq_ignore_ascii_case(n)
    })
}

/// Inner HTML between an opening tag (prefix match, attributes allowed) and the
/// next closing tag.
///
/// ```
/// use chart_scrape::core::html::slice_between_ci;
/// let doc = "<HEAD><Title>Hot 100</title></head>";
/// assert_eq!(slice_between_ci(doc, "<title", "</title>"), Some("Hot 100"));
/// ```
pub fn slice_between_ci<'a>(s: &'a str, open_pat: &str, close_pat: &str) -> Option<&'a str> {
    let o = find_ci(s, open_pat, 0)?;
    let after = tag_end(s, o)?;
    let close = find_ci(s, close_pat, after)?;
    Some(&s[after..close])
}

/// Byte index just past the `>` that closes the tag starting at `lt`.
/// Quoted attribute values may contain `>`.
pub fn tag_end(s: &str, lt: usize) -> Option<usize> {
    let b = s.as_bytes();
    let mut i = lt + 1;
    let mut in_s = false;
    let mut in_d = false;
    while i < b.len() {
        match b[i] {
            b'\'' if !in_d => in_s = !in_s,
            b'"' if !in_s => in_d = !in_d,
            b'>' if !in_s && !in_d => return Some(i + 1),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Tag name of the opening tag at `lt`, e.g. `article` for `<article class=..>`.
fn tag_name_at(s: &str, lt: usize) -> &str {
    let rest = &s[lt + 1..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(rest.len());
    &rest[..end]
}

/// `true` when `s[at..]` opens (or closes, with `closing`) a tag named `name`.
fn is_tag_at(s: &str, at: usize, name: &str, closing: bool) -> bool {
    let prefix_len = if closing { 2 } else { 1 };
    let Some(rest) = s.as_bytes().get(at..) else { return false };
    let head_ok = if closing { rest.starts_with(b"</") } else { rest.starts_with(b"<") };
    if !head_ok {
        return false;
    }
    let name_ok = rest
        .get(prefix_len..prefix_len + name.len())
        .is_some_and(|n| n.eq_ignore_ascii_case(name.as_bytes()));
    if !name_ok {
        return false;
    }
    match rest.get(prefix_len + name.len()) {
        Some(c) => !(c.is_ascii_alphanumeric() || *c == b'-'),
        None => false,
    }
}

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta", "source"];

/// Span of the whole element whose opening tag starts at `lt`, matching nested
/// elements of the same name. Returns `(start, end)` with `end` past the close tag.
pub fn element_at(s: &str, lt: usize) -> Option<(usize, usize)> {
    let open_end = tag_end(s, lt)?;
    let name = to_lower(tag_name_at(s, lt));
    if name.is_empty() {
        return None;
    }
    if s[..open_end].ends_with("/>") || VOID_TAGS.contains(&name.as_str()) {
        return Some((lt, open_end));
    }

    let mut depth = 1usize;
    let mut pos = open_end;
    while let Some(rel) = s[pos..].find('<') {
        let at = pos + rel;
        if is_tag_at(s, at, &name, true) {
            let end = tag_end(s, at)?;
            depth -= 1;
            if depth == 0 {
                return Some((lt, end));
            }
            pos = end;
        } else if is_tag_at(s, at, &name, false) {
            let end = tag_end(s, at)?;
            if !s[..end].ends_with("/>") {
                depth += 1;
            }
            pos = end;
        } else {
            pos = at + 1;
        }
    }
    None
}

/// Next opening tag named `name` at or after `from`.
pub fn find_tag_ci(s: &str, name: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(rel) = s.get(pos..)?.find('<') {
        let at = pos + rel;
        if is_tag_at(s, at, name, false) {
            return Some(at);
        }
        pos = at + 1;
    }
    None
}

/// Value of attribute `name` inside an opening tag. Handles double, single
/// and unquoted values.
pub fn attr_ci<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let lc = to_lower(tag);
    let needle = format!("{}=", to_lower(name));
    let mut from = 0usize;
    while let Some(rel) = lc[from..].find(&needle) {
        let at = from + rel;
        from = at + needle.len();
        // must be a whole attribute name, not the tail of `data-class=`
        let boundary = lc[..at].chars().last().is_some_and(|c| c.is_ascii_whitespace());
        if !boundary {
            continue;
        }
        let val = &tag[at + needle.len()..];
        let (quote, start_off) = match val.as_bytes().first() {
            Some(b'"') => (Some('"'), 1),
            Some(b'\'') => (Some('\''), 1),
            _ => (None, 0),
        };
        let end = match quote {
            Some(q) => val[start_off..].find(q).map(|e| start_off + e),
            None => val.find(|c: char| c.is_ascii_whitespace() || c == '>'),
        }
        .unwrap_or(val.len());
        return Some(&val[start_off..end]);
    }
    None
}

/// `true` if the opening tag's `class` list contains `class` as a whole token.
pub fn has_class(tag: &str, class: &str) -> bool {
    attr_ci(tag, "class")
        .is_some_and(|v| v.split_ascii_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
}

/// Start of the next opening tag (any name) carrying class token `class`.
pub fn find_class_ci(s: &str, class: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(hit) = find_ci(s, class, pos) {
        pos = hit + class.len();
        let Some(lt) = s[..hit].rfind('<') else { continue };
        // the hit must sit inside an opening tag, not in text or a closed tag
        if s[lt..hit].contains('>') || s[lt + 1..].starts_with('/') {
            continue;
        }
        let Some(end) = tag_end(s, lt) else { continue };
        if has_class(&s[lt..end], class) {
            return Some(lt);
        }
    }
    None
}

/// First element carrying class token `class`, as the whole block.
pub fn class_block<'a>(s: &'a str, class: &str) -> Option<&'a str> {
    let lt = find_class_ci(s, class, 0)?;
    let (start, end) = element_at(s, lt)?;
    Some(&s[start..end])
}

/// Every non-overlapping element carrying class token `class`, in document order.
pub fn class_blocks<'a>(s: &'a str, class: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(lt) = find_class_ci(s, class, pos) {
        match element_at(s, lt) {
            Some((start, end)) => {
                out.push(&s[start..end]);
                pos = end;
            }
            None => break,
        }
    }
    out
}

/// Visible text of the first element with class `class`; `None` if the
/// element is missing or holds only whitespace.
pub fn class_text(s: &str, class: &str) -> Option<String> {
    class_block(s, class)
        .map(text_of)
        .filter(|t| !t.is_empty())
}

/// Given a complete tag block like `<td ...>INNER</td>`, return INNER
/// (may still contain nested tags).
pub fn inner_after_open_tag(block: &str) -> &str {
    if let Some(open_end) = tag_end(block, 0) {
        if let Some(close_start) = block.rfind('<') {
            if close_start >= open_end {
                return &block[open_end..close_start];
            }
        }
    }
    ""
}

/// Remove all tags `<...>`, keeping the text between them.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Human-visible text of a block: tags stripped, entities decoded, whitespace collapsed.
pub fn text_of(block: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(inner_after_open_tag(block))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_at_matches_nested_same_name() {
        let doc = r#"<div class="a"><div>x</div><div>y</div></div><div>z</div>"#;
        let (s, e) = element_at(doc, 0).unwrap();
        assert_eq!(&doc[s..e], r#"<div class="a"><div>x</div><div>y</div></div>"#);
    }

    #[test]
    fn element_at_does_not_confuse_prefix_names() {
        let doc = "<a href=x><article>t</article>n</a>";
        let (s, e) = element_at(doc, 0).unwrap();
        assert_eq!(&doc[s..e], doc);
    }

    #[test]
    fn attr_values_quoted_and_bare() {
        assert_eq!(attr_ci(r#"<a HREF="/charts/hot-100/2015-11-21" title='Previous Week'>"#, "href"),
            Some("/charts/hot-100/2015-11-21"));
        assert_eq!(attr_ci(r#"<a href="x" title='Previous Week'>"#, "title"), Some("Previous Week"));
        assert_eq!(attr_ci("<time datetime=2015-11-28>", "datetime"), Some("2015-11-28"));
        assert_eq!(attr_ci(r#"<div data-class="no">"#, "class"), None);
    }

    #[test]
    fn class_token_is_whole_word() {
        let doc = r#"<h2 class="chart-row__song">Hello</h2><article class="chart-row chart-row--1">r</article>"#;
        let lt = find_class_ci(doc, "chart-row", 0).unwrap();
        assert!(doc[lt..].starts_with("<article"));
    }

    #[test]
    fn class_blocks_in_document_order() {
        let doc = r#"<ul><li class="row">a</li><li class="row x">b</li><li class="other">c</li></ul>"#;
        let rows: Vec<String> = class_blocks(doc, "row").into_iter().map(text_of).collect();
        assert_eq!(rows, vec!["a", "b"]);
    }

    #[test]
    fn class_text_decodes_and_collapses() {
        let doc = "<h3 class=\"artist\">\n  <a href=\"/x\">Major Lazer &amp; DJ Snake</a>\n</h3>";
        assert_eq!(class_text(doc, "artist").as_deref(), Some("Major Lazer & DJ Snake"));
        assert_eq!(class_text("<span class=\"artist\">  </span>", "artist"), None);
    }

    #[test]
    fn find_ci_ignores_ascii_case() {
        let doc = "<DIV Class=\"Chart-Row\">é<div class=\"chart-row\">";
        assert_eq!(find_ci(doc, "chart-row", 0), Some(12));
        assert_eq!(find_ci(doc, "chart-row", 13), Some(37));
        assert_eq!(find_ci(doc, "chart-row", 38), None);
        assert_eq!(find_ci("ab", "abc", 0), None);
        assert_eq!(find_tag_ci(doc, "div", 1), Some(25));
    }

    #[test]
    fn class_blocks_scale_with_page_size() {
        use std::time::{Duration, Instant};

        let row = r#"<article class="chart-row"><span class="chart-row__song">Song</span><a class="chart-row__artist">Artist</a></article>"#;
        let doc = format!("<html><body>{}</body></html>{}", row.repeat(5_000), " ".repeat(500_000));
        let start = Instant::now();
        let rows = class_blocks(&doc, "chart-row");
        assert_eq!(rows.len(), 5_000);
        assert_eq!(class_text(rows[4_999], "chart-row__artist").as_deref(), Some("Artist"));
        // rescanning the page per row would take minutes here
        assert!(start.elapsed() < Duration::from_secs(20), "{:?}", start.elapsed());
    }

    #[test]
    fn gt_inside_quotes_does_not_end_tag() {
        let doc = r#"<span title="a > b">v</span>"#;
        assert_eq!(inner_after_open_tag(doc), "v");
    }
}
