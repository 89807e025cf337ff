//! HTML title and visible-text extraction for fetched pages.

/// Elements that never contribute visible prose.
const STRIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "img", "figure", "video", "audio", "button", "svg", "canvas",
];

/// Text content of the `<title>` element, whitespace-normalized.
pub fn page_title(html: &str) -> Option<String> {
    let doc = html_scraper::Html::parse_document(html);
    let sel = html_scraper::Selector::parse("title").ok()?;
    let el = doc.select(&sel).next()?;
    let title = norm_ws(&el.text().collect::<Vec<_>>().join(" "));
    (!title.is_empty()).then_some(title)
}

/// Visible body text with non-visual elements removed and whitespace runs
/// collapsed to single spaces. `None` when the page has no readable body.
pub fn visible_text(html: &str) -> Option<String> {
    let mut cleaned = html.to_string();
    for tag in STRIPPED_TAGS {
        cleaned = strip_tag_blocks(&cleaned, tag);
    }
    let doc = html_scraper::Html::parse_document(&cleaned);
    let sel = html_scraper::Selector::parse("body").ok()?;
    let body = doc.select(&sel).next()?;
    let text = norm_ws(&body.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

pub(crate) fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Minimal, best-effort stripper for `<tag ...> ... </tag>` blocks.
///
/// Only removes when it finds a close tag, and is ASCII-case-insensitive on
/// tag names. Void tags (`img`) pass through untouched; they carry no text.
fn strip_tag_blocks(html: &str, tag: &str) -> String {
    let tag_lc = tag.to_ascii_lowercase();
    let open_pat = format!("<{tag_lc}");
    let close_pat = format!("</{tag_lc}>");

    let mut out = String::new();
    let mut i = 0usize;
    let lower = html.to_ascii_lowercase();
    while let Some(rel_start) = lower[i..].find(&open_pat) {
        let start = i + rel_start;
        let after_open = start + open_pat.len();
        if let Some(rel_end) = lower[after_open..].find(&close_pat) {
            let end = after_open + rel_end + close_pat.len();
            out.push_str(&html[i..start]);
            i = end;
        } else {
            // No close tag; stop stripping.
            break;
        }
    }
    out.push_str(&html[i..]);
    out
}
