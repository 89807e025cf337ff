//! Outbound-link discovery on fetched pages.

use std::collections::BTreeSet;

/// Deduped absolute links from HTML, in document order.
///
/// - Resolves relative links against `base_url`.
/// - Drops fragments.
/// - Skips `javascript:` and `mailto:` targets.
/// - Returns at most `max_links`.
pub fn page_links(html: &str, base_url: &str, max_links: usize) -> Vec<String> {
    let max_links = max_links.min(500);
    if max_links == 0 {
        return Vec::new();
    }

    let base = url::Url::parse(base_url).ok();
    let doc = html_scraper::Html::parse_document(html);
    let sel = match html_scraper::Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut seen = BTreeSet::<String>::new();
    let mut out: Vec<String> = Vec::new();
    for el in doc.select(&sel) {
        if out.len() >= max_links {
            break;
        }
        let href = match el.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };
        if href.is_empty() {
            continue;
        }
        let href_lc = href.to_ascii_lowercase();
        if href_lc.starts_with("javascript:") || href_lc.starts_with("mailto:") {
            continue;
        }

        let abs = if let Ok(u) = url::Url::parse(href) {
            u
        } else if let Some(b) = &base {
            match b.join(href) {
                Ok(u) => u,
                Err(_) => continue,
            }
        } else {
            continue;
        };

        let mut u = abs;
        u.set_fragment(None);
        let link = u.to_string();
        if seen.insert(link.clone()) {
            out.push(link);
        }
    }

    out
}
