//! Reading links out of a directory index page.

use scraper::{Html, Selector};

/// Every `<a href>` value on the page, in document order, duplicates kept.
///
/// Only anchors matter; the rest of the page structure is ignored, so any
/// autoindex flavour (nginx, Apache, lighttpd, hand-written) parses.
pub fn extract_links(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    Html::parse_document(html)
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_owned)
        .collect()
}

/// Whether `link` names an entry inside the listing it appears on.
///
/// Autoindex pages also carry sort-order links (`?C=N;O=D`), icon paths
/// (`/icons/blank.gif`) and absolute URLs; none of those are children.
/// A colon alone does not make a link absolute: `img:1.jpg` is a file name.
pub fn is_listing_entry(link: &str) -> bool {
    !(link.is_empty()
        || link.starts_with('/')
        || link.starts_with('?')
        || link.starts_with('#')
        || link.contains("//")
        || has_web_scheme(link))
}

fn has_web_scheme(link: &str) -> bool {
    link.split_once(':').is_some_and(|(scheme, _)| {
        scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
    })
}

/// Fetch URL of a child entry: the listing URL without trailing separators,
/// one `/`, then the link as written on the page.
pub fn resolve_link(source_url: &str, link: &str) -> String {
    format!("{}/{}", source_url.trim_end_matches('/'), link)
}
