use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Relative links from a search result page to a notice start with this.
const ALLDOC_PREFIX: &str = "alldoc";

/// Absolute notice URLs found on a search result page.
///
/// Order follows the document and duplicates are kept, so the crawl order is
/// the order the portal lists its notices in.
pub fn extract_alldoc_urls(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with(ALLDOC_PREFIX))
        .filter_map(|href| base.join(href).ok())
        .collect()
}
