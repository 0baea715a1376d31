use chrono::{DateTime, Utc};
use encoding_rs::Encoding;
use reqwest::StatusCode;
use url::Url;

/// A fetched and decoded HTML page.
///
/// `url_requested` is the address the caller asked for; `url_final` is where
/// redirects ended up. Notices are keyed by the requested address.
#[derive(Debug)]
pub struct PageResponse {
    pub url_requested: Url,
    pub url_final: Url,
    pub status: StatusCode,
    pub body_utf8: String,
    pub charset: &'static Encoding,
    pub fetched_at: DateTime<Utc>,
}

impl PageResponse {
    /// Visible text of the `<body>` element, or of the whole document when
    /// there is no body.
    pub fn body_text(&self) -> String {
        let document = scraper::Html::parse_document(&self.body_utf8);
        match scraper::Selector::parse("body") {
            Ok(selector) => match document.select(&selector).next() {
                Some(body) => body.text().collect(),
                None => document.root_element().text().collect(),
            },
            Err(_) => document.root_element().text().collect(),
        }
    }
}
