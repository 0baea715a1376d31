use crate::fetcher::{decode::decode_body, errors::FetchError, types::PageResponse};
use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, header};
use std::time::Duration;
use tracing::{debug, instrument};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:142.0) Gecko/20100101 Firefox/142.0";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("de,en;q=0.8"),
    );

    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(25))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(headers)
        .build()
        .expect("Failed to build HTTP client")
});

/// GET an HTML page and decode it to UTF-8. Only 2xx responses are accepted.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch(url: &str) -> Result<PageResponse, FetchError> {
    let requested = url::Url::parse(url)?;

    let response = HTTP_CLIENT
        .get(requested.clone())
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http { status });
    }

    let url_final = response.url().clone();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    let body = response
        .bytes()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    // Content-Length may be missing on chunked responses
    if body.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(body.len() as u64));
    }

    let (body_utf8, charset) = decode_body(&content_type, &body)?;
    debug!(
        status = %status,
        charset = charset.name(),
        bytes = body.len(),
        "page fetched"
    );

    Ok(PageResponse {
        url_requested: requested,
        url_final,
        status,
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    })
}
