use crate::fetcher::errors::FetchError;
use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

/// Bytes of the document head searched for a `<meta charset>` declaration.
const SNIFF_LEN: usize = 4096;

/// Decode a response body to UTF-8.
///
/// The charset comes from the Content-Type header, then from a `<meta>`
/// declaration near the top of the document, then from statistical detection.
pub fn decode_body(
    content_type: &str,
    body: &[u8],
) -> Result<(String, &'static Encoding), FetchError> {
    let encoding = detect_charset(content_type, body);
    let (decoded, _, had_errors) = encoding.decode(body);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "body is not valid {}",
            encoding.name()
        )));
    }

    Ok((decoded.into_owned(), encoding))
}

fn detect_charset(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_LEN)];
    if let Some(encoding) = label_from(&META_CHARSET_REGEX, &String::from_utf8_lossy(head)) {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body.len() <= SNIFF_LEN);
    detector.guess(None, true)
}

fn label_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}
