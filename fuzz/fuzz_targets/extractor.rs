#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use edikt_watch::edikt::{extract_alldoc_urls, parse_edikt};
use edikt_watch::text::TextCleaner;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);
    let base = Url::parse("https://edikte.example.test/edikte/ex/exedi3.nsf/suchedi").unwrap();

    // None of this may panic, whatever the page looks like.
    let edikt = parse_edikt(&html, base.clone());
    let _ = edikt.schaetzwert();
    let _ = edikt.kurzgutachten_link();
    let _ = edikt.langgutachten_links();
    let _ = extract_alldoc_urls(&html, &base);

    let cleaner = TextCleaner::for_edikte();
    let once = cleaner.clean(&html);
    assert_eq!(cleaner.clean(&once), once);
});
