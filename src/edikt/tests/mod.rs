use std::fs;
use url::Url;

use crate::edikt::{IntField, StructureError, parse_edikt};

const NOTICE_URL: &str =
    "https://edikte.example.test/edikte/ex/exedi3.nsf/alldoc/0001!OpenDocument";

fn fixture_notice() -> crate::edikt::Edikt {
    let html = fs::read_to_string("src/edikt/tests/fixtures/notice.html")
        .expect("Failed to read test fixture");
    parse_edikt(&html, Url::parse(NOTICE_URL).unwrap())
}

#[test]
fn test_extract_fields_from_rows() {
    let edikt = fixture_notice();

    assert_eq!(edikt.url().as_str(), NOTICE_URL);
    assert_eq!(edikt.text("Dienststelle"), "BG Linz (453)");
    assert_eq!(edikt.text("Aktenzeichen"), "3 E 12/25k");
    assert_eq!(edikt.schaetzwert(), IntField::Value(25_000));
    assert_eq!(edikt.grundstuecksgroesse(), IntField::Value(1_250));
    assert_eq!(edikt.plz_ort(), "4020 Linz");
    assert_eq!(edikt.liegenschaftsadresse(), "Hauptstraße 1");
}

#[test]
fn test_rows_without_label_are_dropped() {
    let edikt = fixture_notice();

    assert!(edikt.labels().all(|label| !label.is_empty()));
    assert!(edikt.get("").is_none());
}

#[test]
fn test_duplicate_label_keeps_last_row() {
    let edikt = fixture_notice();
    assert_eq!(edikt.text("Sonstiges"), "zweite Fassung");
}

#[test]
fn test_label_without_value_reads_empty() {
    let edikt = fixture_notice();

    assert!(edikt.get("Objektgröße").is_some());
    assert_eq!(edikt.text("Objektgröße"), "");
    assert_eq!(edikt.objektgroesse(), IntField::Empty);
}

#[test]
fn test_links_resolve_against_notice_url() {
    let edikt = fixture_notice();

    let lang: Vec<String> = edikt
        .langgutachten_links()
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(
        lang,
        vec![
            "https://edikte.example.test/edikte/ex/exedi3.nsf/alldoc/files/gutachten-teil1.pdf",
            "https://edikte.example.test/edikte/ex/exedi3.nsf/alldoc/files/gutachten-teil2.pdf",
            "https://edikte.example.test/edikte/files/anhang.pdf",
        ]
    );

    let kurz = edikt.kurzgutachten_link().unwrap().unwrap();
    assert_eq!(
        kurz.as_str(),
        "https://edikte.example.test/edikte/ex/exedi3.nsf/alldoc/kurz/0001.html"
    );
}

#[test]
fn test_two_short_appraisal_links_are_inconsistent() {
    let html = r#"<div class="row"><span class="col-sm-3">Kurzgutachten:</span>
        <p class="col-sm-9"><a href="a.html">A</a> <a href="b.html">B</a></p></div>"#;
    let edikt = parse_edikt(html, Url::parse(NOTICE_URL).unwrap());

    assert!(matches!(
        edikt.kurzgutachten_link(),
        Err(StructureError::TooManyLinks { count: 2, .. })
    ));
}

#[test]
fn test_malformed_html_yields_fewer_fields() {
    let html = "<div class=\"row\"><span class=\"col-sm-3\">Schätzwert:<p class=\"col-sm-9\">12.000 EUR";
    let edikt = parse_edikt(html, Url::parse(NOTICE_URL).unwrap());

    // Never panics; whatever survives parsing is still readable.
    let _ = edikt.schaetzwert();
    assert_eq!(edikt.text("Nicht vorhanden"), "");
    assert_eq!(edikt.int("Nicht vorhanden"), IntField::Absent);
}

#[test]
fn test_page_without_rows_is_empty_record() {
    let edikt = parse_edikt("<html><body><p>Kein Edikt</p></body></html>", Url::parse(NOTICE_URL).unwrap());
    assert!(edikt.is_empty());
    assert!(edikt.langgutachten_links().is_empty());
    assert_eq!(edikt.kurzgutachten_link(), Ok(None));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_parse_never_panics(html in ".*") {
            let edikt = parse_edikt(&html, Url::parse(NOTICE_URL).unwrap());
            let _ = edikt.schaetzwert();
            let _ = edikt.langgutachten_links();
            let _ = edikt.kurzgutachten_link();
        }
    }
}
