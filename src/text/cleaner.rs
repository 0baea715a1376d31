//! Cleanup of raw page text into stable, comparable strings.
//!
//! The cleaner knows nothing about the portal except the label vocabulary it
//! is constructed with; the navigation/footer noise phrases are fixed.

use regex::Regex;
use std::sync::LazyLock;

/// Odd Unicode spaces mapped to a plain ASCII space.
const ODD_SPACES: &[char] = &[
    '\u{00A0}', '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}', '\u{2005}',
    '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}', '\u{202F}', '\u{205F}',
    '\u{3000}',
];

/// Zero-width space and zero-width no-break space (BOM), dropped entirely.
const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{FEFF}'];

/// A label break can expose a line that is now pure noise, so passes repeat
/// until the text stops changing. In practice two rounds suffice.
const MAX_ROUNDS: usize = 8;

static NOISE_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[\t \p{Zs}]*(?:zur Navigation|Glossar|Kontakt|Datenschutz[- ]?Erklärung|Impressum|Barrierefreiheit|zum Suchergebnis|Lesezeichen)[\t \p{Zs}]*(?:\n|\z)",
    )
    .unwrap()
});

static LINE_EDGE_SPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[\t \p{Zs}]+|[\t \p{Zs}]+$").unwrap());

static MULTI_SPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t \p{Zs}]{2,}").unwrap());

static BLANK_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Multi-pass text normalizer.
///
/// `clean` is pure, total and idempotent. Its output has no CR, tabs, odd
/// Unicode spaces or zero-width characters, never more than one blank line in
/// a row, and every vocabulary label followed by a colon starts its own line.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    label_break: Option<Regex>,
}

impl TextCleaner {
    /// Build a cleaner that moves each of `labels` onto its own line when it
    /// shows up mid-line as `label:`. Labels are literal text.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_string())
            .filter(|label| !label.is_empty())
            .map(|label| regex::escape(&label))
            .collect();

        let label_break = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"([^\n])((?:{}):)", alternatives.join("|"));
            Some(Regex::new(&pattern).expect("escaped labels form a valid pattern"))
        };

        Self { label_break }
    }

    /// Cleaner for the court portal's field vocabulary.
    pub fn for_edikte() -> Self {
        Self::new(crate::edikt::FIELD_LABELS)
    }

    pub fn clean(&self, text: &str) -> String {
        let mut current = self.clean_once(text);
        for _ in 1..MAX_ROUNDS {
            let next = self.clean_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn clean_once(&self, text: &str) -> String {
        let text = normalize_spaces_and_newlines(text);
        let text = NOISE_LINE_REGEX.replace_all(&text, "");
        let text = space_after_colon(&text);
        let text = match &self.label_break {
            Some(regex) => regex.replace_all(&text, "$1\n$2").into_owned(),
            None => text,
        };
        let text = LINE_EDGE_SPACE_REGEX.replace_all(&text, "");
        let text = MULTI_SPACE_REGEX.replace_all(&text, " ");
        let text = BLANK_LINES_REGEX.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::for_edikte()
    }
}

fn normalize_spaces_and_newlines(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    text.chars()
        .filter(|c| !ZERO_WIDTH.contains(c))
        .map(|c| {
            if c == '\t' || ODD_SPACES.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// "Key:Value" becomes "Key: Value". Each colon is inspected on its own, so a
/// run like "a::b" becomes "a: : b" and stays that way on a second pass.
fn space_after_colon(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == ':'
            && let Some(&next) = chars.peek()
            && !next.is_whitespace()
        {
            out.push(' ');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> TextCleaner {
        TextCleaner::for_edikte()
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(cleaner().clean(""), "");
        assert_eq!(cleaner().clean(" \r\n\t "), "");
    }

    #[test]
    fn colon_gets_a_space() {
        assert_eq!(cleaner().clean("Wert:123"), "Wert: 123");
        assert_eq!(cleaner().clean("a::b"), "a: : b");
        assert_eq!(cleaner().clean("Ende:"), "Ende:");
    }

    #[test]
    fn mid_line_label_moves_to_own_line() {
        let cleaned = cleaner().clean("Bezirksgericht LinzDienststelle:X");
        assert_eq!(cleaned, "Bezirksgericht Linz\nDienststelle: X");

        let cleaned = cleaner().clean("Dienststelle:X");
        assert_eq!(cleaned, "Dienststelle: X");
    }

    #[test]
    fn labels_with_metacharacters_match_literally() {
        let cleaned = cleaner().clean("Bauland Kategorie(n): UL Grundstücksnr.: 214/2");
        assert_eq!(cleaned, "Bauland\nKategorie(n): UL\nGrundstücksnr.: 214/2");

        // "." must not act as a wildcard
        let cleaned = cleaner().clean("a Grundstücksnrx: 1");
        assert_eq!(cleaned, "a Grundstücksnrx: 1");
    }

    #[test]
    fn normalizes_newlines_tabs_and_odd_spaces() {
        let raw = "Zeile\u{00A0}eins\r\nZeile\tzwei\rZeile\u{2009}\u{3000}drei\u{200B}\u{FEFF}";
        assert_eq!(cleaner().clean(raw), "Zeile eins\nZeile zwei\nZeile drei");
    }

    #[test]
    fn drops_noise_lines() {
        let raw = "zur Navigation\nSchätzwert: 1 EUR\n  GLOSSAR  \nKontakt\nDatenschutz-Erklärung\nDatenschutzerklärung\nImpressum\nBarrierefreiheit\nzum Suchergebnis\nLesezeichen";
        assert_eq!(cleaner().clean(raw), "Schätzwert: 1 EUR");
    }

    #[test]
    fn noise_phrase_inside_a_line_is_kept() {
        let raw = "Kontaktaufnahme erbeten\nImpressum des Gerichts";
        assert_eq!(cleaner().clean(raw), raw);
    }

    #[test]
    fn collapses_spaces_and_blank_lines() {
        let raw = "  a    b  \n\n\n\n   c\n\n\nd  ";
        assert_eq!(cleaner().clean(raw), "a b\n\nc\n\nd");
    }

    #[test]
    fn label_break_exposing_noise_is_still_idempotent() {
        let once = cleaner().clean("Kontakt Dienststelle: BG Linz");
        assert_eq!(once, "Dienststelle: BG Linz");
        assert_eq!(cleaner().clean(&once), once);
    }

    #[test]
    fn idempotent_on_realistic_page_text() {
        let raw = "\u{FEFF}zur Navigation\r\n\r\n\r\nEdikt\tVersteigerung   Dienststelle:BG Linz Aktenzeichen:3 E 12/25k\n\n\n\nSchätzwert:25.000,00 EUR  Grundstücksgröße:850 m²\nImpressum";
        let once = cleaner().clean(raw);
        assert_eq!(cleaner().clean(&once), once);
        assert!(!once.contains("\n\n\n"));
        assert!(once.contains("\nDienststelle: BG Linz\n"));
        assert!(once.contains("\nSchätzwert: 25.000,00 EUR\nGrundstücksgröße: 850 m²"));
    }

    #[test]
    fn empty_vocabulary_only_normalizes() {
        let plain = TextCleaner::new(Vec::<String>::new());
        assert_eq!(plain.clean("a Dienststelle:X"), "a Dienststelle: X");
    }

    #[cfg(feature = "fuzz")]
    mod fuzz {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clean_is_idempotent(text in "(\\PC|[\r\n\t\u{00A0}\u{200B}:]|Dienststelle:|Kontakt|EZ:){0,64}") {
                let cleaner = TextCleaner::for_edikte();
                let once = cleaner.clean(&text);
                prop_assert_eq!(cleaner.clean(&once), once.clone());
                prop_assert!(!once.contains("\n\n\n"));
                prop_assert!(!once.contains('\r'));
                prop_assert!(!once.contains('\t'));
            }
        }
    }
}
