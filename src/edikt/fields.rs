//! Typed access to the fields of a notice.
//!
//! Accessors never fail on missing or malformed data: absence and malformation
//! are values. The one exception is a layout assumption that does not hold,
//! which is reported as a [`StructureError`].

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::edikt::model::{Edikt, FieldContent};
use crate::edikt::{
    GRUNDSTUECKSGROESSE, KURZGUTACHTEN, LANGGUTACHTEN, LIEGENSCHAFTSADRESSE, OBJEKTGROESSE,
    PLZ_ORT, SCHAETZWERT,
};
use crate::fetcher::fetch;
use crate::geo::{GeoError, Geocoder};
use crate::text::TextCleaner;

/// Result of reading a localized integer such as `"1.234,00 EUR"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntField {
    /// The field parsed to this number.
    Value(i64),
    /// The field exists but nothing numeric was left after stripping units,
    /// decimals and separators. Reads as zero.
    Empty,
    /// The label does not occur on the page.
    Absent,
    /// The field exists but is not a base-10 integer.
    Malformed,
}

impl IntField {
    /// The numeric reading, with a blank field counting as zero.
    pub fn value(self) -> Option<i64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Empty => Some(0),
            Self::Absent | Self::Malformed => None,
        }
    }

    /// A strictly positive amount, as required of an appraised value.
    pub fn positive(self) -> Option<i64> {
        self.value().filter(|v| *v > 0)
    }

    /// Legacy per-field convention: absent -1, empty -2, malformed -3.
    pub fn strict_sentinel(self) -> i64 {
        match self {
            Self::Value(v) => v,
            Self::Absent => -1,
            Self::Empty => -2,
            Self::Malformed => -3,
        }
    }

    /// Legacy generic convention: absent or empty 0, malformed -1.
    pub fn lenient_sentinel(self) -> i64 {
        match self {
            Self::Value(v) => v,
            Self::Absent | Self::Empty => 0,
            Self::Malformed => -1,
        }
    }
}

/// The page does not have the shape the accessors rely on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("field '{label}' holds {count} links where at most one is expected")]
    TooManyLinks { label: &'static str, count: usize },
}

/// Parse the integer part of a localized amount.
///
/// Keeps the token before the first space (drops "EUR", "m²"), keeps the part
/// before the first comma (drops the decimals), removes the dots used as
/// thousands separators and trims.
pub fn parse_localized_int(text: &str) -> IntField {
    let token = text.split(' ').next().unwrap_or_default();
    let token = token.split(',').next().unwrap_or_default();
    let digits = token.replace('.', "");
    let digits = digits.trim();

    if digits.is_empty() {
        return IntField::Empty;
    }

    match digits.parse::<i64>() {
        Ok(v) => IntField::Value(v),
        Err(_) => IntField::Malformed,
    }
}

impl Edikt {
    /// Trimmed text of a field with no-break spaces turned into plain ones.
    /// Missing fields read as "".
    pub fn text(&self, label: &str) -> String {
        self.get(label)
            .map(|field| field.text().trim().replace('\u{00A0}', " "))
            .unwrap_or_default()
    }

    pub fn int(&self, label: &str) -> IntField {
        match self.get(label) {
            Some(_) => parse_localized_int(&self.text(label)),
            None => IntField::Absent,
        }
    }

    /// Every link inside a field resolved against `base`, in document order
    /// and with duplicates. Blank hrefs are skipped.
    pub fn links(&self, label: &str, base: &Url) -> Vec<Url> {
        let Some(field) = self.get(label) else {
            return Vec::new();
        };

        field
            .links()
            .iter()
            .map(|href| href.trim())
            .filter(|href| !href.is_empty())
            .filter_map(|href| match base.join(href) {
                Ok(url) => Some(url),
                Err(e) => {
                    debug!(href, error = %e, "skipping unresolvable link");
                    None
                }
            })
            .collect()
    }

    pub fn schaetzwert(&self) -> IntField {
        self.int(SCHAETZWERT)
    }

    pub fn objektgroesse(&self) -> IntField {
        self.int(OBJEKTGROESSE)
    }

    pub fn grundstuecksgroesse(&self) -> IntField {
        self.int(GRUNDSTUECKSGROESSE)
    }

    pub fn plz_ort(&self) -> String {
        self.text(PLZ_ORT)
    }

    pub fn liegenschaftsadresse(&self) -> String {
        self.text(LIEGENSCHAFTSADRESSE)
    }

    /// The short appraisal page, if the notice links one.
    pub fn kurzgutachten_link(&self) -> Result<Option<Url>, StructureError> {
        let mut links = self.links(KURZGUTACHTEN, self.url());
        match links.len() {
            0 => Ok(None),
            1 => Ok(links.pop()),
            count => Err(StructureError::TooManyLinks {
                label: KURZGUTACHTEN,
                count,
            }),
        }
    }

    /// Long appraisal documents, usually PDFs.
    pub fn langgutachten_links(&self) -> Vec<Url> {
        self.links(LANGGUTACHTEN, self.url())
    }

    /// Distance in km from the notice's postal code/city to the geocoder's origin.
    /// A notice without PLZ/Ort is never looked up.
    pub async fn entfernung(&self, geocoder: &dyn Geocoder) -> Result<u32, GeoError> {
        let plz_ort = self.plz_ort();
        if plz_ort.is_empty() {
            return Err(GeoError::NotFound(plz_ort));
        }
        geocoder.distance_km(&plz_ort).await
    }

    /// Cleaned body text of the short appraisal page, "" when there is none.
    pub async fn kurzgutachten_text(&self, cleaner: &TextCleaner) -> anyhow::Result<String> {
        let Some(link) = self.kurzgutachten_link()? else {
            return Ok(String::new());
        };

        let page = fetch(link.as_str()).await?;
        Ok(cleaner.clean(&page.body_text()))
    }
}
