pub mod alldocs;
pub mod fields;
pub mod model;
pub mod parser;

#[cfg(test)]
mod tests;

pub use alldocs::extract_alldoc_urls;
pub use fields::{IntField, StructureError, parse_localized_int};
pub use model::{Edikt, FieldContent, FieldValue};
pub use parser::parse_edikt;

pub const SCHAETZWERT: &str = "Schätzwert";
pub const OBJEKTGROESSE: &str = "Objektgröße";
pub const GRUNDSTUECKSGROESSE: &str = "Grundstücksgröße";
pub const PLZ_ORT: &str = "PLZ/Ort";
pub const LIEGENSCHAFTSADRESSE: &str = "Liegenschaftsadresse";
pub const KURZGUTACHTEN: &str = "Kurzgutachten";
pub const LANGGUTACHTEN: &str = "Langgutachten";

/// Labels the portal prints as `Label:` inside free text. The text cleaner
/// moves each of them onto its own line.
pub const FIELD_LABELS: &[&str] = &[
    "Dienststelle",
    "Aktenzeichen",
    "wegen",
    "Grundbuch",
    "EZ",
    "Grundstücksnr.",
    "BLNr",
    "Adresse",
    "PLZ/Ort",
    "Kategorie(n)",
    "Beschreibung (WE)",
    "Grundstücksgröße",
    "Stichtag",
    "Schätzwert",
    "Wert des mitzuversteigernden Zubehörs",
    "erstellt von",
    "Ausdruck vom",
];
