//! The filter chain deciding whether a notice is reported.
//!
//! Rules are checked in order and the first match wins:
//! invalid, over budget, already known, qualifying. Only the last two touch
//! the store.

use crate::edikt::{Edikt, IntField};
use crate::store::{DedupStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The appraised value is absent, blank, malformed or not positive.
    NoAppraisedValue(IntField),
    /// No long appraisal document is linked.
    NoLanggutachten,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Invalid(InvalidReason),
    OverBudget { value: i64 },
    Known,
    /// Recorded in the store just now; the notice should be reported.
    Qualifying { value: i64 },
}

impl Decision {
    pub fn is_qualifying(&self) -> bool {
        matches!(self, Self::Qualifying { .. })
    }
}

/// Classify `edikt`, recording it in `store` when it reaches the dedup rule.
pub fn decide(
    edikt: &Edikt,
    store: &mut DedupStore,
    max_cost: i64,
) -> Result<Decision, StoreError> {
    let schaetzwert = edikt.schaetzwert();
    let Some(value) = schaetzwert.positive() else {
        return Ok(Decision::Invalid(InvalidReason::NoAppraisedValue(
            schaetzwert,
        )));
    };
    if edikt.langgutachten_links().is_empty() {
        return Ok(Decision::Invalid(InvalidReason::NoLanggutachten));
    }

    if value > max_cost {
        return Ok(Decision::OverBudget { value });
    }

    if store.test_and_insert(edikt.url().as_str())? {
        return Ok(Decision::Known);
    }

    Ok(Decision::Qualifying { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edikt::FieldValue;
    use tempfile::tempdir;
    use url::Url;

    const MAX_COST: i64 = 30_000;

    fn notice(url: &str, schaetzwert: Option<&str>, langgutachten: &[&str]) -> Edikt {
        let mut edikt = Edikt::new(Url::parse(url).unwrap());
        if let Some(value) = schaetzwert {
            edikt.insert("Schätzwert", FieldValue::new(value, Vec::new()));
        }
        if !langgutachten.is_empty() {
            let hrefs = langgutachten.iter().map(|h| h.to_string()).collect();
            edikt.insert("Langgutachten", FieldValue::new("Gutachten", hrefs));
        }
        edikt
    }

    #[test]
    fn fresh_notice_qualifies_once() {
        let dir = tempdir().unwrap();
        let mut store = DedupStore::load(dir.path().join("db.dat")).unwrap();
        let edikt = notice(
            "https://example.test/alldoc/1",
            Some("25.000,00 EUR"),
            &["gutachten.pdf"],
        );

        assert_eq!(
            decide(&edikt, &mut store, MAX_COST).unwrap(),
            Decision::Qualifying { value: 25_000 }
        );
        assert_eq!(store.len(), 1);

        assert_eq!(decide(&edikt, &mut store, MAX_COST).unwrap(), Decision::Known);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn over_budget_does_not_touch_store() {
        let dir = tempdir().unwrap();
        let mut store = DedupStore::load(dir.path().join("db.dat")).unwrap();
        let edikt = notice(
            "https://example.test/alldoc/2",
            Some("35.000,00 EUR"),
            &["gutachten.pdf"],
        );

        assert_eq!(
            decide(&edikt, &mut store, MAX_COST).unwrap(),
            Decision::OverBudget { value: 35_000 }
        );
        assert!(store.is_empty());
        assert!(!dir.path().join("db.dat").exists());
    }

    #[test]
    fn budget_ceiling_is_inclusive() {
        let dir = tempdir().unwrap();
        let mut store = DedupStore::load(dir.path().join("db.dat")).unwrap();
        let edikt = notice(
            "https://example.test/alldoc/3",
            Some("30.000,00 EUR"),
            &["g.pdf"],
        );

        assert!(decide(&edikt, &mut store, MAX_COST).unwrap().is_qualifying());
    }

    #[test]
    fn invalid_notices_do_not_touch_store() {
        let dir = tempdir().unwrap();
        let mut store = DedupStore::load(dir.path().join("db.dat")).unwrap();

        let blank = notice("https://example.test/alldoc/4", Some(""), &[]);
        assert_eq!(
            decide(&blank, &mut store, MAX_COST).unwrap(),
            Decision::Invalid(InvalidReason::NoAppraisedValue(IntField::Empty))
        );

        let absent = notice("https://example.test/alldoc/5", None, &["g.pdf"]);
        assert_eq!(
            decide(&absent, &mut store, MAX_COST).unwrap(),
            Decision::Invalid(InvalidReason::NoAppraisedValue(IntField::Absent))
        );

        let malformed = notice("https://example.test/alldoc/6", Some("auf Anfrage"), &["g.pdf"]);
        assert_eq!(
            decide(&malformed, &mut store, MAX_COST).unwrap(),
            Decision::Invalid(InvalidReason::NoAppraisedValue(IntField::Malformed))
        );

        let no_gutachten = notice("https://example.test/alldoc/7", Some("1.000,00 EUR"), &[]);
        assert_eq!(
            decide(&no_gutachten, &mut store, MAX_COST).unwrap(),
            Decision::Invalid(InvalidReason::NoLanggutachten)
        );

        assert!(store.is_empty());
    }

    #[test]
    fn invalid_wins_over_budget() {
        let dir = tempdir().unwrap();
        let mut store = DedupStore::load(dir.path().join("db.dat")).unwrap();
        let edikt = notice("https://example.test/alldoc/8", Some("99.000,00 EUR"), &[]);

        assert_eq!(
            decide(&edikt, &mut store, MAX_COST).unwrap(),
            Decision::Invalid(InvalidReason::NoLanggutachten)
        );
    }
}
