use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::edikt::model::{Edikt, FieldValue};

// Portal layout:
//
//   <div class="row">
//     <span class="col-sm-3">Label:</span>
//     <p class="col-sm-9">Value...</p>
//   </div>
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.row").unwrap());
static LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.col-sm-3").unwrap());
static VALUE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p.col-sm-9").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Build the field record of a notice page.
///
/// Never fails: malformed rows just produce fewer fields. Rows without a label
/// are skipped, and a repeated label keeps the last row.
pub fn parse_edikt(html: &str, self_url: Url) -> Edikt {
    let document = Html::parse_document(html);
    let mut edikt = Edikt::new(self_url);

    for row in document.select(&ROW_SELECTOR) {
        let label = row_label(row);
        if label.is_empty() {
            continue;
        }
        edikt.insert(label, row_value(row));
    }

    debug!(url = %edikt.url(), fields = edikt.len(), "notice parsed");
    edikt
}

fn row_label(row: ElementRef<'_>) -> String {
    let text: String = row
        .select(&LABEL_SELECTOR)
        .flat_map(|label| label.text())
        .collect();
    let text = text.trim();
    text.strip_suffix(':').unwrap_or(text).to_string()
}

fn row_value(row: ElementRef<'_>) -> FieldValue {
    let mut text = String::new();
    let mut hrefs = Vec::new();

    for cell in row.select(&VALUE_SELECTOR) {
        text.extend(cell.text());
        hrefs.extend(
            cell.select(&ANCHOR_SELECTOR)
                .filter_map(|a| a.value().attr("href"))
                .map(str::to_string),
        );
    }

    FieldValue::new(text, hrefs)
}
