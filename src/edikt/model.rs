use std::collections::HashMap;
use url::Url;

/// What the accessor layer may ask of a field's content.
pub trait FieldContent {
    /// All text inside the field, untrimmed.
    fn text(&self) -> &str;

    /// Raw `href` values of the field's anchors, in document order.
    fn links(&self) -> &[String];
}

/// Owned snapshot of one value cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValue {
    pub text: String,
    pub hrefs: Vec<String>,
}

impl FieldValue {
    pub fn new(text: impl Into<String>, hrefs: Vec<String>) -> Self {
        Self {
            text: text.into(),
            hrefs,
        }
    }
}

impl FieldContent for FieldValue {
    fn text(&self) -> &str {
        &self.text
    }

    fn links(&self) -> &[String] {
        &self.hrefs
    }
}

/// The label -> content record of a single notice.
///
/// `url` is the notice's own "alldoc" address. It identifies the notice across
/// crawls and is the base for relative links inside its fields.
#[derive(Debug, Clone)]
pub struct Edikt {
    url: Url,
    fields: HashMap<String, FieldValue>,
}

impl Edikt {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            fields: HashMap::new(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Store `value` under `label`, replacing an earlier row with the same label.
    pub fn insert(&mut self, label: impl Into<String>, value: FieldValue) {
        self.fields.insert(label.into(), value);
    }

    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.fields.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
