//! Reports of qualifying notices and where they are delivered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;
use url::Url;

/// One qualifying notice as it appears in a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub url: Url,
    pub schaetzwert: i64,
    pub objektgroesse: Option<i64>,
    pub grundstuecksgroesse: Option<i64>,
    pub plz_ort: String,
    pub liegenschaftsadresse: String,
    pub entfernung_km: Option<u32>,
    pub kurzgutachten: Option<Url>,
    pub kurzgutachten_text: String,
    pub langgutachten: Vec<Url>,
}

/// The batch of new notices found by one run, in crawl order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub created_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new(entries: Vec<ReportEntry>) -> Self {
        Self {
            created_at: Utc::now(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subject(&self) -> String {
        format!(
            "{} neue Edikte ({})",
            self.entries.len(),
            self.created_at.format("%d.%m.%Y")
        )
    }

    pub fn body(&self) -> String {
        let mut body = String::new();
        for entry in &self.entries {
            write_entry(&mut body, entry);
            body.push('\n');
        }
        body
    }
}

fn or_dashes<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v} {unit}"),
        None => "---".to_string(),
    }
}

fn or_dash_text(value: &str) -> &str {
    if value.is_empty() { "---" } else { value }
}

fn write_entry(out: &mut String, entry: &ReportEntry) {
    // writing into a String cannot fail
    let _ = writeln!(out, "Schätzwert:\t{} EUR", entry.schaetzwert);
    let _ = writeln!(out, "Objektgröße:\t{}", or_dashes(entry.objektgroesse, "m²"));
    let _ = writeln!(
        out,
        "Grundstücksgröße:\t{}",
        or_dashes(entry.grundstuecksgroesse, "m²")
    );
    let _ = writeln!(out, "PLZ/Ort:\t{}", or_dash_text(&entry.plz_ort));
    let _ = writeln!(out, "Adresse:\t{}", or_dash_text(&entry.liegenschaftsadresse));
    let _ = writeln!(out, "Entfernung:\t{}", or_dashes(entry.entfernung_km, "km"));
    let _ = writeln!(out, "Edikt:\t{}", entry.url);
    if let Some(link) = &entry.kurzgutachten {
        let _ = writeln!(out, "Kurzgutachten:\t{link}");
    }
    for link in &entry.langgutachten {
        let _ = writeln!(out, "Langgutachten:\t{link}");
    }
    if !entry.kurzgutachten_text.is_empty() {
        let _ = writeln!(out, "\n{}", entry.kurzgutachten_text);
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives the batch of qualifying notices at the end of a run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, report: &Report) -> Result<(), NotifyError>;
}

/// How the report of a run is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Plain text on stdout.
    #[default]
    Text,
    /// Pretty-printed JSON on stdout.
    Json,
    /// One log event per notice, nothing on stdout.
    Log,
}

impl ReportFormat {
    pub fn notifier(self) -> Box<dyn Notifier> {
        match self {
            Self::Text | Self::Json => Box::new(StdoutNotifier::new(self)),
            Self::Log => Box::new(LogNotifier),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown report format '{other}'")),
        }
    }
}

/// Prints the report to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier {
    format: ReportFormat,
}

impl StdoutNotifier {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }
}

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn notify(&self, report: &Report) -> Result<(), NotifyError> {
        let rendered = match self.format {
            ReportFormat::Text => format!("{}\n\n{}", report.subject(), report.body()),
            ReportFormat::Json | ReportFormat::Log => {
                serde_json::to_string_pretty(report)? + "\n"
            }
        };

        let mut stdout = io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Emits every entry as a structured log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, report: &Report) -> Result<(), NotifyError> {
        info!(subject = %report.subject(), "report ready");
        for entry in &report.entries {
            info!(
                url = %entry.url,
                schaetzwert = entry.schaetzwert,
                plz_ort = %entry.plz_ort,
                entfernung_km = ?entry.entfernung_km,
                "new notice"
            );
        }
        Ok(())
    }
}
