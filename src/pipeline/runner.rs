//! One sequential pass over the watched searches.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{Instrument, debug, error, info, info_span, warn};
use url::Url;

use crate::config::Config;
use crate::edikt::{Edikt, extract_alldoc_urls, parse_edikt};
use crate::fetcher::{FetchError, PageResponse, fetch};
use crate::geo::Geocoder;
use crate::notify::{Notifier, Report, ReportEntry};
use crate::pipeline::decision::{Decision, decide};
use crate::store::DedupStore;
use crate::text::TextCleaner;

const FETCH_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Counts of how the notices of one run were classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub seen: usize,
    pub invalid: usize,
    pub over_budget: usize,
    pub known: usize,
    pub qualifying: usize,
    /// Notices skipped because their page could not be fetched or did not
    /// have the expected layout.
    pub failed: usize,
}

/// Crawls the configured searches and reports new, affordable notices.
pub struct Watcher {
    search_urls: Vec<Url>,
    max_cost: i64,
    store: DedupStore,
    cleaner: TextCleaner,
    geocoder: Box<dyn Geocoder>,
    notifier: Box<dyn Notifier>,
}

impl Watcher {
    pub fn new(
        config: &Config,
        store: DedupStore,
        geocoder: Box<dyn Geocoder>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            search_urls: config.search_urls().to_vec(),
            max_cost: config.max_cost(),
            store,
            cleaner: TextCleaner::for_edikte(),
            geocoder,
            notifier,
        }
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// Run once. Notices are handled one at a time in the order the searches
    /// list them; qualifying ones go to the notifier as a single report.
    ///
    /// A search page that cannot be fetched aborts the run. A notice page that
    /// cannot be fetched, or whose layout is inconsistent, is skipped without
    /// touching the store. A store failure stops the run after the notices
    /// found so far have been delivered.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let notice_urls = self.collect_notice_urls().await?;
        info!(notices = notice_urls.len(), "crawl finished");

        let mut summary = RunSummary::default();
        let mut entries = Vec::new();
        let mut failure = None;

        for url in notice_urls {
            summary.seen += 1;
            let span = info_span!("notice", url = %url);
            match self
                .process_notice(&url, &mut summary)
                .instrument(span)
                .await
            {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => {
                    error!(url = %url, error = %e, "stopping run");
                    failure = Some(e);
                    break;
                }
            }
        }

        info!(
            seen = summary.seen,
            invalid = summary.invalid,
            over_budget = summary.over_budget,
            known = summary.known,
            qualifying = summary.qualifying,
            failed = summary.failed,
            "run finished"
        );

        // Notices recorded before a failure are known from now on, so they are
        // delivered even when the run ends in an error.
        let report = Report::new(entries);
        let delivery = if report.is_empty() {
            Ok(())
        } else {
            self.notifier
                .notify(&report)
                .await
                .context("failed to deliver report")
        };

        match failure {
            Some(e) => {
                if let Err(lost) = delivery {
                    error!(error = %lost, entries = report.entries.len(), "report lost");
                }
                Err(e)
            }
            None => delivery.map(|()| summary),
        }
    }

    async fn collect_notice_urls(&self) -> Result<Vec<Url>> {
        let mut urls = Vec::new();
        for search in &self.search_urls {
            let page = fetch_with_retry(search.as_str())
                .await
                .with_context(|| format!("failed to fetch search page {search}"))?;
            let found = extract_alldoc_urls(&page.body_utf8, &page.url_requested);
            debug!(search = %search, notices = found.len(), "search page parsed");
            urls.extend(found);
        }
        Ok(urls)
    }

    /// Returns the report entry for a qualifying notice. Only store failures
    /// are propagated.
    async fn process_notice(
        &mut self,
        url: &Url,
        summary: &mut RunSummary,
    ) -> Result<Option<ReportEntry>> {
        let page = match fetch_with_retry(url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "skipping notice, page fetch failed");
                summary.failed += 1;
                return Ok(None);
            }
        };

        // Keyed by the address the search listed, not where redirects ended.
        let edikt = parse_edikt(&page.body_utf8, url.clone());

        let kurzgutachten = match edikt.kurzgutachten_link() {
            Ok(link) => link,
            Err(e) => {
                warn!(error = %e, "skipping notice, unexpected layout");
                summary.failed += 1;
                return Ok(None);
            }
        };

        let decision = decide(&edikt, &mut self.store, self.max_cost)
            .context("failed to record notice")?;
        debug!(?decision, "notice classified");

        let value = match decision {
            Decision::Invalid(_) => {
                summary.invalid += 1;
                return Ok(None);
            }
            Decision::OverBudget { .. } => {
                summary.over_budget += 1;
                return Ok(None);
            }
            Decision::Known => {
                summary.known += 1;
                return Ok(None);
            }
            Decision::Qualifying { value } => value,
        };

        summary.qualifying += 1;
        info!(schaetzwert = value, "new notice");
        Ok(Some(self.report_entry(&edikt, value, kurzgutachten).await))
    }

    async fn report_entry(
        &self,
        edikt: &Edikt,
        value: i64,
        kurzgutachten: Option<Url>,
    ) -> ReportEntry {
        let entfernung_km = match edikt.entfernung(self.geocoder.as_ref()).await {
            Ok(km) => Some(km),
            Err(e) => {
                debug!(error = %e, "distance unknown");
                None
            }
        };

        let kurzgutachten_text = match edikt.kurzgutachten_text(&self.cleaner).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "short appraisal unavailable");
                String::new()
            }
        };

        ReportEntry {
            url: edikt.url().clone(),
            schaetzwert: value,
            objektgroesse: edikt.objektgroesse().value(),
            grundstuecksgroesse: edikt.grundstuecksgroesse().value(),
            plz_ort: edikt.plz_ort(),
            liegenschaftsadresse: edikt.liegenschaftsadresse(),
            entfernung_km,
            kurzgutachten,
            kurzgutachten_text,
            langgutachten: edikt.langgutachten_links(),
        }
    }
}

/// Fetch a page, retrying transient failures a few times.
async fn fetch_with_retry(url: &str) -> Result<PageResponse, FetchError> {
    let mut attempt = 1;
    loop {
        match fetch(url).await {
            Err(e) if e.is_transient() && attempt < FETCH_ATTEMPTS => {
                warn!(url, attempt, error = %e, "fetch failed, retrying");
                sleep(RETRY_DELAY * attempt).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
