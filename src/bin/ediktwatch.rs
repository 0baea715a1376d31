use anyhow::Result;
use edikt_watch::{
    config::{Config, ENV_LOG_FORMAT},
    geo::{Geocoder, NoGeocoder, NominatimGeocoder},
    pipeline::Watcher,
    store::DedupStore,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let store = DedupStore::load(config.store_path())?;
    info!(
        store = %store.path().display(),
        known = store.len(),
        searches = config.search_urls().len(),
        max_cost = config.max_cost(),
        "starting run"
    );

    let geocoder: Box<dyn Geocoder> = if config.geocode() {
        Box::new(NominatimGeocoder::new(
            config.nominatim_url().clone(),
            config.origin(),
        )?)
    } else {
        Box::new(NoGeocoder)
    };
    let notifier = config.report_format().notifier();

    let mut watcher = Watcher::new(&config, store, geocoder, notifier);
    let summary = watcher.run().await?;

    info!(
        qualifying = summary.qualifying,
        known = watcher.store().len(),
        "done"
    );
    Ok(())
}

// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match std::env::var(ENV_LOG_FORMAT).as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
