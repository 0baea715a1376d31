//! Runtime configuration.
//!
//! Everything comes from environment variables with defaults that watch the
//! two standard portal searches (buildable lots, agricultural/forest land).

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use url::Url;

use crate::geo::nominatim::DEFAULT_ENDPOINT;
use crate::notify::ReportFormat;

pub const ENV_SEARCH_URLS: &str = "EDIKT_SEARCH_URLS";
pub const ENV_STORE_PATH: &str = "EDIKT_STORE_PATH";
pub const ENV_MAX_COST: &str = "EDIKT_MAX_COST";
pub const ENV_ORIGIN: &str = "EDIKT_ORIGIN";
pub const ENV_GEOCODE: &str = "EDIKT_GEOCODE";
pub const ENV_NOMINATIM_URL: &str = "EDIKT_NOMINATIM_URL";
pub const ENV_REPORT_FORMAT: &str = "EDIKT_REPORT_FORMAT";
/// Read by the binary before the config exists; `json` switches log output
/// to JSON lines.
pub const ENV_LOG_FORMAT: &str = "EDIKT_LOG_FORMAT";

const BUILDABLE_LOT_SEARCH: &str = "https://edikte.justiz.gv.at/edikte/ex/exedi3.nsf/suchedi?SearchView&subf=eex&SearchOrder=4&SearchMax=4999&retfields=~VKat=UL&ftquery=&query=%28%5BVKat%5D%3D%28UL%29%29";
const AGRI_FOREST_LAND_SEARCH: &str = "https://edikte.justiz.gv.at/edikte/ex/exedi3.nsf/suchedi?SearchView&subf=eex&SearchOrder=4&SearchMax=4999&retfields=~VKat=LF&ftquery=&query=%28%5BVKat%5D%3D%28LF%29%29";
const DEFAULT_STORE_PATH: &str = "db.dat";
const DEFAULT_MAX_COST: i64 = 30_000;
const DEFAULT_ORIGIN: &str = "4020 Linz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    search_urls: Vec<Url>,
    store_path: PathBuf,
    max_cost: i64,
    origin: String,
    geocode: bool,
    nominatim_url: Url,
    report_format: ReportFormat,
}

impl Config {
    /// Explicit config with default origin, geocoding on and text reports.
    pub fn new(search_urls: Vec<Url>, store_path: impl Into<PathBuf>, max_cost: i64) -> Self {
        Self {
            search_urls,
            store_path: store_path.into(),
            max_cost,
            origin: DEFAULT_ORIGIN.to_string(),
            geocode: true,
            nominatim_url: default_url(DEFAULT_ENDPOINT),
            report_format: ReportFormat::Text,
        }
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let search_urls = match env::var(ENV_SEARCH_URLS) {
            Ok(raw) => parse_url_list(&raw)?,
            Err(_) => vec![
                default_url(BUILDABLE_LOT_SEARCH),
                default_url(AGRI_FOREST_LAND_SEARCH),
            ],
        };
        let store_path = env::var(ENV_STORE_PATH).unwrap_or_else(|_| DEFAULT_STORE_PATH.into());
        let max_cost = match env::var(ENV_MAX_COST) {
            Ok(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::InvalidValue {
                field: ENV_MAX_COST,
                reason: format!("{e}"),
            })?,
            Err(_) => DEFAULT_MAX_COST,
        };
        let origin = env::var(ENV_ORIGIN).unwrap_or_else(|_| DEFAULT_ORIGIN.into());
        let geocode = match env::var(ENV_GEOCODE) {
            Ok(raw) => parse_bool(ENV_GEOCODE, &raw)?,
            Err(_) => true,
        };
        let nominatim_url = match env::var(ENV_NOMINATIM_URL) {
            Ok(raw) => Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
                field: ENV_NOMINATIM_URL,
                reason: e.to_string(),
            })?,
            Err(_) => default_url(DEFAULT_ENDPOINT),
        };
        let report_format = match env::var(ENV_REPORT_FORMAT) {
            Ok(raw) => raw
                .parse::<ReportFormat>()
                .map_err(|reason| ConfigError::InvalidValue {
                    field: ENV_REPORT_FORMAT,
                    reason,
                })?,
            Err(_) => ReportFormat::Text,
        };

        Ok(Self {
            search_urls,
            store_path: store_path.into(),
            max_cost,
            origin,
            geocode,
            nominatim_url,
            report_format,
        })
    }

    /// Search result pages whose notices are watched, in crawl order.
    pub fn search_urls(&self) -> &[Url] {
        &self.search_urls
    }
    /// File backing the dedup store.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
    /// Appraised values above this many EUR are skipped.
    pub fn max_cost(&self) -> i64 {
        self.max_cost
    }
    /// Reference location for distances.
    pub fn origin(&self) -> &str {
        &self.origin
    }
    pub fn geocode(&self) -> bool {
        self.geocode
    }
    pub fn nominatim_url(&self) -> &Url {
        &self.nominatim_url
    }
    pub fn report_format(&self) -> ReportFormat {
        self.report_format
    }
}

// The built-in defaults are valid URLs.
fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("built-in URL is valid")
}

fn parse_url_list(raw: &str) -> Result<Vec<Url>, ConfigError> {
    let urls = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Url::parse(s).map_err(|e| ConfigError::InvalidValue {
                field: ENV_SEARCH_URLS,
                reason: format!("{s}: {e}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if urls.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: ENV_SEARCH_URLS,
            reason: "no search url given".into(),
        });
    }
    Ok(urls)
}

fn parse_bool(field: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field,
            reason: format!("'{other}' is not a boolean"),
        }),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            ENV_SEARCH_URLS,
            ENV_STORE_PATH,
            ENV_MAX_COST,
            ENV_ORIGIN,
            ENV_GEOCODE,
            ENV_NOMINATIM_URL,
            ENV_REPORT_FORMAT,
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.search_urls().len(), 2);
        assert!(cfg.search_urls()[0].as_str().contains("VKat=UL"));
        assert_eq!(cfg.store_path(), Path::new("db.dat"));
        assert_eq!(cfg.max_cost(), 30_000);
        assert_eq!(cfg.origin(), "4020 Linz");
        assert!(cfg.geocode());
        assert_eq!(cfg.report_format(), ReportFormat::Text);
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(
                ENV_SEARCH_URLS,
                "https://a.example.test/search, https://b.example.test/search",
            );
            env::set_var(ENV_STORE_PATH, "/var/lib/edikt/db.dat");
            env::set_var(ENV_MAX_COST, "45000");
            env::set_var(ENV_ORIGIN, "8010 Graz");
            env::set_var(ENV_GEOCODE, "off");
            env::set_var(ENV_REPORT_FORMAT, "log");
        }
        let cfg = Config::from_env().unwrap();
        clear_env();

        let urls: Vec<&str> = cfg.search_urls().iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec!["https://a.example.test/search", "https://b.example.test/search"]
        );
        assert_eq!(cfg.store_path(), Path::new("/var/lib/edikt/db.dat"));
        assert_eq!(cfg.max_cost(), 45_000);
        assert_eq!(cfg.origin(), "8010 Graz");
        assert!(!cfg.geocode());
        assert_eq!(cfg.report_format(), ReportFormat::Log);
    }

    #[test]
    fn rejects_invalid_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();

        unsafe { env::set_var(ENV_MAX_COST, "30k") };
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_COST));
        clear_env();

        unsafe { env::set_var(ENV_GEOCODE, "maybe") };
        assert!(Config::from_env().is_err());
        clear_env();

        unsafe { env::set_var(ENV_SEARCH_URLS, " , ") };
        assert!(Config::from_env().is_err());
        clear_env();
    }
}
