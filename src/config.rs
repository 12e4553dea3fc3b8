//! Run configuration.
//!
//! Values come from built-in defaults, then the optional config file
//! (~/.config/pricewatch/config.toml or --config), then command line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::cli::{DiffArgs, ScrapeArgs};
use crate::error::ConfigError;
use crate::scrape::http::RetryConfig;

/// Laptop listing, in-stock products only.
pub const DEFAULT_URL: &str = "https://www.startech.com.bd/laptop-notebook?filter_status=7";
pub const DEFAULT_CURRENCY: &str = "Taka";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on the page count a listing may claim.
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Which earlier snapshot a fresh scrape is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareTarget {
    None,
    /// Newest snapshot in the snapshot directory older than today.
    Latest,
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub url: Url,
    pub snapshot_dir: PathBuf,
    pub compare: CompareTarget,
    pub write_log: bool,
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub workers: usize,
    pub max_pages: u32,
    pub currency: String,
    pub json_output: bool,
    pub verbose: bool,
}

/// Keys accepted in config.toml. Everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub snapshot_dir: Option<PathBuf>,
    pub timeout: Option<String>,
    pub retries: Option<usize>,
    pub workers: Option<usize>,
    pub max_pages: Option<u32>,
    pub currency: Option<String>,
}

impl FileConfig {
    /// Load `path`, or the platform default location when `path` is None.
    /// A missing default file is not an error; a missing explicit one is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(FileConfig::default()),
            },
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        Self::parse(&text, &path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "pricewatch")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    pub fn for_url(url: Url) -> Self {
        Config {
            url,
            snapshot_dir: PathBuf::from("."),
            compare: CompareTarget::None,
            write_log: false,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            workers: 1,
            max_pages: DEFAULT_MAX_PAGES,
            currency: DEFAULT_CURRENCY.to_string(),
            json_output: false,
            verbose: false,
        }
    }

    pub fn from_file(file: FileConfig) -> Result<Self, ConfigError> {
        let url = parse_url(file.url.as_deref().unwrap_or(DEFAULT_URL))?;
        let mut config = Config::for_url(url);

        if let Some(dir) = file.snapshot_dir {
            config.snapshot_dir = dir;
        }
        if let Some(timeout) = file.timeout.as_deref() {
            config.timeout = parse_timeout(timeout)?;
        }
        if let Some(retries) = file.retries {
            config.retry.max_attempts = retries + 1;
        }
        if let Some(workers) = file.workers {
            config.workers = workers.max(1);
        }
        if let Some(max_pages) = file.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(currency) = file.currency {
            config.currency = currency;
        }

        Ok(config)
    }

    pub fn apply_scrape_args(&mut self, args: &ScrapeArgs) -> Result<(), ConfigError> {
        if let Some(url) = args.url.as_deref() {
            self.url = parse_url(url)?;
        }
        if let Some(dir) = &args.dir {
            self.snapshot_dir = dir.clone();
        }
        if let Some(timeout) = args.timeout.as_deref() {
            self.timeout = parse_timeout(timeout)?;
        }
        if let Some(retries) = args.retries {
            self.retry.max_attempts = retries + 1;
        }
        if let Some(workers) = args.workers {
            self.workers = workers.max(1);
        }
        if let Some(max_pages) = args.max_pages {
            self.max_pages = max_pages;
        }

        self.compare = match (&args.compare, args.compare_latest) {
            (Some(path), _) => CompareTarget::Path(path.clone()),
            (None, true) => CompareTarget::Latest,
            (None, false) => CompareTarget::None,
        };
        self.write_log = args.write_log;
        self.json_output = args.json;
        self.verbose = args.verbose;
        Ok(())
    }

    pub fn apply_diff_args(&mut self, args: &DiffArgs) {
        if let Some(dir) = &args.dir {
            self.snapshot_dir = dir.clone();
        }
        self.write_log = args.write_log;
        self.json_output = args.json;
    }
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::Url { value: value.to_string(), source })
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value)
        .map_err(|source| ConfigError::Timeout { value: value.to_string(), source })
}
