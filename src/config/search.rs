// src/config/search.rs
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use reqwest::Url;
use std::env;
use std::fmt::Write as _;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://legacy.utcourts.gov/cal/";
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 366;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 120;
pub const MAX_QUERY_TIMEOUT_SECS: u64 = 3_600;
pub const DEFAULT_DATE_PARAM_FORMAT: &str = "%Y-%m-%d";

pub const ENV_BASE_URL: &str = "COURT_CAL_BASE_URL";
pub const ENV_WINDOW_DAYS: &str = "COURT_CAL_WINDOW_DAYS";
pub const ENV_LOCATIONS: &str = "COURT_CAL_LOCATIONS";
pub const ENV_MAX_CONCURRENCY: &str = "COURT_CAL_MAX_CONCURRENCY";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "COURT_CAL_FETCH_TIMEOUT_SECS";
pub const ENV_QUERY_TIMEOUT_SECS: &str = "COURT_CAL_QUERY_TIMEOUT_SECS";
pub const ENV_DATE_PARAM_FORMAT: &str = "COURT_CAL_DATE_PARAM_FORMAT";
pub const ENV_USER_AGENT: &str = "COURT_CAL_USER_AGENT";

/// Knobs of the search engine and its HTTP source.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base of the remote calendar; always ends with `/`.
    pub base_url: Url,
    /// Days covered by a date filter of "all", starting today. 0 = one unbounded unit.
    pub window_days: u32,
    /// Court codes fanned out for a location filter of "all". Empty = one unbounded unit.
    pub locations: Vec<String>,
    pub max_concurrency: usize,
    pub fetch_timeout: Duration,
    pub query_timeout: Duration,
    /// strftime pattern for the remote `d` parameter.
    pub date_param_format: String,
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url"),
            window_days: DEFAULT_WINDOW_DAYS,
            locations: Vec::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            date_param_format: DEFAULT_DATE_PARAM_FORMAT.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

impl SearchConfig {
    /// Read `COURT_CAL_*` variables; anything missing or invalid keeps its default.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(raw) = read_env(ENV_BASE_URL) {
            match parse_base_url(&raw) {
                Some(url) => cfg.base_url = url,
                None => tracing::warn!(var = ENV_BASE_URL, value = %raw, "invalid base url, using default"),
            }
        }
        if let Some(days) = parse_num::<u32>(ENV_WINDOW_DAYS) {
            cfg.window_days = days.min(MAX_WINDOW_DAYS);
        }
        if let Some(raw) = read_env(ENV_LOCATIONS) {
            cfg.locations = parse_locations(&raw);
        }
        if let Some(n) = parse_num::<usize>(ENV_MAX_CONCURRENCY) {
            cfg.max_concurrency = n.max(1);
        }
        if let Some(secs) = parse_num::<u64>(ENV_FETCH_TIMEOUT_SECS) {
            cfg.fetch_timeout = Duration::from_secs(secs.clamp(1, MAX_FETCH_TIMEOUT_SECS));
        }
        if let Some(secs) = parse_num::<u64>(ENV_QUERY_TIMEOUT_SECS) {
            cfg.query_timeout = Duration::from_secs(secs.clamp(1, MAX_QUERY_TIMEOUT_SECS));
        }
        if let Some(fmt) = read_env(ENV_DATE_PARAM_FORMAT) {
            if is_valid_strftime(&fmt) {
                cfg.date_param_format = fmt;
            } else {
                tracing::warn!(var = ENV_DATE_PARAM_FORMAT, value = %fmt, "invalid date format, using default");
            }
        }
        if let Some(ua) = read_env(ENV_USER_AGENT) {
            cfg.user_agent = ua;
        }

        cfg
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn read_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_num<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = read_env(name)?;
    let parsed = raw.parse::<T>().ok();
    if parsed.is_none() {
        tracing::warn!(var = name, value = %raw, "not a number, using default");
    }
    parsed
}

fn parse_base_url(raw: &str) -> Option<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

fn parse_locations(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if !out.iter().any(|c| c.eq_ignore_ascii_case(code)) {
            out.push(code.to_string());
        }
    }
    out
}

/// Render `day` with a strftime pattern. `None` when the pattern is broken or
/// asks for fields a date does not have (`%H`, `%p`, `%z`, ...).
pub(crate) fn format_day(day: NaiveDate, fmt: &str) -> Option<String> {
    let items: Vec<Item> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|it| matches!(it, Item::Error)) {
        return None;
    }
    let mut out = String::new();
    write!(out, "{}", day.format_with_items(items.iter())).ok()?;
    Some(out)
}

/// chrono panics in `to_string()` on a pattern it cannot render, so try one up front.
pub(crate) fn is_valid_strftime(fmt: &str) -> bool {
    let sample = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap_or_default();
    !fmt.is_empty() && format_day(sample, fmt).is_some()
}
