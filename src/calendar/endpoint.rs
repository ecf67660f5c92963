// src/calendar/endpoint.rs
//! URL construction for the remote calendar: search requests, link resolution
//! and the fallback detail link for rows without a case link.

use chrono::NaiveDate;
use reqwest::Url;

use crate::calendar::types::{AttorneyName, DateScope, FetchUnit, LocationScope};
use crate::config::search::{format_day, is_valid_strftime, DEFAULT_DATE_PARAM_FORMAT};
use crate::config::SearchConfig;

const SEARCH_PAGE: &str = "search.php";

#[derive(Debug, Clone)]
pub struct CalendarEndpoint {
    base: Url,
    search: Url,
    date_format: String,
}

impl CalendarEndpoint {
    pub fn new(base: Url, date_format: impl Into<String>) -> Self {
        let search = base.join(SEARCH_PAGE).unwrap_or_else(|_| base.clone());
        let mut date_format = date_format.into();
        if !is_valid_strftime(&date_format) {
            tracing::warn!(target: "calendar", format = %date_format, "unusable date format, using default");
            date_format = DEFAULT_DATE_PARAM_FORMAT.to_string();
        }
        Self {
            base,
            search,
            date_format,
        }
    }

    pub fn from_config(cfg: &SearchConfig) -> Self {
        Self::new(cfg.base_url.clone(), cfg.date_param_format.clone())
    }

    /// `search.php?t=a&f=FIRST&l=LAST&d=<day|all>&loc=<code|all>`
    pub fn search_url(&self, name: &AttorneyName, unit: &FetchUnit) -> Url {
        let mut url = self.search.clone();
        url.query_pairs_mut()
            .append_pair("t", "a")
            .append_pair("f", &name.first)
            .append_pair("l", &name.last)
            .append_pair("d", &self.date_param(unit.date))
            .append_pair("loc", unit.location.as_param());
        url
    }

    /// Derived case link for rows that carry no `a.caselink`.
    pub fn detail_url(&self, case_number: &str, day: NaiveDate, location: &LocationScope) -> String {
        let mut url = self.search.clone();
        url.query_pairs_mut()
            .append_pair("t", "c")
            .append_pair("c", case_number)
            .append_pair("d", &self.date_param(DateScope::Day(day)))
            .append_pair("loc", location.as_param());
        url.to_string()
    }

    /// Resolve a (possibly relative) href from a listing page. Only http(s) survives.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        self.base
            .join(href)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .map(|u| u.to_string())
    }

    fn date_param(&self, date: DateScope) -> String {
        match date {
            DateScope::All => "all".to_string(),
            DateScope::Day(d) => format_day(d, &self.date_format)
                .unwrap_or_else(|| d.format(DEFAULT_DATE_PARAM_FORMAT).to_string()),
        }
    }
}
