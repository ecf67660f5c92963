// src/calendar/request.rs
use chrono::{Days, NaiveDate};

use crate::calendar::error::SearchError;
use crate::calendar::matcher::name_tokens;
use crate::calendar::types::{
    AttorneyName, DateScope, FetchUnit, LocationScope, SearchRequest, SearchType,
};
use crate::config::search::MAX_WINDOW_DAYS;
use crate::config::SearchConfig;

pub const MIN_NAME_LEN: usize = 2;

impl SearchRequest {
    /// Validate raw caller input. This is the only place a search can fail.
    pub fn parse(
        search_type: &str,
        first_name: &str,
        last_name: &str,
        date: &str,
        location: &str,
    ) -> Result<Self, SearchError> {
        let search_type = parse_search_type(search_type)?;
        let first = parse_name("first_name", first_name)?;
        let last = parse_name("last_name", last_name)?;
        let date = parse_date_scope(date)?;
        let location = parse_location_scope(location);

        Ok(Self {
            search_type,
            name: AttorneyName { first, last },
            date,
            location,
        })
    }
}

fn parse_search_type(raw: &str) -> Result<SearchType, SearchError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "attorney" | "a" => Ok(SearchType::Attorney),
        other => Err(SearchError::invalid(format!(
            "unsupported search_type '{other}'"
        ))),
    }
}

fn parse_name(field: &str, raw: &str) -> Result<String, SearchError> {
    let name = raw.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(SearchError::invalid(format!(
            "{field} must be at least {MIN_NAME_LEN} characters"
        )));
    }
    if name_tokens(name).is_empty() {
        return Err(SearchError::invalid(format!("{field} must contain letters")));
    }
    Ok(name.to_uppercase())
}

fn parse_date_scope(raw: &str) -> Result<DateScope, SearchError> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("all") {
        return Ok(DateScope::All);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .map(DateScope::Day)
        .map_err(|_| SearchError::invalid(format!("malformed date '{s}', expected YYYY-MM-DD or 'all'")))
}

fn parse_location_scope(raw: &str) -> LocationScope {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("all") {
        LocationScope::All
    } else {
        LocationScope::Court(s.to_string())
    }
}

/// Turn the request scope into the concrete units to fetch, date-major.
pub fn expand_units(req: &SearchRequest, cfg: &SearchConfig, today: NaiveDate) -> Vec<FetchUnit> {
    let dates: Vec<DateScope> = match req.date {
        DateScope::Day(d) => vec![DateScope::Day(d)],
        DateScope::All if cfg.window_days == 0 => vec![DateScope::All],
        DateScope::All => (0..cfg.window_days.min(MAX_WINDOW_DAYS))
            .filter_map(|i| today.checked_add_days(Days::new(u64::from(i))))
            .map(DateScope::Day)
            .collect(),
    };

    let locations: Vec<LocationScope> = match &req.location {
        LocationScope::Court(code) => vec![LocationScope::Court(code.clone())],
        LocationScope::All if cfg.locations.is_empty() => vec![LocationScope::All],
        LocationScope::All => cfg
            .locations
            .iter()
            .map(|c| LocationScope::Court(c.clone()))
            .collect(),
    };

    let mut units = Vec::with_capacity(dates.len() * locations.len());
    for date in &dates {
        for location in &locations {
            units.push(FetchUnit {
                date: *date,
                location: location.clone(),
            });
        }
    }
    units
}
