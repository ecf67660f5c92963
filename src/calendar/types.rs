// src/calendar/types.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Output shape of the calendar pipeline, one per real-world hearing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HearingRecord {
    pub time: String, // "2:00 PM"
    pub date: String, // "11/12/2025"
    pub case_number: String,
    pub case_type: String,
    pub court: String,
    pub hearing_type: String,
    pub judge: String,
    pub room: String,
    pub attorney: String,
    pub plaintiff: String,
    pub defendant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webex_url: Option<String>,
    pub detail_url: String,
}

/// Date side of a request or fetch unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateScope {
    All,
    Day(NaiveDate),
}

/// Location side of a request or fetch unit (court code).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocationScope {
    All,
    Court(String),
}

impl LocationScope {
    /// Value sent as the remote `loc` parameter.
    pub fn as_param(&self) -> &str {
        match self {
            LocationScope::All => "all",
            LocationScope::Court(code) => code.as_str(),
        }
    }
}

/// One retrieval against the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchUnit {
    pub date: DateScope,
    pub location: LocationScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Attorney,
}

/// Attorney name as requested, trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttorneyName {
    pub first: String,
    pub last: String,
}

/// Validated search input. Built through `SearchRequest::parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub search_type: SearchType,
    pub name: AttorneyName,
    pub date: DateScope,
    pub location: LocationScope,
}

/// A listing row after extraction, before attorney matching.
///
/// Identity fields are resolved; everything else stays optional until the
/// assembler turns the row into a `HearingRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub case_number: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub case_type: Option<String>,
    pub court: Option<String>,
    pub hearing_type: Option<String>,
    pub judge: Option<String>,
    pub room: Option<String>,
    pub plaintiff: Option<String>,
    pub defendant: Option<String>,
    pub attorneys: Vec<String>,
    pub detail_href: Option<String>,
    pub webex_href: Option<String>,
    pub location: LocationScope,
}

/// A raw entry that passed the attorney test, with the attorney to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedEntry {
    pub entry: RawEntry,
    pub attorney: String,
}

/// Per-run diagnostics, logged by the orchestrator and surfaced as headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    pub units: usize,
    pub empty_units: usize,
    pub failed_units: usize,
    pub matched: usize,
    pub filtered: usize,
    pub duplicates: usize,
    pub timed_out: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub records: Vec<HearingRecord>,
    pub count: usize,
    pub report: SearchReport,
}

/// JSON wire shape of the query service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    pub results: Vec<HearingRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            results: Vec::new(),
            error: Some(message.into()),
        }
    }
}

impl From<SearchOutcome> for SearchResponse {
    fn from(out: SearchOutcome) -> Self {
        Self {
            success: true,
            count: out.count,
            results: out.records,
            error: None,
        }
    }
}
