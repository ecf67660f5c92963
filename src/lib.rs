// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod calendar;
pub mod config;
pub mod ics;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::calendar::error::{FetchError, SearchError};
pub use crate::calendar::fetch::{CalendarSource, FetchPayload, HttpCalendarSource};
pub use crate::calendar::types::{HearingRecord, SearchOutcome, SearchRequest, SearchResponse};
pub use crate::calendar::CourtSearch;
pub use crate::config::SearchConfig;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Tracing setup shared by the binaries. `COURT_CAL_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("calendar=info,api=info,court_calendar_search=info,warn"));
    let json = std::env::var("COURT_CAL_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}
