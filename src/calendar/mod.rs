// src/calendar/mod.rs
//! Attorney hearing search over the remote court calendar.
//!
//! Pipeline per query: validate → expand fetch units → fetch + parse each unit
//! concurrently → match attorney → assemble (filter, dedup, order, URLs).
//! A failed or slow unit only costs its own rows.

pub mod assemble;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod matcher;
pub mod parser;
pub mod request;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::calendar::assemble::assemble;
use crate::calendar::endpoint::CalendarEndpoint;
use crate::calendar::error::SearchError;
use crate::calendar::fetch::{run_unit, CalendarSource, UnitOutcome};
use crate::calendar::matcher::match_entries;
use crate::calendar::request::expand_units;
use crate::calendar::types::{FetchUnit, SearchOutcome, SearchReport, SearchRequest};
use crate::config::search::MAX_QUERY_TIMEOUT_SECS;
use crate::config::SearchConfig;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("calendar_units_total", "Fetch units attempted.");
        describe_counter!(
            "calendar_unit_failures_total",
            "Fetch units that failed after the retry."
        );
        describe_counter!(
            "calendar_fetch_retries_total",
            "Immediate retries after a transient fetch failure."
        );
        describe_counter!(
            "calendar_malformed_entries_total",
            "Listing rows skipped by the parser."
        );
        describe_counter!(
            "calendar_matched_entries_total",
            "Rows that passed the attorney test."
        );
        describe_counter!(
            "calendar_duplicates_total",
            "Rows dropped as duplicate (case, date, time)."
        );
        describe_histogram!("calendar_parse_ms", "Listing parse time in milliseconds.");
        describe_histogram!("calendar_search_ms", "Whole query time in milliseconds.");
    });
}

/// The search engine. Cheap to share behind an `Arc`; holds no per-query state.
pub struct CourtSearch {
    source: Arc<dyn CalendarSource>,
    endpoint: CalendarEndpoint,
    cfg: SearchConfig,
}

impl CourtSearch {
    pub fn new(source: Arc<dyn CalendarSource>, cfg: SearchConfig) -> Self {
        Self {
            source,
            endpoint: CalendarEndpoint::from_config(&cfg),
            cfg,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.cfg
    }

    /// Validate raw input and run the query. Only invalid input is an error.
    pub async fn search(
        &self,
        search_type: &str,
        first_name: &str,
        last_name: &str,
        date: &str,
        location: &str,
    ) -> Result<SearchOutcome, SearchError> {
        let req = SearchRequest::parse(search_type, first_name, last_name, date, location)?;
        Ok(self.run(&req).await)
    }

    pub async fn run(&self, req: &SearchRequest) -> SearchOutcome {
        let today = chrono::Local::now().date_naive();
        self.run_from(req, today).await
    }

    /// Like `run`, with the first day of the "all dates" window given explicitly.
    pub async fn run_from(&self, req: &SearchRequest, today: NaiveDate) -> SearchOutcome {
        ensure_metrics_described();
        let t0 = std::time::Instant::now();

        let units = expand_units(req, &self.cfg, today);
        let mut report = SearchReport {
            units: units.len(),
            ..SearchReport::default()
        };

        let (outcomes, timed_out) = self.collect_units(req, units).await;
        report.timed_out = timed_out;
        // Aborted or cut off by the deadline.
        report.failed_units = report.units.saturating_sub(outcomes.len());

        let mut matched = Vec::new();
        for (_, outcome) in outcomes {
            match outcome {
                UnitOutcome::Entries(entries) => matched.extend(match_entries(entries, &req.name)),
                UnitOutcome::Empty => report.empty_units += 1,
                UnitOutcome::Failed(_) => report.failed_units += 1,
            }
        }
        report.matched = matched.len();

        let (records, filtered, duplicates) = assemble(matched, req, &self.endpoint);
        report.filtered = filtered;
        report.duplicates = duplicates;

        counter!("calendar_matched_entries_total").increment(report.matched as u64);
        counter!("calendar_duplicates_total").increment(duplicates as u64);
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("calendar_search_ms").record(ms);

        tracing::info!(
            target: "calendar",
            first = %req.name.first,
            last = %req.name.last,
            units = report.units,
            empty = report.empty_units,
            failed = report.failed_units,
            matched = report.matched,
            duplicates = report.duplicates,
            timed_out = report.timed_out,
            count = records.len(),
            "attorney search finished"
        );

        SearchOutcome {
            count: records.len(),
            records,
            report,
        }
    }

    /// Drive all units through fetch+parse with bounded concurrency.
    /// Returns outcomes in unit order and whether the query deadline fired.
    async fn collect_units(
        &self,
        req: &SearchRequest,
        units: Vec<FetchUnit>,
    ) -> (Vec<(usize, UnitOutcome)>, bool) {
        let now = tokio::time::Instant::now();
        let deadline = now
            .checked_add(self.cfg.query_timeout)
            .unwrap_or_else(|| now + Duration::from_secs(MAX_QUERY_TIMEOUT_SECS));
        let permits = Arc::new(Semaphore::new(self.cfg.max_concurrency.max(1)));
        let name = Arc::new(req.name.clone());

        let mut set = JoinSet::new();
        for (idx, unit) in units.into_iter().enumerate() {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&permits);
            let name = Arc::clone(&name);
            set.spawn(async move {
                // The semaphore is never closed; a missing permit only means no throttling.
                let _permit = permits.acquire_owned().await.ok();
                let outcome = run_unit(source.as_ref(), &name, &unit).await;
                (idx, outcome)
            });
        }

        let mut done = Vec::with_capacity(set.len());
        let mut timed_out = false;
        loop {
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok(pair))) => done.push(pair),
                Ok(Some(Err(e))) => {
                    tracing::warn!(target: "calendar", error = %e, "fetch task aborted");
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    tracing::warn!(
                        target: "calendar",
                        completed = done.len(),
                        pending = set.len(),
                        "query timeout, returning partial results"
                    );
                    set.abort_all();
                    break;
                }
            }
        }

        done.sort_by_key(|(idx, _)| *idx);
        (done, timed_out)
    }
}
