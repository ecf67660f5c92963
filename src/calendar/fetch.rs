// src/calendar/fetch.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};

use crate::calendar::endpoint::CalendarEndpoint;
use crate::calendar::error::FetchError;
use crate::calendar::parser::parse_listing;
use crate::calendar::types::{AttorneyName, FetchUnit, RawEntry};
use crate::config::SearchConfig;

/// What one unit's request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPayload {
    Page(String),
    /// A valid day with nothing scheduled.
    Empty,
}

/// Fetch capability consumed by the search engine.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn fetch(&self, name: &AttorneyName, unit: &FetchUnit) -> Result<FetchPayload, FetchError>;
    fn name(&self) -> &'static str;
}

/// Tagged per-unit result merged by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Entries(Vec<RawEntry>),
    Empty,
    Failed(FetchError),
}

pub struct HttpCalendarSource {
    client: Client,
    endpoint: CalendarEndpoint,
}

impl HttpCalendarSource {
    pub fn new(endpoint: CalendarEndpoint, client: Client) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(cfg: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.fetch_timeout)
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("building calendar http client")?;
        Ok(Self::new(CalendarEndpoint::from_config(cfg), client))
    }
}

#[async_trait]
impl CalendarSource for HttpCalendarSource {
    async fn fetch(&self, name: &AttorneyName, unit: &FetchUnit) -> Result<FetchPayload, FetchError> {
        let url = self.endpoint.search_url(name, unit);
        tracing::debug!(target: "calendar", %url, "fetching calendar page");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(FetchPayload::Empty);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(FetchPayload::Empty);
        }
        Ok(FetchPayload::Page(body))
    }

    fn name(&self) -> &'static str {
        "utcourts-legacy"
    }
}

/// One attempt, plus one immediate retry on a transient failure.
pub async fn fetch_with_retry(
    source: &dyn CalendarSource,
    name: &AttorneyName,
    unit: &FetchUnit,
) -> Result<FetchPayload, FetchError> {
    match source.fetch(name, unit).await {
        Err(e) if e.is_transient() => {
            tracing::debug!(target: "calendar", error = %e, unit = ?unit, "transient fetch failure, retrying once");
            counter!("calendar_fetch_retries_total").increment(1);
            source.fetch(name, unit).await
        }
        other => other,
    }
}

/// Fetch and parse one unit. Never fails; failures become `UnitOutcome::Failed`.
pub async fn run_unit(source: &dyn CalendarSource, name: &AttorneyName, unit: &FetchUnit) -> UnitOutcome {
    counter!("calendar_units_total").increment(1);
    match fetch_with_retry(source, name, unit).await {
        Ok(FetchPayload::Page(html)) => {
            let entries = parse_listing(&html, unit);
            if entries.is_empty() {
                UnitOutcome::Empty
            } else {
                UnitOutcome::Entries(entries)
            }
        }
        Ok(FetchPayload::Empty) => UnitOutcome::Empty,
        Err(e) => {
            tracing::warn!(target: "calendar", error = %e, provider = source.name(), unit = ?unit, "fetch unit failed");
            counter!("calendar_unit_failures_total").increment(1);
            UnitOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::types::{DateScope, LocationScope};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Scripted {
        calls: AtomicUsize,
        replies: Mutex<Vec<Result<FetchPayload, FetchError>>>,
    }

    impl Scripted {
        fn new(mut replies: Vec<Result<FetchPayload, FetchError>>) -> Self {
            replies.reverse();
            Self {
                calls: AtomicUsize::new(0),
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl CalendarSource for Scripted {
        async fn fetch(&self, _: &AttorneyName, _: &FetchUnit) -> Result<FetchPayload, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FetchError::Transport("script exhausted".into())))
        }
        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn name() -> AttorneyName {
        AttorneyName {
            first: "CHRIS".into(),
            last: "DEXTER".into(),
        }
    }

    fn unit() -> FetchUnit {
        FetchUnit {
            date: DateScope::All,
            location: LocationScope::All,
        }
    }

    #[tokio::test]
    async fn transient_failure_is_retried_once() {
        let src = Scripted::new(vec![Err(FetchError::Timeout), Ok(FetchPayload::Empty)]);
        let got = fetch_with_retry(&src, &name(), &unit()).await;
        assert_eq!(got, Ok(FetchPayload::Empty));
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_second_retry() {
        let src = Scripted::new(vec![
            Err(FetchError::Status(503)),
            Err(FetchError::Status(503)),
            Ok(FetchPayload::Empty),
        ]);
        let got = run_unit(&src, &name(), &unit()).await;
        assert_eq!(got, UnitOutcome::Failed(FetchError::Status(503)));
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_failure_and_empty_are_not_retried() {
        let src = Scripted::new(vec![Err(FetchError::Status(404))]);
        let got = run_unit(&src, &name(), &unit()).await;
        assert_eq!(got, UnitOutcome::Failed(FetchError::Status(404)));
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);

        let src = Scripted::new(vec![Ok(FetchPayload::Empty)]);
        assert_eq!(run_unit(&src, &name(), &unit()).await, UnitOutcome::Empty);
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn page_without_rows_is_empty() {
        let src = Scripted::new(vec![Ok(FetchPayload::Page("<p>No results</p>".into()))]);
        assert_eq!(run_unit(&src, &name(), &unit()).await, UnitOutcome::Empty);
    }
}
