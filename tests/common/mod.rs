// tests/common/mod.rs
//
// Shared helpers: a scripted CalendarSource and a listing-page builder that
// emits the same markup as the remote calendar.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use court_calendar_search::calendar::types::{AttorneyName, DateScope, FetchUnit};
use court_calendar_search::{CalendarSource, FetchError, FetchPayload};

#[derive(Clone)]
pub enum Reply {
    Page(String),
    Empty,
    Fail(FetchError),
    Slow(Duration, String),
}

/// Replies keyed by unit date; anything unscripted gets `fallback`.
pub struct MockSource {
    by_day: HashMap<NaiveDate, Reply>,
    fallback: Reply,
    calls: Mutex<HashMap<DateScope, usize>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockSource {
    pub fn new(fallback: Reply) -> Self {
        Self {
            by_day: HashMap::new(),
            fallback,
            calls: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn on(mut self, day: NaiveDate, reply: Reply) -> Self {
        self.by_day.insert(day, reply);
        self
    }

    pub fn calls_for(&self, date: DateScope) -> usize {
        self.calls.lock().unwrap().get(&date).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Most fetches ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarSource for MockSource {
    async fn fetch(&self, _name: &AttorneyName, unit: &FetchUnit) -> Result<FetchPayload, FetchError> {
        *self.calls.lock().unwrap().entry(unit.date).or_insert(0) += 1;
        let reply = match unit.date {
            DateScope::Day(d) => self.by_day.get(&d).unwrap_or(&self.fallback),
            DateScope::All => &self.fallback,
        }
        .clone();
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let out = match reply {
            Reply::Page(html) => Ok(FetchPayload::Page(html)),
            Reply::Empty => Ok(FetchPayload::Empty),
            Reply::Fail(e) => Err(e),
            Reply::Slow(wait, html) => {
                tokio::time::sleep(wait).await;
                Ok(FetchPayload::Page(html))
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        out
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One listing row as the remote renders it.
pub struct Hearing<'a> {
    pub case: &'a str,
    pub date: &'a str,
    pub time: &'a str,
    pub attorneys: &'a [&'a str],
    pub judge: Option<&'a str>,
}

impl<'a> Hearing<'a> {
    pub fn new(case: &'a str, date: &'a str, time: &'a str, attorneys: &'a [&'a str]) -> Self {
        Self {
            case,
            date,
            time,
            attorneys,
            judge: Some("LAURA SCOTT"),
        }
    }
}

pub fn page(hearings: &[Hearing]) -> String {
    let mut html = String::from("<html><body>\n");
    for h in hearings {
        html.push_str(&format!(
            r#"<div class="row">
  <div class="col-xs-8"><strong>{time}</strong> <em class="little"><strong>Review Hearing</strong></em></div>
  <div class="col-xs-4"><strong>{date}</strong></div>
</div>
<div class="casehover">
  <div class="row"><div class="col-xs-12"><a class="caselink" href="d.php?c={case}">WEST JORDAN - District</a> <em>District Court</em></div></div>
  <div class="row">
    <div class="col-xs-12 col-sm-4">STATE OF UTAH<br>vs.<br>DEFENDANT {case}</div>
    <div class="col-xs-12 col-sm-4"><div class="case">Case # {case}<br>State Felony</div></div>
  </div>
"#,
            time = h.time,
            date = h.date,
            case = h.case,
        ));
        match h.judge {
            Some(judge) => html.push_str(&format!(
                "  <div class=\"row\"><div class=\"col-xs-12 col-sm-6\">{judge}<br>Room 31<br>Review</div></div>\n"
            )),
            None => html.push_str(
                "  <div class=\"row\"><div class=\"col-xs-12 col-sm-6\">Room 31<br>Review</div></div>\n",
            ),
        }
        for a in h.attorneys {
            html.push_str(&format!("  <div class=\"bottomline\">Attorney: {a}</div>\n"));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</body></html>\n");
    html
}
