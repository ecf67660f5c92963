// tests/parser_fixture.rs
//
// Listing parser against a saved results page, then the same page through
// the whole search pipeline.

mod common;

use std::sync::Arc;

use chrono::NaiveTime;
use common::{day, MockSource, Reply};
use court_calendar_search::calendar::parser::parse_listing;
use court_calendar_search::calendar::types::{DateScope, FetchUnit, LocationScope};
use court_calendar_search::{CourtSearch, SearchConfig, SearchRequest};

const FIXTURE: &str = include_str!("fixtures/calendar_page.html");

fn unit() -> FetchUnit {
    FetchUnit {
        date: DateScope::Day(day(2025, 11, 12)),
        location: LocationScope::Court("1868".into()),
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn fixture_rows_are_extracted_and_broken_ones_skipped() {
    let entries = parse_listing(FIXTURE, &unit());
    let cases: Vec<&str> = entries.iter().map(|e| e.case_number.as_str()).collect();
    // No case number, and an unreadable "TBD" time, are both dropped.
    assert_eq!(cases, vec!["251901234", "255400888", "251905555"]);

    let first = &entries[0];
    assert_eq!(first.date, day(2025, 11, 12));
    assert_eq!(first.time, hm(8, 30));
    assert_eq!(first.hearing_type.as_deref(), Some("Video Conference"));
    assert_eq!(first.court.as_deref(), Some("WEST JORDAN - District"));
    assert_eq!(first.judge.as_deref(), Some("LAURA SCOTT"));
    assert_eq!(first.room.as_deref(), Some("Room 31"));
    assert_eq!(first.plaintiff.as_deref(), Some("STATE OF UTAH"));
    assert_eq!(first.defendant.as_deref(), Some("MARCUS WELLS"));
    assert_eq!(first.attorneys, vec!["CHRIS DEXTER".to_string()]);
    assert_eq!(
        first.webex_href.as_deref(),
        Some("https://utcourts.webex.com/meet/lscott")
    );

    let second = &entries[1];
    assert_eq!(second.time, hm(8, 30), "shares the preceding header");
    assert_eq!(second.judge, None);
    assert_eq!(second.room.as_deref(), Some("Room 2"));
    assert_eq!(second.plaintiff.as_deref(), Some("WEST JORDAN CITY"));
    assert_eq!(second.defendant.as_deref(), Some("ANNA PRICE"));
    assert_eq!(
        second.attorneys,
        vec!["JANE SMITH".to_string(), "DEXTER, CHRIS".to_string()]
    );

    let third = &entries[2];
    assert_eq!(third.time, hm(13, 30));
    assert_eq!(third.hearing_type.as_deref(), Some("In Person"));
    assert_eq!(third.judge, None, "missing judge keeps the row");
    assert_eq!(third.court, None);
    assert_eq!(third.detail_href, None);
}

#[test]
fn garbage_page_yields_nothing() {
    assert!(parse_listing("<html><body><p>No results</p></body></html>", &unit()).is_empty());
    assert!(parse_listing("", &unit()).is_empty());
}

#[tokio::test]
async fn fixture_through_the_pipeline() {
    let search = CourtSearch::new(
        Arc::new(MockSource::new(Reply::Page(FIXTURE.to_string()))),
        SearchConfig::default(),
    );
    let req = SearchRequest::parse("attorney", "chris", "dexter", "2025-11-12", "1868").unwrap();
    let out = search.run_from(&req, day(2025, 11, 12)).await;

    assert_eq!(out.count, 3);
    let r = &out.records[0];
    assert_eq!(r.time, "8:30 AM");
    assert_eq!(r.date, "11/12/2025");
    assert_eq!(
        r.detail_url,
        "https://legacy.utcourts.gov/cal/search.php?t=c&c=251901234&d=2025-11-12&loc=1868"
    );
    assert_eq!(
        r.webex_url.as_deref(),
        Some("https://utcourts.webex.com/meet/lscott")
    );

    assert_eq!(out.records[1].attorney, "DEXTER, CHRIS");
    assert_eq!(out.records[1].judge, "");

    // No caselink: the detail link is derived from case, day and court.
    let derived = &out.records[2];
    assert_eq!(derived.case_number, "251905555");
    assert_eq!(derived.time, "1:30 PM");
    assert_eq!(
        derived.detail_url,
        "https://legacy.utcourts.gov/cal/search.php?t=c&c=251905555&d=2025-11-12&loc=1868"
    );
}
