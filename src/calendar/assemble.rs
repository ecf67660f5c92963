// src/calendar/assemble.rs
use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};

use crate::calendar::endpoint::CalendarEndpoint;
use crate::calendar::parser::{format_date, format_time};
use crate::calendar::types::{
    DateScope, HearingRecord, LocationScope, MatchedEntry, SearchRequest,
};

/// Filter, dedup, order and render matched entries.
/// Returns (records, filtered_count, duplicate_count).
pub fn assemble(
    matched: Vec<MatchedEntry>,
    req: &SearchRequest,
    endpoint: &CalendarEndpoint,
) -> (Vec<HearingRecord>, usize, usize) {
    let mut filtered_out = 0usize;
    let mut kept = Vec::with_capacity(matched.len());
    for m in matched {
        if in_scope(&m, req) {
            kept.push(m);
        } else {
            filtered_out += 1;
        }
    }

    // First occurrence wins; input arrives in unit order.
    let mut seen: HashSet<(String, NaiveDate, NaiveTime)> = HashSet::new();
    let mut unique = Vec::with_capacity(kept.len());
    let mut dup_out = 0usize;
    for m in kept {
        let key = (m.entry.case_number.clone(), m.entry.date, m.entry.time);
        if !seen.insert(key) {
            dup_out += 1;
            continue;
        }
        unique.push(m);
    }

    // Stable: equal keys keep arrival order.
    unique.sort_by_key(|m| (m.entry.date, m.entry.time));

    let records = unique
        .into_iter()
        .map(|m| to_record(m, endpoint))
        .collect();
    (records, filtered_out, dup_out)
}

fn in_scope(m: &MatchedEntry, req: &SearchRequest) -> bool {
    let date_ok = match req.date {
        DateScope::All => true,
        DateScope::Day(d) => m.entry.date == d,
    };
    let location_ok = match (&req.location, &m.entry.location) {
        (LocationScope::All, _) | (_, LocationScope::All) => true,
        (LocationScope::Court(want), LocationScope::Court(got)) => want.eq_ignore_ascii_case(got),
    };
    date_ok && location_ok
}

fn to_record(m: MatchedEntry, endpoint: &CalendarEndpoint) -> HearingRecord {
    let e = m.entry;
    let detail_url = e
        .detail_href
        .as_deref()
        .and_then(|h| endpoint.resolve(h))
        .unwrap_or_else(|| endpoint.detail_url(&e.case_number, e.date, &e.location));
    let webex_url = e.webex_href.as_deref().and_then(|h| endpoint.resolve(h));

    HearingRecord {
        time: format_time(e.time),
        date: format_date(e.date),
        case_number: e.case_number,
        case_type: e.case_type.unwrap_or_default(),
        court: e.court.unwrap_or_default(),
        hearing_type: e.hearing_type.unwrap_or_default(),
        judge: e.judge.unwrap_or_default(),
        room: e.room.unwrap_or_default(),
        attorney: m.attorney,
        plaintiff: e.plaintiff.unwrap_or_default(),
        defendant: e.defendant.unwrap_or_default(),
        webex_url,
        detail_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::types::RawEntry;
    use reqwest::Url;

    fn endpoint() -> CalendarEndpoint {
        CalendarEndpoint::new(Url::parse("https://legacy.utcourts.gov/cal/").unwrap(), "%Y-%m-%d")
    }

    fn req(date: &str, location: &str) -> SearchRequest {
        SearchRequest::parse("attorney", "CHRIS", "DEXTER", date, location).unwrap()
    }

    fn m(case: &str, day: u32, hour: u32, court: Option<&str>) -> MatchedEntry {
        MatchedEntry {
            entry: RawEntry {
                case_number: case.into(),
                date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
                time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                case_type: None,
                court: Some(format!("court-{case}")),
                hearing_type: None,
                judge: None,
                room: None,
                plaintiff: None,
                defendant: None,
                attorneys: vec!["CHRIS DEXTER".into()],
                detail_href: None,
                webex_href: None,
                location: court.map_or(LocationScope::All, |c| LocationScope::Court(c.into())),
            },
            attorney: "CHRIS DEXTER".into(),
        }
    }

    #[test]
    fn dedup_first_wins_and_sorts() {
        let mut dup = m("A", 12, 9, None);
        dup.entry.court = Some("second copy".into());
        let input = vec![
            m("B", 13, 9, None),
            m("A", 12, 14, None),
            m("A", 12, 9, None),
            dup,
            m("C", 12, 9, None),
        ];
        let (out, filtered, dups) = assemble(input, &req("all", "all"), &endpoint());
        assert_eq!(filtered, 0);
        assert_eq!(dups, 1);
        let keys: Vec<(&str, &str, &str)> = out
            .iter()
            .map(|r| (r.case_number.as_str(), r.date.as_str(), r.time.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A", "11/12/2025", "9:00 AM"),
                ("C", "11/12/2025", "9:00 AM"),
                ("A", "11/12/2025", "2:00 PM"),
                ("B", "11/13/2025", "9:00 AM"),
            ]
        );
        assert_eq!(out[0].court, "court-A", "first occurrence kept");
    }

    #[test]
    fn same_case_on_different_days_survives() {
        let input = vec![m("A", 12, 9, None), m("A", 19, 9, None)];
        let (out, _, dups) = assemble(input, &req("all", "all"), &endpoint());
        assert_eq!(out.len(), 2);
        assert_eq!(dups, 0);
    }

    #[test]
    fn assembling_twice_is_stable() {
        let input = vec![
            m("B", 13, 9, None),
            m("A", 12, 9, None),
            m("A", 12, 9, None),
        ];
        let (once, _, _) = assemble(input.clone(), &req("all", "all"), &endpoint());
        let (twice, _, _) = assemble(input, &req("all", "all"), &endpoint());
        assert_eq!(once, twice);
    }

    #[test]
    fn date_and_location_filters() {
        let input = vec![
            m("A", 12, 9, Some("1868")),
            m("B", 13, 9, Some("1868")),
            m("C", 12, 9, Some("1869")),
            m("D", 12, 9, None),
        ];
        let (out, filtered, _) = assemble(input, &req("2025-11-12", "1868"), &endpoint());
        let cases: Vec<&str> = out.iter().map(|r| r.case_number.as_str()).collect();
        assert_eq!(cases, vec!["A", "D"]);
        assert_eq!(filtered, 2);
    }

    #[test]
    fn derived_urls() {
        let mut linked = m("A", 12, 9, None);
        linked.entry.detail_href = Some("d.php?c=A".into());
        linked.entry.webex_href = Some("https://utcourts.webex.com/meet/x".into());
        let bare = m("B", 12, 10, Some("1868"));

        let (out, _, _) = assemble(vec![linked, bare], &req("all", "all"), &endpoint());
        assert_eq!(out[0].detail_url, "https://legacy.utcourts.gov/cal/d.php?c=A");
        assert_eq!(
            out[0].webex_url.as_deref(),
            Some("https://utcourts.webex.com/meet/x")
        );
        assert_eq!(
            out[1].detail_url,
            "https://legacy.utcourts.gov/cal/search.php?t=c&c=B&d=2025-11-12&loc=1868"
        );
        assert_eq!(out[1].webex_url, None);
        assert_eq!(out[1].judge, "");
    }
}
