//! iCalendar export of hearing records.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::calendar::types::HearingRecord;

const PRODID: &str = "-//Court Calendar Search//Court Hearing//EN";
const UID_DOMAIN: &str = "court-calendar-search";
const MAX_FILE_STEM: usize = 100;
const FOLD_OCTETS: usize = 75;

/// Start of the hearing from its normalized `MM/DD/YYYY` date and `H:MM AM` time.
pub fn hearing_start(record: &HearingRecord) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(&record.date, "%m/%d/%Y").ok()?;
    let time = NaiveTime::parse_from_str(&record.time, "%I:%M %p").ok()?;
    Some(date.and_time(time))
}

fn ics_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// RFC 5545 TEXT escaping.
pub fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

/// Fold a content line at 75 octets; continuation lines start with one space.
fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_OCTETS {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + 3 * (line.len() / FOLD_OCTETS + 1));
    let mut width = 0;
    for ch in line.chars() {
        let n = ch.len_utf8();
        if width + n > FOLD_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += n;
    }
    out
}

fn first_word(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

fn summary(r: &HearingRecord) -> String {
    let defendant = first_word(&r.defendant).unwrap_or("N/A");
    let mode = if r.webex_url.is_some() { "VIRTUAL" } else { "IN PERSON" };
    let hearing = if r.hearing_type.is_empty() {
        "HEARING".to_string()
    } else {
        r.hearing_type.to_uppercase()
    };
    let court = r
        .court
        .split('-')
        .next()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("Court");
    let judge = r.judge.split_whitespace().last().unwrap_or("N/A");
    let attorney = first_word(&r.attorney).unwrap_or("N/A");
    format!(
        "{defendant} - {mode} - {hearing} - {court} - J.{judge} - {} - {attorney}",
        r.case_number
    )
}

fn description(r: &HearingRecord) -> String {
    let mut lines = vec![
        format!("Case: {} {}", r.case_number, r.case_type).trim_end().to_string(),
        format!("Parties: {} vs. {}", r.plaintiff, r.defendant),
        format!("Court: {}", r.court),
    ];
    if !r.judge.is_empty() {
        lines.push(format!("Judge: {}", r.judge));
    }
    if !r.room.is_empty() {
        lines.push(format!("Room: {}", r.room));
    }
    lines.push(format!("Attorney: {}", r.attorney));
    if let Some(url) = &r.webex_url {
        lines.push(format!("Join: {url}"));
    }
    lines.push(format!("Details: {}", r.detail_url));
    lines.join("\n")
}

/// One `VEVENT`, or `None` when the record's date/time cannot be read.
pub fn record_to_event(r: &HearingRecord, stamp: NaiveDateTime) -> Option<String> {
    let start = hearing_start(r)?;
    let end = start + Duration::hours(1);
    let uid = format!(
        "{}-{}@{UID_DOMAIN}",
        r.case_number,
        start.and_utc().timestamp_millis()
    );
    let location = r.webex_url.as_deref().unwrap_or(&r.court);

    let lines = [
        "BEGIN:VEVENT".to_string(),
        format!("UID:{uid}"),
        format!("DTSTAMP:{}", ics_datetime(stamp)),
        format!("DTSTART:{}", ics_datetime(start)),
        format!("DTEND:{}", ics_datetime(end)),
        format!("SUMMARY:{}", escape_text(&summary(r))),
        format!("DESCRIPTION:{}", escape_text(&description(r))),
        format!("LOCATION:{}", escape_text(location)),
        format!("URL:{}", r.detail_url),
        "STATUS:CONFIRMED".to_string(),
        "SEQUENCE:0".to_string(),
        "BEGIN:VALARM".to_string(),
        "TRIGGER:-PT24H".to_string(),
        "ACTION:DISPLAY".to_string(),
        "DESCRIPTION:Hearing reminder - 24 hours before".to_string(),
        "END:VALARM".to_string(),
        "END:VEVENT".to_string(),
    ];
    let folded: Vec<String> = lines.iter().map(|l| fold_line(l)).collect();
    Some(folded.join("\r\n"))
}

/// Whole `VCALENDAR` document; unreadable records are left out.
pub fn records_to_calendar(records: &[HearingRecord], stamp: NaiveDateTime) -> String {
    let mut out = format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:{PRODID}\r\nCALSCALE:GREGORIAN\r\nMETHOD:PUBLISH\r\n"
    );
    for r in records {
        match record_to_event(r, stamp) {
            Some(ev) => {
                out.push_str(&ev);
                out.push_str("\r\n");
            }
            None => {
                tracing::warn!(case = %r.case_number, date = %r.date, time = %r.time, "skipping unreadable hearing time");
            }
        }
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

/// `<case>_<DEFENDANT>_<YYYYMMDD>_<HHMM>.ics`, safe for common filesystems.
/// The start time keeps hearings of one case on different days apart.
pub fn ics_file_name(r: &HearingRecord) -> String {
    let defendant = first_word(&r.defendant).unwrap_or("defendant").to_uppercase();
    let stem = match hearing_start(r) {
        Some(start) => format!("{}_{}_{}", r.case_number, defendant, start.format("%Y%m%d_%H%M")),
        None => format!("{}_{}", r.case_number, defendant),
    };
    let mut clean: String = stem
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    if clean.chars().count() > MAX_FILE_STEM {
        clean = clean.chars().take(MAX_FILE_STEM).collect();
    }
    format!("{clean}.ics")
}
