// src/calendar/parser.rs
//! Listing page → raw entries.
//!
//! The remote page is a flat run of header blocks (`div.col-xs-8` with the
//! time and hearing type, `div.col-xs-4` with the date) each followed by one
//! or more `div.casehover` containers. Walking the three selectors in document
//! order lets every container pick up the header that precedes it.
//!
//! Parsing is best-effort per row: rows without a case number, a readable time
//! or a resolvable date are skipped; every other field is optional.

use chrono::{NaiveDate, NaiveTime};
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::calendar::types::{DateScope, FetchUnit, RawEntry};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static SEL_FLOW: Lazy<Selector> = Lazy::new(|| selector("div.col-xs-8, div.col-xs-4, div.casehover"));
static SEL_STRONG: Lazy<Selector> = Lazy::new(|| selector("strong"));
static SEL_HEARING_TYPE: Lazy<Selector> = Lazy::new(|| selector("em.little strong"));
static SEL_CASELINK: Lazy<Selector> = Lazy::new(|| selector("a.caselink"));
static SEL_CASE: Lazy<Selector> = Lazy::new(|| selector("div.case"));
static SEL_PARTIES: Lazy<Selector> = Lazy::new(|| selector("div.col-xs-12.col-sm-4"));
static SEL_INFO: Lazy<Selector> = Lazy::new(|| selector("div.col-xs-12.col-sm-6"));
static SEL_BOTTOMLINE: Lazy<Selector> = Lazy::new(|| selector("div.bottomline"));
static SEL_ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));
static RE_CASE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*case\s*(?:#|no\.?|number)?\s*:?\s*").expect("case label regex"));
static RE_ATTORNEY_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\battorneys?\s*:\s*").expect("attorney label regex"));
static RE_ATTORNEY_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[;&/]\s*").expect("attorney split regex"));
static RE_ROOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:court\s*)?(?:room|rm\.?)\b").expect("room regex"));
static RE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\b|\b(\d{1,2}):(\d{2})\b")
        .expect("time regex")
});
static RE_DATE_MDY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("mdy regex"));
static RE_DATE_ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso regex"));
static RE_DATE_LONG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})\b").expect("long date regex")
});

/// Time/date/hearing type shared by the containers that follow a header block.
#[derive(Debug, Default, Clone)]
struct RowHeader {
    time: Option<NaiveTime>,
    date: Option<NaiveDate>,
    hearing_type: Option<String>,
}

/// Everything a container yielded, before identity is checked.
#[derive(Debug, Default)]
struct RowFields {
    case_number: Option<String>,
    case_type: Option<String>,
    court: Option<String>,
    judge: Option<String>,
    room: Option<String>,
    plaintiff: Option<String>,
    defendant: Option<String>,
    attorneys: Vec<String>,
    detail_href: Option<String>,
    webex_href: Option<String>,
}

/// Parse one listing page fetched for `unit`.
pub fn parse_listing(html: &str, unit: &FetchUnit) -> Vec<RawEntry> {
    let t0 = std::time::Instant::now();
    let doc = Html::parse_document(html);

    let mut header = RowHeader::default();
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for el in doc.select(&SEL_FLOW) {
        if has_class(el, "casehover") {
            let row = extract_row(el);
            match resolve(row, &header, unit) {
                Ok(entry) => out.push(entry),
                Err(reason) => {
                    skipped += 1;
                    tracing::debug!(target: "calendar", reason, "skipping malformed listing row");
                }
            }
            continue;
        }
        if inside_casehover(el) {
            continue;
        }
        if has_class(el, "col-xs-8") {
            header.time = el
                .select(&SEL_STRONG)
                .find_map(|s| normalize_time(&joined_text(s)));
            header.hearing_type = el
                .select(&SEL_HEARING_TYPE)
                .next()
                .map(joined_text)
                .filter(|s| !s.is_empty());
        } else if has_class(el, "col-xs-4") {
            header.date = el
                .select(&SEL_STRONG)
                .find_map(|s| normalize_date(&joined_text(s)))
                .or_else(|| normalize_date(&joined_text(el)));
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("calendar_parse_ms").record(ms);
    if skipped > 0 {
        counter!("calendar_malformed_entries_total").increment(skipped as u64);
        tracing::warn!(target: "calendar", skipped, kept = out.len(), "listing rows skipped");
    }
    out
}

fn resolve(row: RowFields, header: &RowHeader, unit: &FetchUnit) -> Result<RawEntry, &'static str> {
    let case_number = row.case_number.ok_or("missing case number")?;
    let time = header.time.ok_or("missing or malformed time")?;
    let date = header
        .date
        .or(match unit.date {
            DateScope::Day(d) => Some(d),
            DateScope::All => None,
        })
        .ok_or("missing or malformed date")?;

    Ok(RawEntry {
        case_number,
        date,
        time,
        case_type: row.case_type,
        court: row.court,
        hearing_type: header.hearing_type.clone(),
        judge: row.judge,
        room: row.room,
        plaintiff: row.plaintiff,
        defendant: row.defendant,
        attorneys: row.attorneys,
        detail_href: row.detail_href,
        webex_href: row.webex_href,
        location: unit.location.clone(),
    })
}

fn extract_row(el: ElementRef) -> RowFields {
    let mut row = RowFields::default();

    if let Some(link) = el.select(&SEL_CASELINK).next() {
        row.court = non_empty(joined_text(link));
        row.detail_href = link.value().attr("href").map(|h| h.trim().to_string());
    }

    if let Some(case) = el.select(&SEL_CASE).next() {
        let parts = text_parts(case);
        row.case_number = parts
            .first()
            .map(|p| RE_CASE_LABEL.replace(p, "").trim().to_string())
            .and_then(non_empty);
        row.case_type = parts.get(1).cloned();
    }

    let candidates: Vec<ElementRef> = el.select(&SEL_PARTIES).collect();
    let parties = candidates
        .iter()
        .find(|c| text_parts(**c).iter().any(|p| mentions_vs(p)))
        .or_else(|| {
            candidates.iter().find(|c| {
                c.select(&SEL_CASE).next().is_none() && c.select(&SEL_CASELINK).next().is_none()
            })
        });
    if let Some(p) = parties {
        let (plaintiff, defendant) = split_parties(&text_parts(*p));
        row.plaintiff = plaintiff;
        row.defendant = defendant;
    }

    for info in el.select(&SEL_INFO) {
        let parts = text_parts(info);
        match parts.as_slice() {
            [room, ..] if RE_ROOM.is_match(room) => {
                row.room = Some(room.clone());
                break;
            }
            [judge, room, ..] => {
                row.judge = Some(judge.clone());
                row.room = Some(room.clone());
                break;
            }
            _ => {}
        }
    }

    for line in el.select(&SEL_BOTTOMLINE) {
        let text = joined_text(line);
        let Some(label) = RE_ATTORNEY_LABEL.find(&text) else {
            continue;
        };
        for name in RE_ATTORNEY_SPLIT.split(&text[label.end()..]) {
            let name = name.trim();
            if !name.is_empty() {
                row.attorneys.push(name.to_string());
            }
        }
    }

    row.webex_href = el
        .select(&SEL_ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find(|h| h.to_ascii_lowercase().contains("webex"))
        .map(|h| h.trim().to_string());

    row
}

/// "STATE OF UTAH | vs. | JOHN DOE" → (plaintiff, defendant). Kept opaque otherwise.
fn split_parties(parts: &[String]) -> (Option<String>, Option<String>) {
    let mut before: Vec<&str> = Vec::new();
    let mut after: Vec<&str> = Vec::new();
    let mut seen_vs = false;

    for p in parts {
        let lower = p.to_ascii_lowercase();
        if is_vs(&lower) {
            seen_vs = true;
            continue;
        }
        if !seen_vs {
            if let Some(stripped) = strip_suffix_ci(p, &lower, " vs.").or_else(|| strip_suffix_ci(p, &lower, " vs")) {
                before.push(stripped.trim());
                seen_vs = true;
                continue;
            }
            if lower.starts_with("vs. ") {
                after.push(p[4..].trim());
                seen_vs = true;
                continue;
            }
            before.push(p.as_str());
        } else {
            after.push(p.as_str());
        }
    }

    (non_empty(before.join(" ")), non_empty(after.join(" ")))
}

fn is_vs(lower: &str) -> bool {
    matches!(lower, "vs." | "vs" | "v." | "versus")
}

fn mentions_vs(p: &str) -> bool {
    let lower = p.to_ascii_lowercase();
    is_vs(&lower) || lower.ends_with(" vs.") || lower.starts_with("vs. ")
}

fn strip_suffix_ci<'a>(orig: &'a str, lower: &str, suffix: &str) -> Option<&'a str> {
    lower
        .ends_with(suffix)
        .then(|| &orig[..orig.len() - suffix.len()])
}

/// Any recognizable wall-clock time → `NaiveTime`.
pub fn normalize_time(s: &str) -> Option<NaiveTime> {
    let caps = RE_TIME.captures(s)?;
    if let Some(meridiem) = caps.get(3) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("p");
        let hour24 = hour % 12 + if pm { 12 } else { 0 };
        return NaiveTime::from_hms_opt(hour24, minute, 0);
    }
    let hour: u32 = caps.get(4)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// `MM/DD/YYYY`, `YYYY-MM-DD` or `Month D, YYYY`, anywhere in the text.
pub fn normalize_date(s: &str) -> Option<NaiveDate> {
    if let Some(c) = RE_DATE_MDY.captures(s) {
        let m: u32 = c[1].parse().ok()?;
        let d: u32 = c[2].parse().ok()?;
        let y: i32 = c[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    if let Some(c) = RE_DATE_ISO.captures(s) {
        let y: i32 = c[1].parse().ok()?;
        let m: u32 = c[2].parse().ok()?;
        let d: u32 = c[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    RE_DATE_LONG.captures_iter(s).find_map(|c| {
        NaiveDate::parse_from_str(&format!("{} {} {}", &c[1], &c[2], &c[3]), "%B %d %Y").ok()
    })
}

/// Display form used in records: "2:00 PM".
pub fn format_time(t: NaiveTime) -> String {
    t.format("%-I:%M %p").to_string()
}

/// Display form used in records: "11/12/2025".
pub fn format_date(d: NaiveDate) -> String {
    d.format("%m/%d/%Y").to_string()
}

fn has_class(el: ElementRef, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn inside_casehover(el: ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| has_class(a, "casehover"))
}

/// Text nodes of `el`, whitespace-collapsed, empties dropped.
fn text_parts(el: ElementRef) -> Vec<String> {
    el.text()
        .map(|t| RE_WS.replace_all(t, " ").trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn joined_text(el: ElementRef) -> String {
    text_parts(el).join(" ")
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
