//! Planning sheet normalization.
//!
//! Turns the CSV export of a planning spreadsheet into [`DayInput`] rows. Parsing is
//! deliberately forgiving: unknown or malformed cells fall back to defaults instead of
//! failing the whole sheet.

pub mod fields;

use crate::domain::day::DayInput;
use csv::{ReaderBuilder, StringRecord, Trim};
use fields::{Field, HeaderIndex};

pub const DEFAULT_GAS_LEVEL: i32 = 100;
pub const DEFAULT_URGENCY: i32 = 1;

const GAS_RANGE: (i32, i32) = (0, 100);
const URGENCY_RANGE: (i32, i32) = (1, 10);

/// Parse CSV text (header row + data rows) into day records.
///
/// Returns an empty list when the text has fewer than two non-blank lines.
pub fn parse_sheet(csv_text: &str) -> Vec<DayInput> {
    let lines: Vec<&str> = csv_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() < 2 {
        return Vec::new();
    }
    let body = lines
        .iter()
        .map(|line| tighten_quotes(line))
        .collect::<Vec<_>>()
        .join("\n");

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let header = match rdr.headers() {
        Ok(h) => HeaderIndex::new(h.iter()),
        Err(err) => {
            tracing::warn!(error = %err, "sheet header row unreadable");
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(lines.len() - 1);
    for (idx, record) in rdr.records().enumerate() {
        match record {
            Ok(record) => out.push(day_from_record(&header, &record, idx + 1)),
            Err(err) => {
                tracing::warn!(row = idx + 1, error = %err, "skipping unreadable sheet row");
            }
        }
    }

    unify_budget_mode(&mut out);
    out
}

/// Drop blanks between a delimiter and an opening quote (`a, "b, c"` -> `a,"b, c"`). The csv
/// reader only treats a quote as opening a field when it is the field's first byte.
fn tighten_quotes(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending = String::new();
    let mut in_quotes = false;
    let mut field_start = true;
    for ch in line.chars() {
        if field_start && !in_quotes && (ch == ' ' || ch == '\t') {
            pending.push(ch);
            continue;
        }
        if field_start && ch != '"' {
            out.push_str(&pending);
        }
        pending.clear();
        field_start = false;
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => field_start = true,
            _ => {}
        }
        out.push(ch);
    }
    out.push_str(&pending);
    out
}

fn day_from_record(header: &HeaderIndex, record: &StringRecord, row: usize) -> DayInput {
    let get = |field: Field| cell(header, record, field);

    let date = get(Field::Date)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Row {row}"));

    DayInput {
        date,
        early_meeting: parse_flag(get(Field::EarlyMeeting)),
        gas_level: parse_clamped(get(Field::GasLevel), GAS_RANGE, DEFAULT_GAS_LEVEL),
        budget_mode: parse_flag(get(Field::BudgetMode)),
        urgency: parse_clamped(get(Field::Urgency), URGENCY_RANGE, DEFAULT_URGENCY),
        origin: get(Field::Origin).unwrap_or_default().to_string(),
        destination: get(Field::Destination).unwrap_or_default().to_string(),
    }
}

fn cell<'r>(header: &HeaderIndex, record: &'r StringRecord, field: Field) -> Option<&'r str> {
    header
        .column(field)
        .map(|idx| record.get(idx).unwrap_or(""))
}

/// Budget mode is a run-wide preference; the first row decides it for every day.
fn unify_budget_mode(days: &mut [DayInput]) {
    let Some(budget_mode) = days.first().map(|d| d.budget_mode) else {
        return;
    };
    for day in days.iter_mut() {
        day.budget_mode = budget_mode;
    }
}

/// `true` / `yes` / `1` (any case) are true; everything else, including a missing cell, is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    let Some(v) = value else {
        return false;
    };
    matches!(v.trim().to_lowercase().as_str(), "true" | "yes" | "1")
}

/// Leading integer of the cell clamped into `range`, or `fallback` when absent or non-numeric.
pub fn parse_clamped(value: Option<&str>, range: (i32, i32), fallback: i32) -> i32 {
    let (min, max) = range;
    value
        .and_then(parse_leading_int)
        .map(|n| n.clamp(i64::from(min), i64::from(max)) as i32)
        .unwrap_or(fallback)
}

/// Integer prefix of `s` ("12abc" -> 12, "7.9" -> 7, "-3" -> -3).
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    // Saturate absurdly long digit runs; the result is clamped anyway.
    let n = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * n)
}
