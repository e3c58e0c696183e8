use chrono::{Datelike, NaiveDate, Weekday};

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Pick the forecast key that best matches a user-entered date token.
///
/// Precedence: exact ISO match, then weekday name, then month/day, then the earliest key.
/// Returns `None` only when `keys` is empty.
pub fn match_forecast_date<'a, S: AsRef<str>>(token: &str, keys: &'a [S]) -> Option<&'a str> {
    let token = token.trim();
    let keys_iter = keys.iter().map(|k| k.as_ref());

    if let Some(k) = keys_iter.clone().find(|k| *k == token) {
        return Some(k);
    }

    if let Some(k) = keys_iter.clone().find(|k| {
        parse_iso(k)
            .map(|d| weekday_name(d.weekday()).eq_ignore_ascii_case(token))
            .unwrap_or(false)
    }) {
        return Some(k);
    }

    if let Some((month, day)) = month_day(token) {
        if let Some(k) = keys_iter.clone().find(|k| {
            parse_iso(k)
                .map(|d| d.month() == month && d.day() == day)
                .unwrap_or(false)
        }) {
            return Some(k);
        }
    }

    // Keys are ISO dates, so lexicographic order is calendar order.
    keys_iter.min()
}

fn parse_iso(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, ISO_FORMAT).ok()
}

pub fn weekday_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// First two digit runs of the token as (month, day): "1/15" -> (1, 15), "03-07" -> (3, 7).
fn month_day(token: &str) -> Option<(u32, u32)> {
    let mut groups = token
        .split(|c: char| !c.is_ascii_digit())
        .filter(|g| !g.is_empty())
        .map(|g| g.parse::<u32>().ok());
    let month = groups.next()??;
    let day = groups.next()??;
    Some((month, day))
}
