//! Free-form date and offset parsing for conversation input.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;

/// Turns user text into an instant, or `None` when it cannot be read.
/// Implementations never touch the clock; `now` anchors relative phrases,
/// which keeps every caller replayable in tests.
pub trait DateParser: Send + Sync {
    fn parse(&self, text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// chrono-backed parser: explicit formats first, then a small set of
/// natural phrases. Date-only input resolves to 23:59 that day, the usual
/// meaning of a homework deadline.
pub struct SystemDateParser;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

impl DateParser for SystemDateParser {
    fn parse(&self, text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(dt.and_utc());
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
                return end_of_day(date);
            }
        }
        relative_phrase(text, now)
    }
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(23, 59, 0)?.and_utc())
}

/// "today", "tomorrow", "in N days", each optionally followed by "HH:MM".
fn relative_phrase(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = text.to_lowercase();
    let (word, rest) = match lower.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (lower.as_str(), ""),
    };

    let date = match word {
        "today" => now.date_naive(),
        "tomorrow" => now.date_naive() + Duration::days(1),
        "in" => {
            let (n, unit) = rest.split_once(char::is_whitespace)?;
            let n: i64 = n.parse().ok()?;
            if !unit.trim_start().starts_with("day") {
                return None;
            }
            return end_of_day(now.date_naive() + Duration::days(n));
        }
        _ => return None,
    };

    if rest.is_empty() {
        return end_of_day(date);
    }
    let time = NaiveTime::parse_from_str(rest, "%H:%M").ok()?;
    Some(date.and_time(time).and_utc())
}

fn weeks_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(\d+)\s*w(?:eeks?)?\s*$").unwrap())
}

fn days_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(\d+)\s*d(?:ays?)?\s*$").unwrap())
}

fn hours_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(\d+)\s*h(?:ours?)?\s*$").unwrap())
}

/// Reads a relative reminder offset ("2 hours", "3 days", "1w") into
/// minutes. Units are tried largest first: weeks, then days, then hours.
pub fn parse_relative_minutes(text: &str) -> Option<i64> {
    for (re, scale) in [
        (weeks_re(), 10080),
        (days_re(), 1440),
        (hours_re(), 60),
    ] {
        if let Some(caps) = re.captures(text) {
            let n: i64 = caps[1].parse().ok()?;
            return Some(n * scale);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // a Friday morning
        Utc.with_ymd_and_hms(2026, 5, 15, 9, 30, 0).unwrap()
    }

    fn parse(text: &str) -> Option<DateTime<Utc>> {
        SystemDateParser.parse(text, now())
    }

    #[test]
    fn explicit_formats() {
        assert_eq!(
            parse("2026-06-01 18:00"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap())
        );
        assert_eq!(
            parse("2026-06-01T18:00"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap())
        );
        assert_eq!(
            parse("2026-06-01T18:00:00Z"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap())
        );
        assert_eq!(
            parse("01/06/2026 18:00"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap())
        );
    }

    #[test]
    fn bare_dates_mean_end_of_day() {
        assert_eq!(
            parse("2026-06-01"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 23, 59, 0).unwrap())
        );
        assert_eq!(
            parse("01/06/2026"),
            Some(Utc.with_ymd_and_hms(2026, 6, 1, 23, 59, 0).unwrap())
        );
    }

    #[test]
    fn relative_phrases_anchor_on_now() {
        assert_eq!(
            parse("today"),
            Some(Utc.with_ymd_and_hms(2026, 5, 15, 23, 59, 0).unwrap())
        );
        assert_eq!(
            parse("Tomorrow"),
            Some(Utc.with_ymd_and_hms(2026, 5, 16, 23, 59, 0).unwrap())
        );
        assert_eq!(
            parse("tomorrow 08:15"),
            Some(Utc.with_ymd_and_hms(2026, 5, 16, 8, 15, 0).unwrap())
        );
        assert_eq!(
            parse("in 3 days"),
            Some(Utc.with_ymd_and_hms(2026, 5, 18, 23, 59, 0).unwrap())
        );
    }

    #[test]
    fn unreadable_input_is_none() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("whenever"), None);
        assert_eq!(parse("32/13/2026"), None);
        assert_eq!(parse("tomorrow at nine"), None);
        assert_eq!(parse("in three days"), None);
    }

    #[test]
    fn relative_minutes_units() {
        assert_eq!(parse_relative_minutes("2 hours"), Some(120));
        assert_eq!(parse_relative_minutes("1 hour"), Some(60));
        assert_eq!(parse_relative_minutes("2h"), Some(120));
        assert_eq!(parse_relative_minutes("3 days"), Some(4320));
        assert_eq!(parse_relative_minutes("3d"), Some(4320));
        assert_eq!(parse_relative_minutes("1 week"), Some(10080));
        assert_eq!(parse_relative_minutes("2 Weeks"), Some(20160));
        assert_eq!(parse_relative_minutes("1w"), Some(10080));
    }

    #[test]
    fn relative_minutes_rejects_everything_else() {
        assert_eq!(parse_relative_minutes("10"), None);
        assert_eq!(parse_relative_minutes("soon"), None);
        assert_eq!(parse_relative_minutes("2 months"), None);
        assert_eq!(parse_relative_minutes("2026-06-01"), None);
        assert_eq!(parse_relative_minutes("-2 hours"), None);
    }
}
