//! Date normalization: free text in, UTC ISO-8601 out.
//!
//! Whole-string RFC 3339 and RFC 2822 (HTTP dates) are tried first. Anything
//! else goes through a fuzzy scan that looks for the earliest embedded date
//! expression: ISO-like, numeric (day-first), or textual with English or
//! Dutch month names. Values without a zone are taken as UTC.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Month names and abbreviations, English and Dutch.
const MONTHS: &[(&str, u32)] = &[
    ("januari", 1),
    ("january", 1),
    ("jan", 1),
    ("februari", 2),
    ("february", 2),
    ("feb", 2),
    ("maart", 3),
    ("march", 3),
    ("mrt", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("mei", 5),
    ("may", 5),
    ("juni", 6),
    ("june", 6),
    ("jun", 6),
    ("juli", 7),
    ("july", 7),
    ("jul", 7),
    ("augustus", 8),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("oktober", 10),
    ("october", 10),
    ("okt", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Optional time of day (and zone) trailing a date.
const TIME: &str = r"(?:(?:\s*,\s*|\s+|T)(?:om\s+|at\s+|-\s+)?(?P<h>\d{1,2})[:.](?P<mi>\d{2})(?:[:.](?P<s>\d{2}))?(?:\s*(?P<ampm>[ap]\.?m\.?)|\b)(?:\s*(?P<tz>Z|UTC|GMT|[+-]\d{2}:?\d{2}))?)?";

#[derive(Clone, Copy, Debug)]
enum Layout {
    /// 2024-01-15, 2024-01-15T10:00:00.5+02:00
    Iso,
    /// 2024/01/15, 2024.01.15
    YearFirst,
    /// 15-01-2024, 15/01/24, 15.01.2024
    DayFirst,
    /// 3 maart 2022, 3rd of March 2022
    DayMonthName,
    /// March 3, 2022
    MonthNameDay,
}

struct Pattern {
    layout: Layout,
    re: Regex,
}

static PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    let mut names: Vec<&str> = MONTHS.iter().map(|(name, _)| *name).collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let months = names.join("|");

    let sources = [
        (
            Layout::Iso,
            r"(?i)\b(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})(?:[T\s](?P<h>\d{1,2}):(?P<mi>\d{2})(?::(?P<s>\d{2})(?:[.,](?P<frac>\d{1,9}))?)?\s*(?P<tz>Z|[+-]\d{2}(?::?\d{2})?)?|\b)"
                .to_string(),
        ),
        (
            Layout::YearFirst,
            format!(r"(?i)\b(?P<y>\d{{4}})[/.](?P<m>\d{{1,2}})[/.](?P<d>\d{{1,2}})\b{TIME}"),
        ),
        (
            Layout::DayFirst,
            format!(
                r"(?i)\b(?P<a>\d{{1,2}})[/.\-](?P<b>\d{{1,2}})[/.\-](?P<y>\d{{4}}|\d{{2}})\b{TIME}"
            ),
        ),
        (
            Layout::DayMonthName,
            format!(
                r"(?i)\b(?P<d>\d{{1,2}})(?:st|nd|rd|th|ste|de|e)?\.?\s+(?:of\s+)?(?P<mon>{months})\.?,?\s+(?P<y>\d{{4}})\b{TIME}"
            ),
        ),
        (
            Layout::MonthNameDay,
            format!(
                r"(?i)\b(?P<mon>{months})\.?\s+(?P<d>\d{{1,2}})(?:st|nd|rd|th)?,?\s+(?P<y>\d{{4}})\b{TIME}"
            ),
        ),
    ];

    sources
        .into_iter()
        .filter_map(|(layout, src)| match Regex::new(&src) {
            Ok(re) => Some(Pattern { layout, re }),
            Err(e) => {
                tracing::error!(?layout, error=%e, "date pattern failed to compile");
                None
            }
        })
        .collect()
});

/// Normalize free text to a UTC ISO-8601 timestamp.
///
/// Returns `None` for empty, unparseable, or impossible dates.
///
/// ```
/// use lastmod_web::date::normalize;
///
/// assert_eq!(normalize("2024-01-15").as_deref(), Some("2024-01-15T00:00:00+00:00"));
/// assert_eq!(normalize("not a date"), None);
/// ```
pub fn normalize(raw: &str) -> Option<String> {
    parse_datetime(raw).map(to_iso)
}

/// Render a UTC timestamp the way the report expects it.
pub fn to_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parse free text into a UTC timestamp.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let found = scan(s);
    if found.is_none() {
        tracing::trace!(text = s, "no date found");
    }
    found
}

/// Earliest valid date expression in `text`. Ties go to the pattern listed
/// first.
fn scan(text: &str) -> Option<DateTime<Utc>> {
    let mut best: Option<(usize, DateTime<Utc>)> = None;

    for pattern in PATTERNS.iter() {
        for caps in pattern.re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if best.as_ref().is_some_and(|(start, _)| *start <= whole.start()) {
                break;
            }
            if let Some(dt) = build(pattern.layout, &caps) {
                best = Some((whole.start(), dt));
                break;
            }
        }
    }

    best.map(|(_, dt)| dt)
}

fn build(layout: Layout, caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    let (year, month, day) = match layout {
        Layout::Iso | Layout::YearFirst => (
            num(caps, "y")? as i32,
            num(caps, "m")?,
            num(caps, "d")?,
        ),
        Layout::DayFirst => {
            let (a, b) = (num(caps, "a")?, num(caps, "b")?);
            // Day-first unless the middle field cannot be a month.
            let (day, month) = if b > 12 && a <= 12 { (b, a) } else { (a, b) };
            (expand_year(num(caps, "y")?, caps.name("y")?.as_str().len()), month, day)
        }
        Layout::DayMonthName | Layout::MonthNameDay => (
            num(caps, "y")? as i32,
            month_number(caps.name("mon")?.as_str())?,
            num(caps, "d")?,
        ),
    };

    if !(1900..=2199).contains(&year) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    // A bad time of day or zone does not invalidate the date itself.
    let (time, offset) = match (time_of_day(caps), zone(caps)) {
        (Some(time), Some(offset)) => (time, offset),
        _ => {
            tracing::trace!(text = caps.get(0).map(|m| m.as_str()), "time ignored");
            (NaiveTime::from_hms_opt(0, 0, 0)?, FixedOffset::east_opt(0)?)
        }
    };
    let naive = NaiveDateTime::new(date, time);

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn zone(caps: &Captures<'_>) -> Option<FixedOffset> {
    match caps.name("tz") {
        Some(tz) if caps.name("h").is_some() => parse_offset(tz.as_str()),
        _ => FixedOffset::east_opt(0),
    }
}

fn time_of_day(caps: &Captures<'_>) -> Option<NaiveTime> {
    let Some(hour) = num(caps, "h") else {
        return NaiveTime::from_hms_opt(0, 0, 0);
    };
    let minute = num(caps, "mi")?;
    let second = num(caps, "s").unwrap_or(0);
    let nanos = caps.name("frac").map(|m| frac_nanos(m.as_str())).unwrap_or(0);

    let hour = match caps.name("ampm").map(|m| m.as_str().to_ascii_lowercase()) {
        Some(p) if p.starts_with('p') && hour < 12 => hour + 12,
        Some(p) if p.starts_with('a') && hour == 12 => 0,
        Some(_) if hour > 12 => return None,
        _ => hour,
    };
    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
}

fn num(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

/// Two-digit years land in 1970..=2069.
fn expand_year(y: u32, digits: usize) -> i32 {
    match (digits, y) {
        (2, y) if y < 70 => 2000 + y as i32,
        (2, y) => 1900 + y as i32,
        (_, y) => y as i32,
    }
}

fn frac_nanos(digits: &str) -> u32 {
    let mut padded: String = digits.chars().take(9).collect();
    while padded.len() < 9 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, n)| *n)
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    let tz = tz.trim();
    if matches!(tz.to_ascii_uppercase().as_str(), "Z" | "UTC" | "GMT") {
        return FixedOffset::east_opt(0);
    }
    let sign = match tz.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = tz[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
