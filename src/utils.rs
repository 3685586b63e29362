use crate::error::{PacingError, Result};
use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of calendar days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    match date.month() {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(date.year()) => 29,
        2 => 28,
        _ => 31,
    }
}

/// Days from `date` to the end of its month, counting `date` itself.
pub fn days_left(date: NaiveDate) -> u32 {
    days_in_month(date) - date.day() + 1
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Every day of the month containing `date`, ascending.
pub fn days_of_month(date: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    first_day_of_month(date)
        .iter_days()
        .take(days_in_month(date) as usize)
}

/// First days of the `count` months ending at `anchor`'s month, most recent first.
pub fn trailing_month_starts(anchor: NaiveDate, count: u32) -> Result<Vec<NaiveDate>> {
    let anchor_start = first_day_of_month(anchor);

    (0..count)
        .map(|back| {
            anchor_start
                .checked_sub_months(Months::new(back))
                .ok_or_else(|| {
                    PacingError::DateError(format!(
                        "Cannot step {} months back from {}",
                        back, anchor_start
                    ))
                })
        })
        .collect()
}

/// Parses a date cell down to day granularity.
///
/// Timestamps carrying an explicit offset are first converted to `reference`,
/// so a spend logged late in the evening in one zone never lands on a different
/// day than the same instant logged elsewhere. Timestamps without an offset are
/// taken as wall time and simply truncated.
///
/// Years must be written with four digits. chrono's `%Y` takes any width, so
/// a short date such as `4/5/23` would otherwise parse as year 4.
pub fn parse_date_cell(value: &str, reference: FixedOffset) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.with_timezone(&reference).date_naive());
    }

    let four_digit = |date: &NaiveDate| has_four_digit_year(value, *date);

    DATETIME_FORMATS
        .iter()
        .find_map(|format| {
            NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|stamp| stamp.date())
                .filter(four_digit)
        })
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(value, format)
                    .ok()
                    .filter(four_digit)
            })
        })
}

fn has_four_digit_year(value: &str, date: NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
        && value
            .split(|c: char| !c.is_ascii_digit())
            .any(|field| field.len() == 4 && field.parse::<i32>().ok() == Some(date.year()))
}

/// Parses a numeric cell such as `1250.5`, `-$1,250.50` or `$3000`.
///
/// A single `$` may follow the optional sign, and commas are accepted only as
/// three-digit thousands groups in the integer part. Anything else, including
/// blank and non-finite values, yields `None`.
pub fn parse_amount_cell(value: &str) -> Option<f64> {
    let value = value.trim();
    let (sign, unsigned) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value.strip_prefix('+').unwrap_or(value)),
    };
    let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if fraction.contains(',') || (whole.contains(',') && !is_thousands_grouped(whole)) {
        return None;
    }

    let digits: String = whole.chars().filter(|c| *c != ',').collect();
    let number = if unsigned.contains('.') {
        format!("{}{}.{}", sign, digits, fraction)
    } else {
        format!("{}{}", sign, digits)
    };

    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `1,234,567` style grouping: a lead group of one to three digits, then
/// groups of exactly three.
fn is_thousands_grouped(whole: &str) -> bool {
    let mut groups = whole.split(',');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));

    lead_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

pub fn reference_offset(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            PacingError::InvalidConfig(format!(
                "UTC offset of {} minutes is out of range",
                minutes
            ))
        })
}
