//! Time utilities
//!
//! Time ranges are sent to the service as `start/end/P1D`, where `P1D` is the
//! resolution the service requires for time ranges.

use chrono::NaiveDate;

use crate::ports::Clock;
use crate::settings::SettingsState;

/// Time resolution suffix of time ranges
const TIME_RESOLUTION: &str = "P1D";

/// Placeholder for an unset time in names
const UNSET_TIME_NAME: &str = "-";

/// Time parameter for a request built from the selected dates.
///
/// The same rule applies to every service:
/// - exact date without a start: empty, the service picks the default
/// - exact date: a single-day window `start/start/P1D`
/// - start without an end: an open window through today
/// - end without a start: the end date alone
pub fn build_time(settings: &SettingsState, clock: &dyn Clock) -> String {
    let start = settings.start_time.as_str();
    let end = settings.end_time.as_str();

    if settings.is_exact_date {
        if start.is_empty() {
            return String::new();
        }
        return format!("{}/{}/{}", start, start, TIME_RESOLUTION);
    }

    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (true, false) => end.to_string(),
        (false, true) => {
            format!("{}/{}/{}", start, clock.today().format("%Y-%m-%d"), TIME_RESOLUTION)
        }
        (false, false) => format!("{}/{}/{}", start, end, TIME_RESOLUTION),
    }
}

/// Time interval as shown in layer names and filenames
pub fn time_interval_name(settings: &SettingsState) -> String {
    let start = time_name(&settings.start_time);
    if settings.is_exact_date {
        return start.to_string();
    }
    format!("{}/{}", start, time_name(&settings.end_time))
}

fn time_name(time: &str) -> &str {
    if time.is_empty() {
        UNSET_TIME_NAME
    } else {
        time
    }
}

/// Parse a date typed by the user into `YYYY-MM-DD`.
///
/// An empty input stays empty. Year-first dates are read as year, month, day.
/// Year-last dates are read month first unless the first number cannot be a month.
/// Returns `None` if the text is not a valid calendar date.
pub fn parse_date(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return Some(String::new());
    }

    let parts: Vec<&str> = text
        .split(|c: char| matches!(c, '-' | '/' | '.' | ',') || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() != 3 || parts.iter().any(|part| !part.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let numbers: Vec<u32> = parts.iter().map(|part| part.parse().ok()).collect::<Option<_>>()?;

    let date = if parts[0].len() == 4 {
        NaiveDate::from_ymd_opt(numbers[0] as i32, numbers[1], numbers[2])
    } else if parts[2].len() == 4 {
        let (mut month, mut day) = (numbers[0], numbers[1]);
        if month > 12 && day <= 12 {
            std::mem::swap(&mut month, &mut day);
        }
        NaiveDate::from_ymd_opt(numbers[2] as i32, month, day)
    } else {
        None
    }?;

    Some(date.format("%Y-%m-%d").to_string())
}

/// Whole-month time range, e.g. `2020-02-01/2020-02-29/P1D`
pub fn get_month_time_interval(year: i32, month: u32) -> Option<String> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    let last_day = next_month.pred_opt()?;

    Some(format!(
        "{}/{}/{}",
        first_day.format("%Y-%m-%d"),
        last_day.format("%Y-%m-%d"),
        TIME_RESOLUTION
    ))
}
