//! Human-readable rendering of nanosecond durations.
//!
//! Durations below one minute are rendered in the coarsest of `ns`, `us`,
//! `ms` or `s` that keeps the integer part non-degenerate, e.g. `"1.00 ms"`.
//! From one minute upwards the calendar form `[D day(s), ][HH:]MM:SS[.frac]`
//! is used, e.g. `"1 day, 00:00:00"`.
//!
//! In both forms the number of decimal places is chosen so that at least
//! `min_digits` digit characters appear in the output. Digits already shown
//! by larger units count towards that total, and decimal places never go
//! negative.

pub const NS_PER_DAY: u64 = 86_400_000_000_000;
pub const NS_PER_HOUR: u64 = 3_600_000_000_000;
pub const NS_PER_MINUTE: u64 = 60_000_000_000;
pub const NS_PER_SECOND: u64 = 1_000_000_000;
pub const NS_PER_MILLISECOND: u64 = 1_000_000;
pub const NS_PER_MICROSECOND: u64 = 1_000;

/// Sub-minute units, indexed by how many times the value was divided by 1000.
const UNITS_SECONDS: [&str; 4] = ["ns", "us", "ms", "s"];
const UNIT_DIVISORS: [f64; 4] = [1.0, 1e3, 1e6, 1e9];

/// Formats a duration given in nanoseconds.
///
/// Picks the sub-minute form below 60 seconds and the calendar form
/// otherwise.
///
/// # Examples
///
/// ```
/// # use jacktrade::duration_format::format_time;
/// assert_eq!(format_time(1, 3), "1.00 ns");
/// assert_eq!(format_time(1_000_000_000, 3), "1.00 s");
/// assert_eq!(format_time(60_000_000_000, 7), "01:00.0000");
/// assert_eq!(format_time(86_400_000_000_000, 7), "1 day, 00:00:00");
/// ```
pub fn format_time(time_ns: u64, min_digits: usize) -> String {
    if time_ns < NS_PER_MINUTE {
        format_time_seconds(time_ns, min_digits)
    } else {
        format_time_calendar(time_ns, min_digits)
    }
}

/// Formats a duration in the most suitable second-based unit.
///
/// A zero duration is rendered in seconds as if it had three integer
/// digits, so `format_time_seconds(0, 3)` is `"0 s"`.
pub fn format_time_seconds(time_ns: u64, min_digits: usize) -> String {
    let n_digits = count_digits(time_ns);
    // How many times to divide by 1000
    let (n_divisions, digits_after_division) = if n_digits == 0 {
        (UNITS_SECONDS.len() - 1, 3)
    } else {
        let n_divisions = ((n_digits - 1) / 3).min(UNITS_SECONDS.len() - 1);
        (n_divisions, n_digits - 3 * n_divisions)
    };
    let time_after_division = time_ns as f64 / UNIT_DIVISORS[n_divisions];
    let decimal_places = min_digits.saturating_sub(digits_after_division);

    format!(
        "{} {}",
        format_grouped(time_after_division, decimal_places),
        UNITS_SECONDS[n_divisions]
    )
}

/// Formats a duration as `[D day(s), ][HH:]MM:SS[.frac]`.
///
/// Intended for durations of at least one minute; shorter durations still
/// render, as `00:SS[.frac]`.
pub fn format_time_calendar(time_ns: u64, min_digits: usize) -> String {
    let days = time_ns / NS_PER_DAY;
    let remainder_ns = time_ns % NS_PER_DAY;
    let hours = remainder_ns / NS_PER_HOUR;
    let remainder_ns = remainder_ns % NS_PER_HOUR;
    let minutes = remainder_ns / NS_PER_MINUTE;
    let remainder_ns = remainder_ns % NS_PER_MINUTE;
    let seconds = remainder_ns / NS_PER_SECOND;
    let remainder_ns = remainder_ns % NS_PER_SECOND;

    let mut decimal_places = min_digits as i64;
    let mut timestr = String::new();
    // Set once a greater unit of time has been shown
    let mut more_above = false;

    if days > 0 {
        decimal_places -= count_digits(days) as i64;
        timestr.push_str(&format!(
            "{} day{}, ",
            group_thousands(&days.to_string()),
            if days > 1 { "s" } else { "" }
        ));
        more_above = true;
    }
    if time_ns >= NS_PER_HOUR {
        timestr.push_str(&format!("{hours:02}:"));
        decimal_places -= spent_digits(hours, more_above);
        more_above = true;
    }
    if time_ns >= NS_PER_MINUTE {
        decimal_places -= spent_digits(minutes, more_above);
        more_above = true;
    }
    if time_ns >= NS_PER_SECOND {
        decimal_places -= spent_digits(seconds, more_above);
    }

    timestr.push_str(&format!("{minutes:02}:{seconds:02}"));
    let decimal_places = decimal_places.max(0) as usize;
    if decimal_places > 0 {
        let fraction = format!("{:.*}", decimal_places, remainder_ns as f64 / NS_PER_SECOND as f64);
        // Drop the leading "0", keep ".ddd"
        timestr.push_str(&fraction[1..]);
    }
    timestr
}

/// Digits consumed by a two-digit field, or by its bare value when it is the
/// largest unit shown.
fn spent_digits(value: u64, more_above: bool) -> i64 {
    if more_above {
        2
    } else {
        count_digits(value) as i64
    }
}

/// Returns the number of base-10 digits in `number`, or 0 for zero.
///
/// ```
/// # use jacktrade::duration_format::count_digits;
/// assert_eq!(count_digits(0), 0);
/// assert_eq!(count_digits(9), 1);
/// assert_eq!(count_digits(1_000), 4);
/// ```
pub fn count_digits(number: u64) -> usize {
    number.checked_ilog10().map_or(0, |log| log as usize + 1)
}

/// Inserts `,` between every group of three digits, counting from the right.
///
/// ```
/// # use jacktrade::duration_format::group_thousands;
/// assert_eq!(group_thousands("142889"), "142,889");
/// assert_eq!(group_thousands("999"), "999");
/// ```
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Renders `value` with `decimal_places` fractional digits and a
/// thousands-grouped integer part.
fn format_grouped(value: f64, decimal_places: usize) -> String {
    let rendered = format!("{:.*}", decimal_places, value);
    match rendered.split_once('.') {
        Some((integer, fraction)) => format!("{}.{}", group_thousands(integer), fraction),
        None => group_thousands(&rendered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands_boundaries() {
        assert_eq!(group_thousands(""), "");
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(1000.0, 0), "1,000");
        assert_eq!(format_grouped(1234.5, 1), "1,234.5");
        assert_eq!(format_grouped(1.0, 2), "1.00");
    }

    #[test]
    fn test_spent_digits() {
        assert_eq!(spent_digits(5, false), 1);
        assert_eq!(spent_digits(5, true), 2);
        assert_eq!(spent_digits(23, false), 2);
    }
}
