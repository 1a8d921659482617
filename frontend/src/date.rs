use chrono::{DateTime, Datelike, TimeZone};
use std::fmt::Display;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const TIME: &str = "%-I:%M %p";

/// Relative date as shown in the message list and header
///
/// Today shows the time, yesterday shows `Yesterday`, the last week the
/// weekday and anything older the month and day (with the year when it
/// differs from the current year). `include_time` adds the time of day to
/// the last three forms.
pub fn format_date<Tz: TimeZone>(
    date: &DateTime<Tz>,
    now: &DateTime<Tz>,
    include_time: bool,
) -> String
where
    Tz::Offset: Display,
{
    let days = now
        .clone()
        .signed_duration_since(date.clone())
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY);

    let time = date.format(TIME);

    match days {
        0 => time.to_string(),
        1 if include_time => format!("Yesterday at {time}"),
        1 => "Yesterday".to_owned(),
        // future dates also end up here
        i64::MIN..=6 if include_time => date.format("%a %-I:%M %p").to_string(),
        i64::MIN..=6 => date.format("%a").to_string(),
        _ => {
            let mut formatted = date.format("%b %-d").to_string();

            if date.year() != now.year() {
                formatted.push_str(&date.format(", %Y").to_string());
            }

            if include_time {
                formatted.push_str(&format!(", {time}"));
            }

            formatted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::format_date;
    use chrono::{DateTime, Utc};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        rfc3339.parse().unwrap()
    }

    #[test]
    fn today() {
        let now = at("2025-01-20T18:00:00Z");
        let date = at("2025-01-20T09:30:00Z");

        assert_eq!(format_date(&date, &now, false), "9:30 AM");
        assert_eq!(format_date(&date, &now, true), "9:30 AM");
    }

    #[test]
    fn yesterday() {
        let now = at("2025-01-20T18:00:00Z");
        let date = at("2025-01-19T16:45:00Z");

        assert_eq!(format_date(&date, &now, false), "Yesterday");
        assert_eq!(format_date(&date, &now, true), "Yesterday at 4:45 PM");
    }

    #[test]
    fn days_are_counted_in_whole_24_hour_periods() {
        // less than 24 hours ago but on the previous calendar day
        let now = at("2025-01-20T08:00:00Z");
        let date = at("2025-01-19T16:45:00Z");

        assert_eq!(format_date(&date, &now, false), "4:45 PM");
    }

    #[test]
    fn this_week() {
        let now = at("2025-01-20T18:00:00Z");
        let date = at("2025-01-16T14:05:00Z");

        assert_eq!(format_date(&date, &now, false), "Thu");
        assert_eq!(format_date(&date, &now, true), "Thu 2:05 PM");
    }

    #[test]
    fn future_dates_show_the_weekday() {
        let now = at("2025-01-20T18:00:00Z");
        let date = at("2025-01-25T10:00:00Z");

        assert_eq!(format_date(&date, &now, false), "Sat");
    }

    #[test]
    fn older() {
        let now = at("2025-01-20T18:00:00Z");

        let same_year = at("2025-01-02T07:15:00Z");
        assert_eq!(format_date(&same_year, &now, false), "Jan 2");
        assert_eq!(format_date(&same_year, &now, true), "Jan 2, 7:15 AM");

        let last_year = at("2024-11-28T19:00:00Z");
        assert_eq!(format_date(&last_year, &now, false), "Nov 28, 2024");
        assert_eq!(format_date(&last_year, &now, true), "Nov 28, 2024, 7:00 PM");
    }
}
