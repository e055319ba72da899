//! Keyword and pattern based extraction of a date and a time-of-day from
//! free text. Nothing here fails: an unrecognised message yields an empty
//! [`ParsedMoment`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ParsedMoment;

static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})[/.\-](\d{1,2})").expect("day/month pattern is valid")
});

static CLOCK_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("clock pattern is valid"));

static HOUR_MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s*(am|pm)").expect("hour pattern is valid"));

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

pub fn extract(text: &str, reference_now: DateTime<Utc>) -> ParsedMoment {
    let message = text.to_lowercase();
    let today = reference_now.date_naive();

    ParsedMoment {
        date: resolve_date(&message, today),
        time: resolve_time(&message),
    }
}

fn resolve_date(message: &str, today: NaiveDate) -> Option<NaiveDate> {
    if message.contains("today") {
        return Some(today);
    }
    if message.contains("tomorrow") {
        return Some(today + Duration::days(1));
    }
    if let Some(weekday) = WEEKDAYS
        .iter()
        .find(|(name, _)| message.contains(name))
        .map(|(_, day)| *day)
    {
        return Some(next_weekday(today, weekday));
    }

    let caps = DAY_MONTH.captures(message)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    day_month_on_or_after(day, month, today)
}

/// Next occurrence strictly after `today`; naming today's weekday means a week out.
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut days_ahead = wanted - current;
    if days_ahead <= 0 {
        days_ahead += 7;
    }
    today + Duration::days(days_ahead)
}

fn day_month_on_or_after(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if date < today {
        return NaiveDate::from_ymd_opt(today.year() + 1, month, day);
    }
    Some(date)
}

fn resolve_time(message: &str) -> Option<NaiveTime> {
    if let Some(caps) = CLOCK_TIME.captures(message) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        // The meridiem is looked up anywhere in the message, not next to the number.
        let hour = to_24_hour(hour, message.contains("pm"), message.contains("am"));
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    let caps = HOUR_MERIDIEM.captures(message)?;
    let hour: u32 = caps[1].parse().ok()?;
    let is_pm = &caps[2] == "pm";
    NaiveTime::from_hms_opt(to_24_hour(hour, is_pm, !is_pm), 0, 0)
}

fn to_24_hour(hour: u32, pm: bool, am: bool) -> u32 {
    if pm && (1..=11).contains(&hour) {
        hour + 12
    } else if am && hour == 12 {
        0
    } else {
        hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_today_and_tomorrow() {
        let now = at(2024, 3, 14);
        assert_eq!(extract("today works", now).date, Some(date(2024, 3, 14)));
        assert_eq!(extract("Tomorrow please", now).date, Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_tomorrow_ignores_time_content() {
        let now = at(2024, 12, 31);
        for text in ["tomorrow", "tomorrow at 3pm", "TOMORROW 10:15", "tomorrow, 25/12"] {
            assert_eq!(extract(text, now).date, Some(date(2025, 1, 1)), "{text}");
        }
    }

    #[test]
    fn test_today_wins_over_weekday() {
        // 2024-03-14 is a Thursday
        let now = at(2024, 3, 14);
        assert_eq!(extract("today or friday", now).date, Some(date(2024, 3, 14)));
    }

    #[test]
    fn test_weekday_is_strictly_after_today() {
        // 2024-03-14 is a Thursday
        let now = at(2024, 3, 14);
        assert_eq!(extract("friday", now).date, Some(date(2024, 3, 15)));
        assert_eq!(extract("Monday at 2 PM", now).date, Some(date(2024, 3, 18)));
        assert_eq!(extract("wednesday", now).date, Some(date(2024, 3, 20)));
    }

    #[test]
    fn test_same_weekday_is_a_week_out() {
        let base = at(2024, 3, 11);
        for offset in 0..7 {
            let now = base + Duration::days(offset);
            let name = WEEKDAYS[now.weekday().num_days_from_monday() as usize].0;
            let expected = now.date_naive() + Duration::days(7);
            assert_eq!(extract(name, now).date, Some(expected), "{name}");
        }
    }

    #[test]
    fn test_weekday_wins_over_numeric_date() {
        let now = at(2024, 3, 14);
        assert_eq!(extract("friday 25/12", now).date, Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_day_month_this_year() {
        let parsed = extract("25/12", at(2024, 1, 1));
        assert_eq!(parsed.date, Some(date(2024, 12, 25)));
    }

    #[test]
    fn test_day_month_rolls_to_next_year() {
        let parsed = extract("25/12", at(2024, 12, 26));
        assert_eq!(parsed.date, Some(date(2025, 12, 25)));
    }

    #[test]
    fn test_day_month_on_reference_date_stays() {
        let parsed = extract("26.12", at(2024, 12, 26));
        assert_eq!(parsed.date, Some(date(2024, 12, 26)));
    }

    #[test]
    fn test_day_month_separators() {
        let now = at(2024, 1, 1);
        assert_eq!(extract("5-3", now).date, Some(date(2024, 3, 5)));
        assert_eq!(extract("05.03", now).date, Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_invalid_day_month_is_discarded() {
        let now = at(2024, 1, 1);
        assert_eq!(extract("31/02", now).date, None);
        assert_eq!(extract("12/13", now).date, None);
    }

    #[test]
    fn test_leap_day_rollover_to_non_leap_year_is_discarded() {
        let parsed = extract("29/02", at(2024, 3, 1));
        assert_eq!(parsed.date, None);
    }

    #[test]
    fn test_clock_time_with_meridiem() {
        let now = at(2024, 1, 1);
        assert_eq!(extract("2:30 pm", now).time, Some(time(14, 30)));
        assert_eq!(extract("2:30 am", now).time, Some(time(2, 30)));
        assert_eq!(extract("12:00 am", now).time, Some(time(0, 0)));
        assert_eq!(extract("12:15 pm", now).time, Some(time(12, 15)));
        assert_eq!(extract("16:45", now).time, Some(time(16, 45)));
    }

    #[test]
    fn test_meridiem_is_scanned_across_whole_message() {
        let now = at(2024, 1, 1);
        assert_eq!(
            extract("at 3:00 on monday, pm please", now).time,
            Some(time(15, 0))
        );
    }

    #[test]
    fn test_clock_time_out_of_range_is_discarded() {
        let now = at(2024, 1, 1);
        assert_eq!(extract("25:00", now).time, None);
        assert_eq!(extract("10:75", now).time, None);
        assert_eq!(extract("11:30 pm", now).time, Some(time(23, 30)));
    }

    #[test]
    fn test_hour_with_meridiem() {
        let now = at(2024, 1, 1);
        assert_eq!(extract("tomorrow at 3pm", now).time, Some(time(15, 0)));
        assert_eq!(extract("around 9 AM", now).time, Some(time(9, 0)));
        assert_eq!(extract("12 am", now).time, Some(time(0, 0)));
        assert_eq!(extract("12pm", now).time, Some(time(12, 0)));
        assert_eq!(extract("at 13pm", now).time, Some(time(13, 0)));
    }

    #[test]
    fn test_nothing_found() {
        let parsed = extract("whenever suits you", at(2024, 1, 1));
        assert_eq!(parsed, ParsedMoment::default());
        assert!(parsed.to_utc().is_none());
    }

    #[test]
    fn test_combined_moment() {
        let now = at(2024, 3, 14);
        let parsed = extract("25/03 at 2:30 PM", now);
        assert_eq!(parsed.date, Some(date(2024, 3, 25)));
        assert_eq!(parsed.time, Some(time(14, 30)));
        assert_eq!(
            parsed.to_utc(),
            Some(Utc.with_ymd_and_hms(2024, 3, 25, 14, 30, 0).unwrap())
        );
    }
}
