use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::constants::{DISPLAY_TIME_FORMAT, MONTH_KEY_FORMAT};

/// Default timezone for portfolio business dates.
/// This is the canonical timezone used to convert epoch-millis watermarks
/// to calendar dates, month boundaries, and display strings.
pub const DEFAULT_PORTFOLIO_TZ: Tz = chrono_tz::Australia::Sydney;

fn instant_from_millis(epoch_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(epoch_ms)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn local_instant(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // DST gap: the wall-clock time does not exist; read it as UTC.
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

/// Converts an epoch-millis instant to a calendar date in the given timezone.
///
/// This is the single source of truth for deriving a "business date" from a
/// ledger timestamp.
pub fn local_date(epoch_ms: i64, tz: Tz) -> NaiveDate {
    instant_from_millis(epoch_ms).with_timezone(&tz).date_naive()
}

/// Epoch millis of local midnight at the start of `date`.
pub fn local_midnight_millis(date: NaiveDate, tz: Tz) -> i64 {
    local_instant(date.and_time(NaiveTime::MIN), tz).timestamp_millis()
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date) + Months::new(1)
}

/// Epoch millis of the last instant of the month containing `epoch_ms`.
pub fn end_of_month_millis(epoch_ms: i64, tz: Tz) -> i64 {
    let date = local_date(epoch_ms, tz);
    local_midnight_millis(first_of_next_month(date), tz) - 1
}

/// Last calendar day of the month containing `date`.
pub fn month_end_of(date: NaiveDate) -> NaiveDate {
    let first_next = first_of_next_month(date);
    first_next.pred_opt().unwrap_or(date)
}

/// Last calendar day of the month containing `epoch_ms`.
pub fn month_end_date(epoch_ms: i64, tz: Tz) -> NaiveDate {
    month_end_of(local_date(epoch_ms, tz))
}

/// Calendar year a date's documents are filed under.
pub fn year_key(date: NaiveDate) -> i32 {
    date.year()
}

/// `YYYY-MM` key a date's documents are filed under.
pub fn month_key(date: NaiveDate) -> String {
    date.format(MONTH_KEY_FORMAT).to_string()
}

/// Display form of an entry timestamp in the portfolio timezone.
pub fn display_time(epoch_ms: i64, tz: Tz) -> String {
    instant_from_millis(epoch_ms)
        .with_timezone(&tz)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

/// Whether an entry timestamp is allowed against the mark-to-market
/// watermark: the end of the entry's local day must not precede it.
/// A zero watermark (fresh portfolio) allows everything.
pub fn is_entry_time_allowed(entry_ms: i64, watermark_ms: i64, tz: Tz) -> bool {
    if watermark_ms <= 0 {
        return true;
    }
    let entry_date = local_date(entry_ms, tz);
    let end_of_day = local_midnight_millis(entry_date + Duration::days(1), tz) - 1;
    end_of_day >= watermark_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tz() -> Tz {
        DEFAULT_PORTFOLIO_TZ
    }

    fn millis_of(y: i32, m: u32, d: u32, h: u32) -> i64 {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        local_midnight_millis(date, tz()) + i64::from(h) * 3_600_000
    }

    #[test]
    fn test_end_of_month_is_last_instant() {
        let mid_jan = millis_of(2024, 1, 15, 10);
        let end = end_of_month_millis(mid_jan, tz());
        let feb_first = local_midnight_millis(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), tz());
        assert_eq!(end, feb_first - 1);
        assert_eq!(local_date(end, tz()), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_month_end_date_handles_leap_february() {
        let feb = millis_of(2024, 2, 10, 0);
        assert_eq!(
            month_end_date(feb, tz()),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_month_key_format() {
        assert_eq!(month_key(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()), "2024-03");
    }

    #[test]
    fn test_entry_time_gate() {
        let watermark = millis_of(2024, 1, 20, 12);
        // Same local day as the watermark is still allowed.
        assert!(is_entry_time_allowed(millis_of(2024, 1, 20, 9), watermark, tz()));
        // A later day is allowed.
        assert!(is_entry_time_allowed(millis_of(2024, 1, 21, 9), watermark, tz()));
        // An earlier day is rejected.
        assert!(!is_entry_time_allowed(millis_of(2024, 1, 19, 9), watermark, tz()));
        // Zero watermark allows everything.
        assert!(is_entry_time_allowed(millis_of(2024, 1, 1, 0), 0, tz()));
    }
}
