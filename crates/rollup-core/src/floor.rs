use chrono::{DateTime, Duration, Timelike};
use chrono_tz::Tz;

use crate::calendar::{self, add_elapsed};
use crate::error::CoreResult;
use crate::interval::{IntervalSpec, IntervalUnit};

/// Align `at` down to the start of the window it belongs to.
///
/// Minute and second intervals bucket within their parent unit:
/// `15min` floors to :00/:15/:30/:45 of the current hour and `90sec` floors
/// to the start of the current minute, since buckets restart at every parent
/// boundary. These floors step back along the timeline, so an instant in a
/// repeated fall-back hour lands in its own occurrence of the hour. Every
/// other unit floors to the calendar start of that unit in `at`'s timezone;
/// the multiplier does not shift the alignment.
pub fn floor_window(at: DateTime<Tz>, spec: &IntervalSpec) -> CoreResult<DateTime<Tz>> {
    let n = spec.multiplier.max(1);
    let local = at.naive_local();
    let into_second = Duration::nanoseconds(i64::from(local.nanosecond()));
    match spec.unit {
        IntervalUnit::Minute => {
            let into_bucket = into_second
                + Duration::seconds(i64::from(local.second()))
                + Duration::minutes(i64::from(local.minute() % n));
            add_elapsed(at, -into_bucket)
        }
        IntervalUnit::Second => {
            let into_bucket = into_second + Duration::seconds(i64::from(local.second() % n));
            add_elapsed(at, -into_bucket)
        }
        unit => calendar::start_of(at, unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2017, 3, 7, h, m, s).single().unwrap()
    }

    fn utc_instant(y: i32, mo: u32, d: u32, h: u32, m: u32, s: u32) -> DateTime<chrono::Utc> {
        chrono::Utc.with_ymd_and_hms(y, mo, d, h, m, s).unwrap()
    }

    fn spec(s: &str) -> IntervalSpec {
        s.parse().unwrap()
    }

    #[test]
    fn fifteen_minutes() {
        assert_eq!(floor_window(utc(3, 16, 27), &spec("15min")).unwrap(), utc(3, 15, 0));
        assert_eq!(floor_window(utc(3, 59, 59), &spec("15min")).unwrap(), utc(3, 45, 0));
        assert_eq!(floor_window(utc(3, 0, 0), &spec("15min")).unwrap(), utc(3, 0, 0));
    }

    #[test]
    fn thirty_seconds() {
        assert_eq!(floor_window(utc(3, 17, 19), &spec("30sec")).unwrap(), utc(3, 17, 0));
        assert_eq!(floor_window(utc(3, 17, 45), &spec("30sec")).unwrap(), utc(3, 17, 30));
    }

    #[test]
    fn ninety_seconds_resets_every_minute() {
        assert_eq!(floor_window(utc(3, 17, 59), &spec("90sec")).unwrap(), utc(3, 17, 0));
    }

    #[test]
    fn sub_second_dropped() {
        let at = utc(3, 17, 19) + chrono::Duration::milliseconds(250);
        assert_eq!(floor_window(at, &spec("second")).unwrap(), utc(3, 17, 19));
    }

    #[test]
    fn calendar_unit_delegates() {
        assert_eq!(floor_window(utc(3, 17, 19), &spec("day")).unwrap(), utc(0, 0, 0));
        assert_eq!(floor_window(utc(3, 17, 19), &spec("hour")).unwrap(), utc(3, 0, 0));
    }

    #[test]
    fn repeated_hour_floors_within_its_occurrence() {
        let la: Tz = "America/Los_Angeles".parse().unwrap();
        // 09:20Z is 01:20 PST, the second pass through 01:xx on 2017-11-05.
        let at = utc_instant(2017, 11, 5, 9, 20, 0).with_timezone(&la);
        let floored = floor_window(at, &spec("15min")).unwrap();
        assert_eq!(floored, utc_instant(2017, 11, 5, 9, 15, 0));
        let floored = floor_window(at, &spec("hour")).unwrap();
        assert_eq!(floored, utc_instant(2017, 11, 5, 9, 0, 0));
        // The first pass (01:20 PDT) stays an hour earlier.
        let first = utc_instant(2017, 11, 5, 8, 20, 0).with_timezone(&la);
        let floored = floor_window(first, &spec("15min")).unwrap();
        assert_eq!(floored, utc_instant(2017, 11, 5, 8, 15, 0));
    }

    #[test]
    fn minutes_follow_local_offset() {
        let kolkata: Tz = "Asia/Kolkata".parse().unwrap();
        // 10:20 UTC is 15:50 IST; hourly 15min buckets are local.
        let at = utc(10, 20, 0).with_timezone(&kolkata);
        let floored = floor_window(at, &spec("15min")).unwrap();
        assert_eq!(floored.naive_local().format("%H:%M").to_string(), "15:45");
    }
}
