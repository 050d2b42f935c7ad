//! Timezone-aware calendar arithmetic: start-of-unit and add-N-units.
//!
//! Day and larger units are computed on local wall-clock time and then
//! mapped back to an instant, so a day is 23 or 25 hours across a DST
//! transition. Weeks start on Sunday.

use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike,
};
use chrono_tz::Tz;
use orion_error::prelude::*;

use crate::error::{CoreReason, CoreResult};
use crate::interval::IntervalUnit;

/// Upper bound on how far a nonexistent local time is pushed forward.
const MAX_GAP_MINUTES: i64 = 26 * 60;

/// Parse an IANA timezone name (`"UTC"`, `"America/Los_Angeles"`).
pub fn parse_tz(name: &str) -> CoreResult<Tz> {
    name.trim().parse::<Tz>().map_err(|e| {
        StructError::from(CoreReason::InvalidTimezone).with_detail(format!("{name:?}: {e}"))
    })
}

/// Map a local wall-clock time to an instant in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap move forward to the first local minute that exists.
pub fn resolve_local(tz: Tz, naive: NaiveDateTime) -> CoreResult<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Ok(dt);
    }
    for step in 1..=MAX_GAP_MINUTES {
        let probe = naive + Duration::minutes(step);
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return Ok(dt);
        }
    }
    StructError::from(CoreReason::InvalidTimestamp)
        .with_detail(format!("local time {naive} does not exist in {tz}"))
        .err()
}

/// Truncate `dt` to the start of the `unit` it falls in, in its own timezone.
///
/// Second, minute and hour starts are taken on the timeline, so a time in a
/// repeated fall-back hour stays in its own occurrence of that hour.
pub fn start_of(dt: DateTime<Tz>, unit: IntervalUnit) -> CoreResult<DateTime<Tz>> {
    let local = dt.naive_local();
    let into_second = Duration::nanoseconds(i64::from(local.nanosecond()));
    let into_minute = into_second + Duration::seconds(i64::from(local.second()));
    let into_hour = into_minute + Duration::minutes(i64::from(local.minute()));
    let date = local.date();
    let start = match unit {
        IntervalUnit::Second => return add_elapsed(dt, -into_second),
        IntervalUnit::Minute => return add_elapsed(dt, -into_minute),
        IntervalUnit::Hour => return add_elapsed(dt, -into_hour),
        IntervalUnit::Day => date.and_time(NaiveTime::MIN),
        IntervalUnit::Week => {
            let back = u64::from(date.weekday().num_days_from_sunday());
            date.checked_sub_days(Days::new(back))
                .unwrap_or(date)
                .and_time(NaiveTime::MIN)
        }
        IntervalUnit::Month => first_of_month(date.year(), date.month())?,
        IntervalUnit::Quarter => first_of_month(date.year(), (date.month0() / 3) * 3 + 1)?,
        IntervalUnit::Year => first_of_month(date.year(), 1)?,
    };
    resolve_local(dt.timezone(), start)
}

/// Advance `dt` by `n` whole `unit`s.
///
/// Seconds, minutes and hours are elapsed time. Days and weeks move the local
/// date; months, quarters and years move the local month, clamping the day to
/// the end of a shorter month.
pub fn add(dt: DateTime<Tz>, n: u32, unit: IntervalUnit) -> CoreResult<DateTime<Tz>> {
    let n64 = i64::from(n);
    let shifted = match unit {
        IntervalUnit::Second => return add_elapsed(dt, Duration::seconds(n64)),
        IntervalUnit::Minute => return add_elapsed(dt, Duration::minutes(n64)),
        IntervalUnit::Hour => return add_elapsed(dt, Duration::hours(n64)),
        IntervalUnit::Day => dt.naive_local().checked_add_days(Days::new(u64::from(n))),
        IntervalUnit::Week => dt.naive_local().checked_add_days(Days::new(u64::from(n) * 7)),
        IntervalUnit::Month => dt.naive_local().checked_add_months(Months::new(n)),
        IntervalUnit::Quarter => dt
            .naive_local()
            .checked_add_months(Months::new(n.saturating_mul(3))),
        IntervalUnit::Year => dt
            .naive_local()
            .checked_add_months(Months::new(n.saturating_mul(12))),
    };
    match shifted {
        Some(local) => resolve_local(dt.timezone(), local),
        None => overflow(dt, n, unit),
    }
}

/// Move `dt` back by `n` whole `unit`s, with the same rules as [`add`].
pub fn sub(dt: DateTime<Tz>, n: u32, unit: IntervalUnit) -> CoreResult<DateTime<Tz>> {
    let n64 = i64::from(n);
    let shifted = match unit {
        IntervalUnit::Second => return add_elapsed(dt, Duration::seconds(-n64)),
        IntervalUnit::Minute => return add_elapsed(dt, Duration::minutes(-n64)),
        IntervalUnit::Hour => return add_elapsed(dt, Duration::hours(-n64)),
        IntervalUnit::Day => dt.naive_local().checked_sub_days(Days::new(u64::from(n))),
        IntervalUnit::Week => dt.naive_local().checked_sub_days(Days::new(u64::from(n) * 7)),
        IntervalUnit::Month => dt.naive_local().checked_sub_months(Months::new(n)),
        IntervalUnit::Quarter => dt
            .naive_local()
            .checked_sub_months(Months::new(n.saturating_mul(3))),
        IntervalUnit::Year => dt
            .naive_local()
            .checked_sub_months(Months::new(n.saturating_mul(12))),
    };
    match shifted {
        Some(local) => resolve_local(dt.timezone(), local),
        None => overflow(dt, n, unit),
    }
}

pub(crate) fn add_elapsed(dt: DateTime<Tz>, delta: Duration) -> CoreResult<DateTime<Tz>> {
    dt.checked_add_signed(delta).map_or_else(
        || {
            StructError::from(CoreReason::InvalidTimestamp)
                .with_detail(format!("{dt} + {delta} is out of range"))
                .err()
        },
        Ok,
    )
}

fn overflow(dt: DateTime<Tz>, n: u32, unit: IntervalUnit) -> CoreResult<DateTime<Tz>> {
    StructError::from(CoreReason::InvalidTimestamp)
        .with_detail(format!("{dt} shifted by {n} {unit} is out of range"))
        .err()
}

fn first_of_month(year: i32, month: u32) -> CoreResult<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.and_time(NaiveTime::MIN))
        .ok_or_else(|| {
            StructError::from(CoreReason::InvalidTimestamp)
                .with_detail(format!("no first day for {year}-{month:02}"))
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
