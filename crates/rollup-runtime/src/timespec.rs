//! Time specs accepted for `--start` / `--end` and the `[rollup]` bounds.
//!
//! ```text
//! 1486058400000        epoch milliseconds
//! 1486058400000ms      same, with an explicit suffix
//! now                  the current instant
//! +1d  -3weeks  -90 m  now shifted by whole calendar units
//! 2017-02-01T00:00:00Z RFC 3339
//! 2017-02-01 08:30     naive local time in the run timezone
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use orion_error::prelude::*;
use rollup_core::{CoreReason, IntervalUnit, Timestamp, calendar};
use winnow::ascii::{digit1, space0};
use winnow::combinator::{alt, cut_err, opt, terminated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, rest};

use crate::error::{RuntimeReason, RuntimeResult};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecForm {
    Millis(i64),
    Now,
    Shift { back: bool, n: u32, unit: IntervalUnit },
}

/// Resolve a time spec against `now`, reading naive dates in `tz`.
pub fn parse_time_spec(text: &str, tz: Tz, now: DateTime<Utc>) -> RuntimeResult<Timestamp> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return invalid(text, "empty time spec");
    }
    if let Ok(form) = spec_form.parse(trimmed) {
        return resolve_form(form, tz, now);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Timestamp::Date(dt.with_timezone(&Utc)));
    }
    match parse_naive(trimmed) {
        Some(naive) => calendar::resolve_local(tz, naive)
            .map(Timestamp::Zoned)
            .err_conv(),
        None => invalid(text, "expected epoch ms, now, +/-N<unit> or a date"),
    }
}

fn resolve_form(form: SpecForm, tz: Tz, now: DateTime<Utc>) -> RuntimeResult<Timestamp> {
    match form {
        SpecForm::Millis(ms) => Ok(Timestamp::EpochMillis(ms)),
        SpecForm::Now => Ok(Timestamp::Date(now)),
        SpecForm::Shift { back, n, unit } => {
            let local = now.with_timezone(&tz);
            let shifted = if back {
                calendar::sub(local, n, unit)
            } else {
                calendar::add(local, n, unit)
            };
            shifted.map(Timestamp::Zoned).err_conv()
        }
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn invalid<T>(text: &str, why: &str) -> RuntimeResult<T> {
    StructError::from(RuntimeReason::from(CoreReason::InvalidTimestamp))
        .with_detail(format!("time spec {text:?}: {why}"))
        .err()
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

fn spec_form(input: &mut &str) -> ModalResult<SpecForm> {
    alt((shift, "now".value(SpecForm::Now), epoch_millis)).parse_next(input)
}

fn epoch_millis(input: &mut &str) -> ModalResult<SpecForm> {
    terminated(digit1.try_map(str::parse::<i64>), opt("ms"))
        .map(SpecForm::Millis)
        .parse_next(input)
}

fn shift(input: &mut &str) -> ModalResult<SpecForm> {
    let sign = one_of(['+', '-']).parse_next(input)?;
    let n = cut_err(digit1.try_map(str::parse::<u32>))
        .context(StrContext::Expected(StrContextValue::Description("count")))
        .parse_next(input)?;
    space0.parse_next(input)?;
    let unit = cut_err(rest.verify_map(shift_unit))
        .context(StrContext::Expected(StrContextValue::Description("time unit")))
        .parse_next(input)?;
    Ok(SpecForm::Shift {
        back: sign == '-',
        n,
        unit,
    })
}

/// Unit words for relative specs: the interval unit names plus the short
/// forms. `m` is minutes and `M` months.
fn shift_unit(word: &str) -> Option<IntervalUnit> {
    let unit = match word {
        "s" | "sec" | "secs" => IntervalUnit::Second,
        "m" | "min" | "mins" => IntervalUnit::Minute,
        "h" | "hr" | "hrs" => IntervalUnit::Hour,
        "d" => IntervalUnit::Day,
        "w" => IntervalUnit::Week,
        "M" => IntervalUnit::Month,
        "Q" => IntervalUnit::Quarter,
        "y" => IntervalUnit::Year,
        other => return IntervalUnit::from_name(other),
    };
    Some(unit)
}
