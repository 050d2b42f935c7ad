use std::fmt;
use std::str::FromStr;

use orion_error::prelude::*;
use winnow::ascii::{alpha1, digit1};
use winnow::combinator::{alt, cut_err};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;

use crate::error::{CoreError, CoreReason, CoreResult};

// ---------------------------------------------------------------------------
// IntervalUnit
// ---------------------------------------------------------------------------

/// Calendar units a window can be measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntervalUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl IntervalUnit {
    /// Look up a bare unit name, singular or plural.
    pub fn from_name(name: &str) -> Option<IntervalUnit> {
        let unit = match name {
            "second" | "seconds" => IntervalUnit::Second,
            "minute" | "minutes" => IntervalUnit::Minute,
            "hour" | "hours" => IntervalUnit::Hour,
            "day" | "days" => IntervalUnit::Day,
            "week" | "weeks" => IntervalUnit::Week,
            "month" | "months" => IntervalUnit::Month,
            "quarter" | "quarters" => IntervalUnit::Quarter,
            "year" | "years" => IntervalUnit::Year,
            _ => return None,
        };
        Some(unit)
    }

    /// Units allowed after a numeric multiplier (`15min`, `30sec`).
    fn from_compound_suffix(suffix: &str) -> Option<IntervalUnit> {
        match suffix {
            "m" | "min" | "mins" | "minute" | "minutes" => Some(IntervalUnit::Minute),
            "s" | "sec" | "secs" | "second" | "seconds" => Some(IntervalUnit::Second),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Second => "second",
            IntervalUnit::Minute => "minute",
            IntervalUnit::Hour => "hour",
            IntervalUnit::Day => "day",
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
            IntervalUnit::Quarter => "quarter",
            IntervalUnit::Year => "year",
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IntervalSpec
// ---------------------------------------------------------------------------

/// A window length: `multiplier` whole `unit`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalSpec {
    pub multiplier: u32,
    pub unit: IntervalUnit,
}

impl IntervalSpec {
    pub fn new(multiplier: u32, unit: IntervalUnit) -> Self {
        Self {
            multiplier: multiplier.max(1),
            unit,
        }
    }

    pub fn unit(unit: IntervalUnit) -> Self {
        Self::new(1, unit)
    }
}

/// Parse an interval descriptor.
///
/// Empty (or all-whitespace) input means "no interval": the caller bins the
/// whole range into a single window.
pub fn parse_interval(input: &str) -> CoreResult<Option<IntervalSpec>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    interval_spec.parse(trimmed).map(Some).map_err(|e| {
        StructError::from(CoreReason::MalformedInterval)
            .with_detail(format!("interval {trimmed:?}: {e}"))
    })
}

impl FromStr for IntervalSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        parse_interval(s)?.ok_or_else(|| {
            StructError::from(CoreReason::MalformedInterval).with_detail("empty interval")
        })
    }
}

/// Canonical text: bare unit name for single units, `<n>min` / `<n>sec` for
/// compound sub-hour intervals.
impl fmt::Display for IntervalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.multiplier, self.unit) {
            (1, unit) => write!(f, "{unit}"),
            (n, IntervalUnit::Minute) => write!(f, "{n}min"),
            (n, IntervalUnit::Second) => write!(f, "{n}sec"),
            (n, unit) => write!(f, "{n} {unit}s"),
        }
    }
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

fn interval_spec(input: &mut &str) -> ModalResult<IntervalSpec> {
    alt((compound_interval, bare_interval)).parse_next(input)
}

/// `<digits><suffix>`, restricted to minute and second suffixes.
fn compound_interval(input: &mut &str) -> ModalResult<IntervalSpec> {
    let digits = digit1.parse_next(input)?;
    let multiplier: u32 = digits
        .parse()
        .map_err(|_| ErrMode::Cut(ContextError::new()))?;
    let unit = cut_err(alpha1.verify_map(IntervalUnit::from_compound_suffix))
        .context(StrContext::Expected(StrContextValue::Description(
            "compound unit (min|sec)",
        )))
        .parse_next(input)?;
    if multiplier == 0 {
        return Err(ErrMode::Cut(ContextError::new()));
    }
    Ok(IntervalSpec { multiplier, unit })
}

fn bare_interval(input: &mut &str) -> ModalResult<IntervalSpec> {
    alpha1
        .verify_map(IntervalUnit::from_name)
        .context(StrContext::Expected(StrContextValue::Description(
            "unit (second|minute|hour|day|week|month|quarter|year)",
        )))
        .map(IntervalSpec::unit)
        .parse_next(input)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
