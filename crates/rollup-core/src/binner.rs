use chrono::DateTime;
use chrono_tz::Tz;
use orion_error::prelude::*;

use crate::calendar;
use crate::error::{CoreReason, CoreResult};
use crate::interval::{IntervalSpec, IntervalUnit};
use crate::record::{Record, Timestamp};

// ---------------------------------------------------------------------------
// TimedRecords: input records indexed by timestamp
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Timed<'a> {
    at_ms: i64,
    /// Position in the caller's input, used to restore input order per window.
    index: usize,
    record: &'a Record,
}

/// Input records sorted once by timestamp so each window is a range lookup.
#[derive(Debug, Clone, Default)]
pub struct TimedRecords<'a> {
    entries: Vec<Timed<'a>>,
}

impl<'a> TimedRecords<'a> {
    /// Read every record's `time_field`. One unreadable timestamp fails the
    /// whole batch.
    pub fn index(records: &'a [Record], time_field: &str) -> CoreResult<TimedRecords<'a>> {
        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let value = record.get(time_field).ok_or_else(|| {
                StructError::from(CoreReason::InvalidTimestamp)
                    .with_detail(format!("record {index} has no {time_field:?} field"))
            })?;
            let at = Timestamp::from_value(value).map_err(|e| {
                StructError::from(CoreReason::InvalidTimestamp)
                    .with_detail(format!("record {index}: {e}"))
            })?;
            entries.push(Timed {
                at_ms: at.epoch_millis(),
                index,
                record,
            });
        }
        entries.sort_by_key(|t| t.at_ms);
        Ok(TimedRecords { entries })
    }

    /// Drop records outside the inclusive range `[lo, hi]`; `None` leaves
    /// that side open.
    pub fn retain_range(&mut self, lo: Option<i64>, hi: Option<i64>) {
        self.entries.retain(|t| {
            lo.is_none_or(|lo| t.at_ms >= lo) && hi.is_none_or(|hi| t.at_ms <= hi)
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The retained record that came first in the caller's input.
    pub fn first_in_input_order(&self) -> Option<&'a Record> {
        self.entries.iter().min_by_key(|t| t.index).map(|t| t.record)
    }

    /// Earliest and latest timestamps, in epoch milliseconds.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        Some((self.entries.first()?.at_ms, self.entries.last()?.at_ms))
    }

    /// Records with `lo <= t < hi` (or `<= hi` when `closed`), in input order.
    fn select(&self, lo: i64, hi: i64, closed: bool) -> Vec<&'a Record> {
        let from = self.entries.partition_point(|t| t.at_ms < lo);
        let to = if closed {
            self.entries.partition_point(|t| t.at_ms <= hi)
        } else {
            self.entries.partition_point(|t| t.at_ms < hi)
        };
        if from >= to {
            return Vec::new();
        }
        let mut hits: Vec<Timed<'a>> = self.entries[from..to].to_vec();
        hits.sort_by_key(|t| t.index);
        hits.into_iter().map(|t| t.record).collect()
    }
}

// ---------------------------------------------------------------------------
// Window / Binner
// ---------------------------------------------------------------------------

/// One time window. `start` becomes the bin's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// `true` only for the single whole-range window, which includes `end`.
    pub closed: bool,
}

/// Walks contiguous windows from `start` until a window would begin after
/// `end`, yielding each window with the records that fall inside it.
///
/// The first window is always produced, even when `start > end`. Without an
/// interval exactly one window spans `[start, end]`.
///
/// Boundary `k` is `start` advanced by `k` intervals in one step, never by
/// chaining off the previous boundary, so a day start pushed forward by a DST
/// gap does not drag later windows with it. Calendar units are re-aligned to
/// the start of their unit after each step.
pub struct Binner<'r, 'a> {
    records: &'r TimedRecords<'a>,
    anchor: DateTime<Tz>,
    steps: u32,
    next_start: Option<DateTime<Tz>>,
    end: DateTime<Tz>,
    spec: Option<IntervalSpec>,
}

impl<'r, 'a> Binner<'r, 'a> {
    pub fn new(
        records: &'r TimedRecords<'a>,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        spec: Option<IntervalSpec>,
    ) -> Self {
        Self {
            records,
            anchor: start,
            steps: 0,
            next_start: Some(start),
            end,
            spec,
        }
    }

    /// Start of window `k`.
    fn boundary(&self, spec: IntervalSpec, k: u32) -> CoreResult<DateTime<Tz>> {
        let n = spec.multiplier.checked_mul(k).ok_or_else(|| {
            StructError::from(CoreReason::MalformedInterval)
                .with_detail(format!("too many {spec} windows after {}", self.anchor))
        })?;
        let shifted = calendar::add(self.anchor, n, spec.unit)?;
        match spec.unit {
            IntervalUnit::Second | IntervalUnit::Minute | IntervalUnit::Hour => Ok(shifted),
            unit => calendar::start_of(shifted, unit),
        }
    }

    fn step(&mut self, start: DateTime<Tz>) -> CoreResult<(Window, Vec<&'a Record>)> {
        let Some(spec) = self.spec else {
            let window = Window {
                start,
                end: self.end,
                closed: true,
            };
            let hits = self.records.select(
                start.timestamp_millis(),
                self.end.timestamp_millis(),
                true,
            );
            return Ok((window, hits));
        };

        self.steps += 1;
        let end = self.boundary(spec, self.steps)?;
        if end <= start {
            return StructError::from(CoreReason::MalformedInterval)
                .with_detail(format!("interval {spec} does not advance past {start}"))
                .err();
        }
        let hits = self
            .records
            .select(start.timestamp_millis(), end.timestamp_millis(), false);
        if end <= self.end {
            self.next_start = Some(end);
        }
        Ok((
            Window {
                start,
                end,
                closed: false,
            },
            hits,
        ))
    }
}

impl<'a> Iterator for Binner<'_, 'a> {
    type Item = CoreResult<(Window, Vec<&'a Record>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start.take()?;
        Some(self.step(start))
    }
}

/// Collect every window between `start` and `end`.
pub fn assign_windows<'a>(
    records: &TimedRecords<'a>,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    spec: Option<IntervalSpec>,
) -> CoreResult<Vec<(Window, Vec<&'a Record>)>> {
    Binner::new(records, start, end, spec).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
