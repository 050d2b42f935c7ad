mod options;


pub use options::RollupOptions;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use orion_error::prelude::*;
use serde::{Serialize, Serializer};

use crate::aggregate::aggregate;
use crate::binner::{Binner, TimedRecords};
use crate::error::{CoreReason, CoreResult};
use crate::fill::{WindowOutcome, fill_if_empty};
use crate::floor::floor_window;
use crate::record::{Record, Timestamp, Value};

// ---------------------------------------------------------------------------
// Bin
// ---------------------------------------------------------------------------

/// One output record of a rollup.
///
/// `record` carries the aggregated (or filled) fields with the timestamp
/// field set to the window start and, for filled bins, the generated marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: DateTime<Tz>,
    pub generated: bool,
    pub record: Record,
}

impl Bin {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    /// Numeric value of `field`, if present and numeric.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.record.get(field).and_then(Value::as_number)
    }

    pub fn epoch_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }
}

impl Serialize for Bin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Downsample `records` into time-aligned bins.
///
/// Records are range-filtered by the caller's `start`/`end` (inclusive),
/// the range defaults to the earliest/latest remaining timestamp, and with
/// an interval the start is floored to the interval's alignment. Each window
/// is aggregated, restricted to `fields`, and gap-filled when empty. The run
/// fails as a whole on the first unreadable timestamp; no partial output.
pub fn timeseries(records: &[Record], options: &RollupOptions) -> CoreResult<Vec<Bin>> {
    let tz = options.tz;
    let time_field = options.timestamp_field.as_str();

    let mut timed = TimedRecords::index(records, time_field)?;
    timed.retain_range(
        options.start.map(|t| t.epoch_millis()),
        options.end.map(|t| t.epoch_millis()),
    );

    let bounds = timed.bounds();
    let start = match (options.start, bounds) {
        (Some(start), _) => start.to_zoned(tz)?,
        (None, Some((lo, _))) => zoned_millis(tz, lo)?,
        (None, None) => {
            log::debug!("rollup: no records in range and no start; nothing to bin");
            return Ok(Vec::new());
        }
    };
    let end = match (options.end, bounds) {
        (Some(end), _) => end.to_zoned(tz)?,
        (None, Some((_, hi))) => zoned_millis(tz, hi)?,
        (None, None) => {
            log::debug!("rollup: no records in range and no end; nothing to bin");
            return Ok(Vec::new());
        }
    };
    let start = match &options.interval {
        Some(spec) => floor_window(start, spec)?,
        None => start,
    };

    let candidates: Vec<String> = match &options.fields {
        Some(fields) => fields.clone(),
        None => timed
            .first_in_input_order()
            .map(|r| r.keys().map(str::to_string).collect())
            .unwrap_or_default(),
    };
    let marker = options.indicate_generated.as_deref();

    let mut bins: Vec<Bin> = Vec::new();
    let mut prior: Option<Record> = None;
    let mut windows = 0usize;
    let mut filled = 0usize;

    for item in Binner::new(&timed, start, end, options.interval) {
        let (window, hits) = item?;
        windows += 1;

        let mut merged = aggregate(&hits, &options.fcn, time_field);
        if let Some(fields) = &options.fields {
            merged.retain_named(fields);
        }

        let (mut record, generated) = match fill_if_empty(
            merged,
            prior.as_ref(),
            options.fill.as_ref(),
            &candidates,
            marker,
        ) {
            WindowOutcome::Aggregated(r) => (r, false),
            WindowOutcome::Filled(r) => (r, true),
            WindowOutcome::Omitted => continue,
        };
        if generated {
            filled += 1;
        }

        prior = Some(record.clone());
        record.insert(time_field, Value::Time(Timestamp::Zoned(window.start)));
        bins.push(Bin {
            start: window.start,
            generated,
            record,
        });
    }

    log::debug!(
        "rollup: {} records, {windows} windows, {} bins ({filled} filled)",
        timed.len(),
        bins.len()
    );
    Ok(bins)
}

fn zoned_millis(tz: Tz, ms: i64) -> CoreResult<DateTime<Tz>> {
    tz.timestamp_millis_opt(ms).single().ok_or_else(|| {
        StructError::from(CoreReason::InvalidTimestamp)
            .with_detail(format!("epoch milliseconds {ms} out of range"))
    })
}
