//! Downsampling of timestamped records into regular, time-aligned bins.
//!
//! [`timeseries`] is the entry point: it filters records to a range, walks
//! contiguous windows of an [`IntervalSpec`], reduces each window with the
//! selected aggregators, and gap-fills empty windows per [`FillPolicy`].

pub mod aggregate;
pub mod binner;
pub mod calendar;
pub mod error;
pub mod fill;
pub mod floor;
pub mod interval;
pub mod record;
pub mod rollup;

pub use aggregate::{AggKind, FcnSpec, aggregate};
pub use binner::{Binner, TimedRecords, Window, assign_windows};
pub use calendar::parse_tz;
pub use error::{CoreError, CoreReason, CoreResult};
pub use fill::{FillPolicy, WindowOutcome, fill_if_empty};
pub use floor::floor_window;
pub use interval::{IntervalSpec, IntervalUnit, parse_interval};
pub use record::{Record, Timestamp, Value};
pub use rollup::{Bin, RollupOptions, timeseries};
