use std::path::Path;

use chrono::{DateTime, Utc};
use orion_error::prelude::*;
use rollup_config::RollupSection;
use rollup_core::{Bin, RollupOptions};

use crate::adapter::run_rollup;
use crate::error::RuntimeResult;
use crate::loader::load_records;
use crate::timespec::parse_time_spec;

/// Turn a `[rollup]` section into run options, resolving `start` / `end`
/// time specs against `now` in the section's timezone.
pub fn resolve_options(section: &RollupSection, now: DateTime<Utc>) -> RuntimeResult<RollupOptions> {
    let mut options = RollupOptions::from_config(section).err_conv()?;
    if let Some(spec) = &section.start {
        options.start = Some(parse_time_spec(spec, options.tz, now)?);
    }
    if let Some(spec) = &section.end {
        options.end = Some(parse_time_spec(spec, options.tz, now)?);
    }
    rl_debug!(
        conf,
        tz = %options.tz,
        interval = %options.interval.map(|i| i.to_string()).unwrap_or_else(|| "none".into()),
        fill = ?options.fill,
        "rollup options resolved"
    );
    Ok(options)
}

/// Load `data` and roll it up with the settings in `section`.
pub async fn run_job(data: &Path, section: &RollupSection) -> RuntimeResult<Vec<Bin>> {
    let options = resolve_options(section, Utc::now())?;
    let records = load_records(data, &options.timestamp_field)?;
    if records.is_empty() {
        rl_warn!(data, path = %data.display(), "no records in input");
    }
    run_rollup(records, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rollup_config::{FcnSetting, FillSetting};
    use rollup_core::{AggKind, FcnSpec, FillPolicy, IntervalSpec, IntervalUnit, Timestamp};

    #[test]
    fn section_resolves_to_options() {
        let section = RollupSection {
            tz: Some("America/Los_Angeles".into()),
            interval: Some("15min".into()),
            fcn: Some(FcnSetting::Single("mean".into())),
            fill: Some(FillSetting::Text("previous".into())),
            start: Some("2017-02-01".into()),
            end: Some("1488355200000".into()),
            ..RollupSection::default()
        };
        let now = Utc.with_ymd_and_hms(2017, 3, 1, 0, 0, 0).unwrap();
        let options = resolve_options(&section, now).unwrap();
        assert_eq!(options.interval, Some(IntervalSpec::new(15, IntervalUnit::Minute)));
        assert_eq!(options.fcn, FcnSpec::All(AggKind::Mean));
        assert_eq!(options.fill, Some(FillPolicy::Previous));
        // Midnight in Los Angeles.
        assert_eq!(options.start.map(|t| t.epoch_millis()), Some(1_485_936_000_000));
        assert_eq!(options.end, Some(Timestamp::EpochMillis(1_488_355_200_000)));
    }

    #[test]
    fn bad_time_spec_fails() {
        let section = RollupSection {
            start: Some("last tuesday".into()),
            ..RollupSection::default()
        };
        assert!(resolve_options(&section, Utc::now()).is_err());
    }
}
