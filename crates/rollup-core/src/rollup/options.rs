use chrono_tz::Tz;
use rollup_config::RollupSection;

use crate::aggregate::FcnSpec;
use crate::calendar::parse_tz;
use crate::error::CoreResult;
use crate::fill::FillPolicy;
use crate::interval::{IntervalSpec, parse_interval};
use crate::record::Timestamp;

/// Everything one rollup run needs besides the records.
#[derive(Debug, Clone)]
pub struct RollupOptions {
    /// Field holding each record's point-in-time.
    pub timestamp_field: String,
    /// Inclusive lower bound; defaults to the earliest record.
    pub start: Option<Timestamp>,
    /// Inclusive upper bound; defaults to the latest record.
    pub end: Option<Timestamp>,
    /// Timezone for calendar flooring and for output timestamps.
    pub tz: Tz,
    /// Window length; `None` bins the whole range into one window.
    pub interval: Option<IntervalSpec>,
    /// Output field whitelist.
    pub fields: Option<Vec<String>>,
    pub fcn: FcnSpec,
    /// Gap fill; `None` drops empty windows.
    pub fill: Option<FillPolicy>,
    /// Field set to `true` on filled bins.
    pub indicate_generated: Option<String>,
}

impl Default for RollupOptions {
    fn default() -> Self {
        Self {
            timestamp_field: "timestamp".to_string(),
            start: None,
            end: None,
            tz: Tz::UTC,
            interval: None,
            fields: None,
            fcn: FcnSpec::default(),
            fill: None,
            indicate_generated: None,
        }
    }
}

impl RollupOptions {
    /// Resolve a `[rollup]` config section.
    ///
    /// `start`/`end` are time specs that may be relative to the current
    /// time, so they are left for the caller to resolve.
    pub fn from_config(section: &RollupSection) -> CoreResult<RollupOptions> {
        let tz = match &section.tz {
            Some(name) => parse_tz(name)?,
            None => Tz::UTC,
        };
        let interval = match &section.interval {
            Some(text) => parse_interval(text)?,
            None => None,
        };
        let fcn = section
            .fcn
            .as_ref()
            .map(FcnSpec::from_setting)
            .transpose()?
            .unwrap_or_default();
        let fill = match &section.fill {
            Some(setting) => FillPolicy::from_setting(setting)?,
            None => None,
        };

        Ok(RollupOptions {
            timestamp_field: section.timestamp_field().to_string(),
            start: None,
            end: None,
            tz,
            interval,
            fields: section.fields.clone(),
            fcn,
            fill,
            indicate_generated: section.indicate_generated.clone(),
        })
    }

    pub fn with_range(mut self, start: impl Into<Timestamp>, end: impl Into<Timestamp>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    pub fn with_interval(mut self, interval: IntervalSpec) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_fill(mut self, fill: FillPolicy) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_fcn(mut self, fcn: impl Into<FcnSpec>) -> Self {
        self.fcn = fcn.into();
        self
    }

    pub fn with_tz(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }
}
