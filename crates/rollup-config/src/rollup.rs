use serde::Deserialize;

use crate::types::{FcnSetting, FillSetting};

/// Run options from the `[rollup]` section of `rollup.toml`.
///
/// Every key is optional; absent keys fall back to the engine defaults
/// (timestamp field `"timestamp"`, timezone `UTC`, one whole-range window,
/// `sum` aggregation, no gap fill). `start` and `end` hold time specs that
/// the runtime resolves against `tz`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RollupSection {
    pub timestamp_field: Option<String>,
    pub tz: Option<String>,
    pub interval: Option<String>,
    pub fields: Option<Vec<String>>,
    pub fcn: Option<FcnSetting>,
    pub fill: Option<FillSetting>,
    pub indicate_generated: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RollupSection {
    pub fn timestamp_field(&self) -> &str {
        self.timestamp_field.as_deref().unwrap_or("timestamp")
    }

    /// Overlay `other` on top of `self`: keys set in `other` win.
    pub fn merged_with(mut self, other: RollupSection) -> RollupSection {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            timestamp_field,
            tz,
            interval,
            fields,
            fcn,
            fill,
            indicate_generated,
            start,
            end
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let s: RollupSection = toml::from_str("").unwrap();
        assert_eq!(s.timestamp_field(), "timestamp");
        assert!(s.interval.is_none());
        assert!(s.fill.is_none());
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(toml::from_str::<RollupSection>(r#"intervall = "day""#).is_err());
    }

    #[test]
    fn merge_prefers_overlay() {
        let base: RollupSection = toml::from_str(
            r#"
interval = "week"
tz = "America/Los_Angeles"
fill = 0
"#,
        )
        .unwrap();
        let overlay = RollupSection {
            interval: Some("15min".into()),
            ..Default::default()
        };
        let merged = base.merged_with(overlay);
        assert_eq!(merged.interval.as_deref(), Some("15min"));
        assert_eq!(merged.tz.as_deref(), Some("America/Los_Angeles"));
        assert_eq!(merged.fill, Some(FillSetting::Number(0.0)));
    }
}
