use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use orion_error::prelude::*;
use rollup_config::FcnSetting;

use crate::error::{CoreError, CoreReason, CoreResult};

/// How the numeric values of one field are combined within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AggKind {
    #[default]
    Sum,
    Min,
    Max,
    Mean,
    Count,
}

impl AggKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggKind::Sum => "sum",
            AggKind::Min => "min",
            AggKind::Max => "max",
            AggKind::Mean => "mean",
            AggKind::Count => "count",
        }
    }
}

impl FromStr for AggKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggKind::Sum),
            "min" => Ok(AggKind::Min),
            "max" => Ok(AggKind::Max),
            "mean" | "avg" => Ok(AggKind::Mean),
            "count" => Ok(AggKind::Count),
            _ => StructError::from(CoreReason::UnknownAggregator)
                .with_detail(format!(
                    "unknown aggregator {s:?} (expected sum|min|max|mean|count)"
                ))
                .err(),
        }
    }
}

impl fmt::Display for AggKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregator selection for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FcnSpec {
    /// One kind for every numeric field.
    All(AggKind),
    /// Per-field kinds; fields not listed use `sum`.
    PerField(BTreeMap<String, AggKind>),
}

impl FcnSpec {
    pub fn kind_for(&self, field: &str) -> AggKind {
        match self {
            FcnSpec::All(kind) => *kind,
            FcnSpec::PerField(map) => map.get(field).copied().unwrap_or_default(),
        }
    }

    /// Resolve a configured selection, rejecting unknown kind names.
    pub fn from_setting(setting: &FcnSetting) -> CoreResult<FcnSpec> {
        match setting {
            FcnSetting::Single(name) => Ok(FcnSpec::All(name.parse()?)),
            FcnSetting::PerField(map) => {
                let mut kinds = BTreeMap::new();
                for (field, name) in map {
                    kinds.insert(field.clone(), name.parse()?);
                }
                Ok(FcnSpec::PerField(kinds))
            }
        }
    }
}

impl Default for FcnSpec {
    fn default() -> Self {
        FcnSpec::All(AggKind::Sum)
    }
}

impl From<AggKind> for FcnSpec {
    fn from(kind: AggKind) -> Self {
        FcnSpec::All(kind)
    }
}

impl FromStr for FcnSpec {
    type Err = CoreError;

    /// `mean` selects one kind for all fields; `v1=mean,v2=max` selects per field.
    fn from_str(s: &str) -> CoreResult<Self> {
        let setting = s.parse::<FcnSetting>().map_err(|e| {
            StructError::from(CoreReason::UnknownAggregator).with_detail(e.to_string())
        })?;
        FcnSpec::from_setting(&setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kinds() {
        assert_eq!("sum".parse::<AggKind>().unwrap(), AggKind::Sum);
        assert_eq!("MAX".parse::<AggKind>().unwrap(), AggKind::Max);
        assert_eq!("avg".parse::<AggKind>().unwrap(), AggKind::Mean);
        assert!("median".parse::<AggKind>().is_err());
    }

    #[test]
    fn per_field_defaults_to_sum() {
        let spec: FcnSpec = "v1=mean, v2=max".parse().unwrap();
        assert_eq!(spec.kind_for("v1"), AggKind::Mean);
        assert_eq!(spec.kind_for("v2"), AggKind::Max);
        assert_eq!(spec.kind_for("v3"), AggKind::Sum);
    }

    #[test]
    fn single_kind_applies_everywhere() {
        let spec: FcnSpec = "count".parse().unwrap();
        assert_eq!(spec.kind_for("anything"), AggKind::Count);
    }

    #[test]
    fn from_setting_rejects_unknown() {
        let mut map = BTreeMap::new();
        map.insert("v1".to_string(), "median".to_string());
        assert!(FcnSpec::from_setting(&FcnSetting::PerField(map)).is_err());
        assert_eq!(
            FcnSpec::from_setting(&FcnSetting::Single("min".into())).unwrap(),
            FcnSpec::All(AggKind::Min)
        );
    }
}
