use orion_error::prelude::*;
use rollup_config::FillSetting;

use crate::error::{CoreReason, CoreResult};
use crate::record::{Record, Value};

/// How a window without source records is represented.
#[derive(Debug, Clone, PartialEq)]
pub enum FillPolicy {
    /// Every candidate field is `0`.
    Zeros,
    /// Every candidate field is `NaN`.
    Nans,
    /// Repeat the previous emitted bin; all-zero before the first one.
    Previous,
    /// Every candidate field is this literal.
    Value(Value),
}

impl FillPolicy {
    /// Parse a fill policy from text. `none` (or empty) means no fill.
    ///
    /// Recognized: `zeros`, `nans`, `previous`, finite numbers, `true`,
    /// `false` and `null`. Anything else is rejected.
    pub fn parse(text: &str) -> CoreResult<Option<FillPolicy>> {
        let t = text.trim();
        let policy = match t {
            "" | "none" => return Ok(None),
            "zeros" => FillPolicy::Zeros,
            "nans" => FillPolicy::Nans,
            "previous" => FillPolicy::Previous,
            "true" => FillPolicy::Value(Value::Bool(true)),
            "false" => FillPolicy::Value(Value::Bool(false)),
            "null" => FillPolicy::Value(Value::Null),
            other => match other.parse::<f64>() {
                Ok(n) if n.is_finite() => FillPolicy::Value(Value::Number(n)),
                _ => {
                    return StructError::from(CoreReason::UnsupportedFill)
                        .with_detail(format!(
                            "fill {other:?} (expected none|zeros|nans|previous or a literal)"
                        ))
                        .err();
                }
            },
        };
        Ok(Some(policy))
    }

    /// Resolve a configured fill setting.
    pub fn from_setting(setting: &FillSetting) -> CoreResult<Option<FillPolicy>> {
        match setting {
            FillSetting::Number(n) if n.is_finite() => {
                Ok(Some(FillPolicy::Value(Value::Number(*n))))
            }
            FillSetting::Number(n) => StructError::from(CoreReason::UnsupportedFill)
                .with_detail(format!("fill literal {n} is not finite"))
                .err(),
            FillSetting::Bool(b) => Ok(Some(FillPolicy::Value(Value::Bool(*b)))),
            FillSetting::Text(t) => FillPolicy::parse(t),
        }
    }

    fn synthesize(&self, prior: Option<&Record>, candidates: &[String]) -> Record {
        match (self, prior) {
            (FillPolicy::Previous, Some(prior)) => prior.clone(),
            (FillPolicy::Previous, None) | (FillPolicy::Zeros, _) => {
                uniform(candidates, Value::Number(0.0))
            }
            (FillPolicy::Nans, _) => uniform(candidates, Value::Number(f64::NAN)),
            (FillPolicy::Value(v), _) => uniform(candidates, v.clone()),
        }
    }
}

fn uniform(fields: &[String], value: Value) -> Record {
    fields.iter().map(|f| (f.clone(), value.clone())).collect()
}

/// What became of one window.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    /// The window had data; the aggregate stands.
    Aggregated(Record),
    /// The window was empty and the fill policy produced this record.
    Filled(Record),
    /// The window produces no bin.
    Omitted,
}

/// Substitute a synthesized record for an empty window aggregate.
///
/// A non-empty `aggregated` record passes through untouched. An empty one
/// is omitted when no policy is configured; otherwise it is replaced per
/// `fill`, with `marker` (if any) set to `true`. A synthesized record that
/// ends up with no fields at all is omitted too.
pub fn fill_if_empty(
    aggregated: Record,
    prior: Option<&Record>,
    fill: Option<&FillPolicy>,
    candidates: &[String],
    marker: Option<&str>,
) -> WindowOutcome {
    if !aggregated.is_empty() {
        return WindowOutcome::Aggregated(aggregated);
    }
    let Some(policy) = fill else {
        return WindowOutcome::Omitted;
    };

    let mut filled = policy.synthesize(prior, candidates);
    if let Some(marker) = marker {
        filled.insert(marker, true);
    }
    if filled.is_empty() {
        WindowOutcome::Omitted
    } else {
        WindowOutcome::Filled(filled)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_keywords_and_literals() {
        assert_eq!(FillPolicy::parse("none").unwrap(), None);
        assert_eq!(FillPolicy::parse("zeros").unwrap(), Some(FillPolicy::Zeros));
        assert_eq!(FillPolicy::parse("nans").unwrap(), Some(FillPolicy::Nans));
        assert_eq!(FillPolicy::parse("previous").unwrap(), Some(FillPolicy::Previous));
        assert_eq!(
            FillPolicy::parse("0").unwrap(),
            Some(FillPolicy::Value(Value::Number(0.0)))
        );
        assert_eq!(
            FillPolicy::parse("-1.5").unwrap(),
            Some(FillPolicy::Value(Value::Number(-1.5)))
        );
    }

    #[test]
    fn parse_rejects_unknown_policy() {
        assert!(FillPolicy::parse("linear").is_err());
        assert!(FillPolicy::parse("inf").is_err());
    }

    #[test]
    fn from_setting_number_and_text() {
        assert_eq!(
            FillPolicy::from_setting(&FillSetting::Number(0.0)).unwrap(),
            Some(FillPolicy::Value(Value::Number(0.0)))
        );
        assert_eq!(
            FillPolicy::from_setting(&FillSetting::Text("previous".into())).unwrap(),
            Some(FillPolicy::Previous)
        );
        assert!(FillPolicy::from_setting(&FillSetting::Text("bogus".into())).is_err());
    }

    #[test]
    fn aggregated_passes_through() {
        let agg = Record::new().with("v", 1.0);
        let out = fill_if_empty(agg.clone(), None, Some(&FillPolicy::Zeros), &[], Some("g"));
        assert_eq!(out, WindowOutcome::Aggregated(agg));
    }

    #[test]
    fn no_policy_omits() {
        let out = fill_if_empty(Record::new(), None, None, &names(&["v"]), None);
        assert_eq!(out, WindowOutcome::Omitted);
    }

    #[test]
    fn zeros_and_literal() {
        let c = names(&["v1", "v2"]);
        let out = fill_if_empty(Record::new(), None, Some(&FillPolicy::Zeros), &c, None);
        assert_eq!(
            out,
            WindowOutcome::Filled(Record::new().with("v1", 0.0).with("v2", 0.0))
        );
        let seven = FillPolicy::Value(Value::Number(7.0));
        let out = fill_if_empty(Record::new(), None, Some(&seven), &c, Some("generated"));
        assert_eq!(
            out,
            WindowOutcome::Filled(
                Record::new()
                    .with("v1", 7.0)
                    .with("v2", 7.0)
                    .with("generated", true)
            )
        );
    }

    #[test]
    fn nans_fill() {
        let out = fill_if_empty(Record::new(), None, Some(&FillPolicy::Nans), &names(&["v"]), None);
        let WindowOutcome::Filled(r) = out else {
            panic!("expected filled record");
        };
        assert!(matches!(r.get("v"), Some(Value::Number(n)) if n.is_nan()));
    }

    #[test]
    fn previous_copies_prior_or_falls_back_to_zero() {
        let c = names(&["v"]);
        let prior = Record::new().with("v", 30.0);
        let out = fill_if_empty(Record::new(), Some(&prior), Some(&FillPolicy::Previous), &c, None);
        assert_eq!(out, WindowOutcome::Filled(prior));

        let out = fill_if_empty(Record::new(), None, Some(&FillPolicy::Previous), &c, None);
        assert_eq!(out, WindowOutcome::Filled(Record::new().with("v", 0.0)));
    }

    #[test]
    fn nothing_to_fill_is_omitted() {
        let out = fill_if_empty(Record::new(), None, Some(&FillPolicy::Zeros), &[], None);
        assert_eq!(out, WindowOutcome::Omitted);
    }

    #[test]
    fn marker_alone_still_emits() {
        let out = fill_if_empty(Record::new(), None, Some(&FillPolicy::Zeros), &[], Some("g"));
        assert_eq!(out, WindowOutcome::Filled(Record::new().with("g", true)));
    }
}
