use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FcnSetting
// ---------------------------------------------------------------------------

/// Aggregator selection as written in `rollup.toml`: either one kind name for
/// every numeric field (`fcn = "mean"`) or a per-field table
/// (`fcn = { v1 = "mean", v2 = "max" }`).
///
/// Kind names are checked when the core resolves the run options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FcnSetting {
    Single(String),
    PerField(BTreeMap<String, String>),
}

impl Default for FcnSetting {
    fn default() -> Self {
        Self::Single("sum".to_string())
    }
}

/// Command-line form: `mean` for every field, or `v1=mean,v2=max`.
/// Kind names are not checked here.
impl FromStr for FcnSetting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        if !s.contains('=') {
            return Ok(Self::Single(s.trim().to_string()));
        }
        let mut map = BTreeMap::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((field, kind)) = pair.split_once('=') else {
                anyhow::bail!("expected field=kind, got '{pair}'");
            };
            map.insert(field.trim().to_string(), kind.trim().to_string());
        }
        Ok(Self::PerField(map))
    }
}

// ---------------------------------------------------------------------------
// FillSetting
// ---------------------------------------------------------------------------

/// Gap-fill policy as written in `rollup.toml`: a numeric or boolean literal,
/// or one of the policy keywords (`none`, `zeros`, `nans`, `previous`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FillSetting {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for FillSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Command-line form: numbers and `true`/`false` are literals, anything
/// else is a keyword.
impl FromStr for FillSetting {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<f64>() {
            return Ok(Self::Number(n));
        }
        Ok(match s {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            other => Self::Text(other.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
