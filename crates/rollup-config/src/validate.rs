use std::collections::HashSet;

use crate::rollup::RollupSection;

/// Structural checks on the `[rollup]` section that do not need the engine:
/// whitelisted field names must be non-empty and unique, and the generated
/// marker must not collide with the timestamp field.
pub fn validate_rollup(section: &RollupSection) -> anyhow::Result<()> {
    if let Some(fields) = &section.fields {
        let mut seen = HashSet::new();
        for name in fields {
            if name.trim().is_empty() {
                anyhow::bail!("rollup.fields contains an empty field name");
            }
            if !seen.insert(name.as_str()) {
                anyhow::bail!("rollup.fields lists {name:?} more than once");
            }
        }
    }

    if let Some(marker) = &section.indicate_generated {
        if marker.trim().is_empty() {
            anyhow::bail!("rollup.indicate_generated must not be empty");
        }
        if marker == section.timestamp_field() {
            anyhow::bail!(
                "rollup.indicate_generated {marker:?} collides with the timestamp field"
            );
        }
    }

    if section.timestamp_field.as_deref().is_some_and(|f| f.trim().is_empty()) {
        anyhow::bail!("rollup.timestamp_field must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(toml_str: &str) -> RollupSection {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn accepts_plain_section() {
        let s = section(
            r#"
fields = ["v1", "v2"]
indicate_generated = "generated"
"#,
        );
        assert!(validate_rollup(&s).is_ok());
    }

    #[test]
    fn rejects_duplicate_fields() {
        let s = section(r#"fields = ["v1", "v1"]"#);
        let err = validate_rollup(&s).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_empty_field_name() {
        let s = section(r#"fields = ["v1", " "]"#);
        assert!(validate_rollup(&s).is_err());
    }

    #[test]
    fn rejects_marker_on_timestamp_field() {
        let s = section(
            r#"
timestamp_field = "ts"
indicate_generated = "ts"
"#,
        );
        let err = validate_rollup(&s).unwrap_err();
        assert!(err.to_string().contains("collides"));
    }
}
