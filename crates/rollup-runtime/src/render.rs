use std::fmt::Write as _;

use chrono_tz::Tz;
use orion_error::compat_prelude::*;
use rollup_core::{Bin, Value};

use crate::error::RuntimeResult;

const TABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Column-aligned text table of `bins`.
///
/// Columns are the union of field names in first-seen order; timestamps are
/// shown in `tz`. A bin lacking a column leaves the cell blank.
pub fn render_table(bins: &[Bin], tz: Tz) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for bin in bins {
        for key in bin.record.keys() {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
    }

    let rows: Vec<Vec<String>> = bins
        .iter()
        .map(|bin| {
            columns
                .iter()
                .map(|c| bin.get(c).map(|v| cell(v, tz)).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, columns.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (cell, &width) in cells.zip(widths) {
        if !line.is_empty() {
            line.push_str("  ");
        }
        write!(line, "{cell:<width$}").ok();
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn cell(value: &Value, tz: Tz) -> String {
    match value {
        Value::Time(ts) => match ts.to_zoned(tz) {
            Ok(dt) => dt.format(TABLE_TIME_FORMAT).to_string(),
            Err(_) => value.to_string(),
        },
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One JSON object per bin, newline-terminated.
pub fn render_json(bins: &[Bin]) -> RuntimeResult<String> {
    let mut out = String::new();
    for bin in bins {
        out.push_str(&serde_json::to_string(bin).owe_data()?);
        out.push('\n');
    }
    Ok(out)
}
