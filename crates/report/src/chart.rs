//! Aggregation and text rendering of a result table.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ReportError;
use crate::table::ResultTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// Sum `value` per distinct `key`, largest total first, ties by key.
///
/// Rows with a NULL value contribute nothing; a NULL key groups as `"NULL"`.
pub fn group_totals(table: &ResultTable, key: &str, value: &str) -> Result<Vec<GroupTotal>, ReportError> {
    let key_idx = table
        .column_index(key)
        .ok_or_else(|| ReportError::MissingColumn { column: key.to_string() })?;
    let value_idx = table
        .column_index(value)
        .ok_or_else(|| ReportError::MissingColumn { column: value.to_string() })?;

    let mut sums: HashMap<String, f64> = HashMap::new();
    for (row_no, row) in table.rows.iter().enumerate() {
        let group = row.get(key_idx).and_then(|c| c.as_deref()).unwrap_or("NULL");
        let entry = sums.entry(group.to_string()).or_insert(0.0);
        let Some(raw) = row.get(value_idx).and_then(|c| c.as_deref()) else {
            continue;
        };
        let parsed: f64 = raw.trim().parse().map_err(|_| ReportError::NotNumeric {
            row: row_no,
            column: value.to_string(),
            value: raw.to_string(),
        })?;
        *entry += parsed;
    }

    let mut totals: Vec<GroupTotal> = sums.into_iter().map(|(key, total)| GroupTotal { key, total }).collect();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    Ok(totals)
}

/// Horizontal bar chart, one line per group, bars scaled to `width` columns.
pub fn render_bar_chart(title: &str, totals: &[GroupTotal], width: usize) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.chars().count()));
    out.push('\n');

    if totals.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let label_width = totals.iter().map(|t| t.key.chars().count()).max().unwrap_or(0);
    let max = totals.iter().map(|t| t.total).fold(0.0_f64, f64::max);

    for t in totals {
        let len = if max > 0.0 && t.total > 0.0 {
            ((t.total / max) * width as f64).round().max(1.0) as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<label_width$} | {} {}\n",
            t.key,
            "#".repeat(len),
            format_number(t.total)
        ));
    }
    out
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
