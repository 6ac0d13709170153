//! JSON export of the rendered table.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::{RowView, TableSummary};

#[derive(Serialize)]
struct Export<'a> {
    summary: TableSummary,
    rows: &'a [RowView],
}

/// Render `rows` as pretty JSON.
pub fn export_json(rows: &[RowView]) -> Result<String> {
    let export = Export {
        summary: TableSummary::from_rows(rows),
        rows,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Write `rows` as pretty JSON to `path`.
pub fn write_export(path: &Path, rows: &[RowView]) -> Result<()> {
    let json = export_json(rows)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::render_table;
    use crate::source::decode_snapshot;

    #[test]
    fn test_export_shape() {
        let snapshot = decode_snapshot(
            br#"{"10.0.0.1": {"name":"router","last_success":"t0","history":[5,8,-1,12]}}"#,
        )
        .unwrap();
        let json = export_json(&render_table(&snapshot)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["up"], 1);

        let row = &value["rows"][0];
        assert_eq!(row["name"], "router");
        assert_eq!(row["address"], "10.0.0.1");
        assert_eq!(row["last_success"], "t0");
        assert_eq!(row["latest_label"], "12ms");
        assert!(row.get("latest").is_none());

        let tokens = row["history_tokens"].as_array().unwrap();
        let symbols: Vec<&str> = tokens.iter().map(|t| t["symbol"].as_str().unwrap()).collect();
        let colors: Vec<&str> = tokens.iter().map(|t| t["color"].as_str().unwrap()).collect();
        assert_eq!(symbols, vec!["▁", "×", "▁", "▁"]);
        assert_eq!(colors, vec!["fast", "neutral", "fast", "fast"]);
    }

    #[test]
    fn test_export_empty_table() {
        let value: serde_json::Value = serde_json::from_str(&export_json(&[]).unwrap()).unwrap();
        assert_eq!(value["summary"]["total"], 0);
        assert!(value["rows"].as_array().unwrap().is_empty());
    }
}
