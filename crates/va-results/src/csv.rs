//! CSV export of result records.
//!
//! Each record is a block of `Results_*` header rows followed by one row per
//! field (`name,value,value,...`) and a blank separator line.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::{info, warn};
use va_core::ResultId;

use crate::ResultsResult;
use crate::store::ResultStore;
use crate::types::ResultRecord;

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

pub fn render_record(record: &ResultRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Results_Name,{}", escape(&record.name));
    let _ = writeln!(out, "Results_Timestamp,{}", escape(&record.timestamp));
    let _ = writeln!(out, "Results_ID,{}", record.id);
    for field in &record.fields {
        let mut row = escape(&field.name);
        for cell in field.value.cells() {
            row.push(',');
            row.push_str(&escape(&cell));
        }
        let _ = writeln!(out, "{row}");
    }
    out
}

/// Render the listed records in the given order. Unknown ids are skipped
/// with a warning.
pub fn render_csv(store: &ResultStore, ids: &[ResultId]) -> String {
    let mut out = String::new();
    for id in ids {
        match store.get(*id) {
            Some(record) => {
                out.push_str(&render_record(record));
                out.push('\n');
            }
            None => warn!(id = %id, "result not found; skipped in CSV export"),
        }
    }
    out
}

pub fn write_csv(store: &ResultStore, ids: &[ResultId], path: &Path) -> ResultsResult<()> {
    let content = render_csv(store, ids);
    fs::write(path, content)?;
    info!(path = %path.display(), results = ids.len(), "results written to CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_block_layout() {
        let mut store = ResultStore::new();
        let id = store.create("VSPAERO_Load");
        let r = store.get_mut(id).unwrap();
        r.timestamp = "t0".to_string();
        r.add("WingId", vec![1_i64, 1]);
        r.add("cl", vec![0.5, 0.25]);
        r.add("Label", "a,b");

        let text = render_csv(&store, &[id]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Results_Name,VSPAERO_Load");
        assert_eq!(lines[1], "Results_Timestamp,t0");
        assert_eq!(lines[2], "Results_ID,0");
        assert_eq!(lines[3], "WingId,1,1");
        assert_eq!(lines[4], "cl,0.5,0.25");
        assert_eq!(lines[5], "Label,\"a,b\"");
        assert_eq!(lines[6], "");
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let store = ResultStore::new();
        assert!(render_csv(&store, &[ResultId::from_index(4)]).is_empty());
    }
}
