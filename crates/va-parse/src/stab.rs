//! Stability derivatives (`.stab`).
//!
//! Two layouts exist. The full derivative run writes tables whose header
//! row names the columns; control-group columns appear as `ConGrp_<n>` and
//! are renamed to the live group names. Single-axis P/Q/R runs write
//! `name value` rows where multi-word names are split across tokens.

use std::io::BufRead;

use tracing::{debug, warn};
use va_core::{AnalysisMethod, ResultId, StabilityType, scan_f64};
use va_results::{ResultRecord, ResultStore, names};

use crate::header::{is_case_sentinel, is_comment, read_case_header};
use crate::scanner::{Row, RowScanner, TABLE_DELIMITERS};
use crate::{ParseResult, ResultFileParser};

const CONTROL_GROUP_MARKER: &str = "ConGrp_";

#[derive(Debug, Clone)]
pub struct StabParser {
    pub method: AnalysisMethod,
    pub kind: StabilityType,
    /// Control group names in display order.
    pub group_names: Vec<String>,
}

impl StabParser {
    pub fn new(method: AnalysisMethod, kind: StabilityType, group_names: Vec<String>) -> Self {
        Self {
            method,
            kind,
            group_names,
        }
    }

    /// Rename `ConGrp_` columns by their offset from the first one.
    fn map_columns(&self, mut columns: Row) -> Row {
        let Some(first) = columns.iter().position(|c| c.contains(CONTROL_GROUP_MARKER)) else {
            return columns;
        };
        for (i, column) in columns.iter_mut().enumerate().skip(first) {
            if !column.contains(CONTROL_GROUP_MARKER) {
                continue;
            }
            match self.group_names.get(i - first) {
                Some(name) => {
                    debug!(from = %column, to = %name, "control group column mapped");
                    *column = name.clone();
                }
                None => warn!(
                    column = %column,
                    index = i - first,
                    groups = self.group_names.len(),
                    "control group column has no matching group; name kept"
                ),
            }
        }
        columns
    }
}

/// `# Result ...` opens a name/value block.
fn is_result_header(row: &Row) -> bool {
    row.len() == 4 && row[0] == "#" && row[1] == "Result"
}

/// Column state of the derivative tables.
enum Table {
    None,
    Columns(Row),
}

fn read_result_block<R: BufRead>(rows: &mut RowScanner<R>, record: &mut ResultRecord) -> ParseResult<()> {
    while let Some(row) = rows.next_row()? {
        if is_comment(&row) {
            rows.push_back(row);
            break;
        }
        if row.len() == 3
            && let Some(value) = scan_f64(&row[1])
        {
            record.add(row[0].clone(), value);
        }
    }
    Ok(())
}

/// Each numeric token commits the name built so far; other tokens extend it.
fn commit_single_axis(row: &Row, record: &mut ResultRecord) {
    let mut name = row[0].clone();
    for token in &row[1..] {
        match scan_f64(token) {
            Some(value) => record.add(name.clone(), value),
            None => name.push_str(token),
        }
    }
}

fn commit_table_row(row: &Row, columns: &Row, record: &mut ResultRecord) {
    for (token, column) in row.iter().zip(columns).skip(1) {
        let key = format!("{}_{}", row[0], column);
        match scan_f64(token) {
            Some(value) => record.add(key, value),
            None => record.add(key, token.as_str()),
        }
    }
}

impl ResultFileParser for StabParser {
    const WHAT: &'static str = "stab";
    const DELIMITERS: &'static str = TABLE_DELIMITERS;

    fn parse<R: BufRead>(
        &self,
        rows: &mut RowScanner<R>,
        store: &mut ResultStore,
        ids: &mut Vec<ResultId>,
    ) -> ParseResult<()> {
        let mut current: Option<ResultId> = None;
        let mut table = Table::None;

        while let Some(row) = rows.next_row()? {
            if is_case_sentinel(&row) {
                let id = store.create(names::STAB);
                ids.push(id);
                current = Some(id);
                table = Table::None;
                if let Some(record) = store.get_mut(id) {
                    record.add("StabilityType", self.kind.code());
                    read_case_header(rows, record, self.method)?;
                }
                continue;
            }

            let Some(record) = current.and_then(|id| store.get_mut(id)) else {
                continue;
            };

            if is_result_header(&row) {
                read_result_block(rows, record)?;
                continue;
            }
            if row.is_empty() || is_comment(&row) {
                continue;
            }

            if self.kind != StabilityType::Default {
                commit_single_axis(&row, record);
                continue;
            }

            table = match table {
                Table::Columns(columns) if columns.len() == row.len() => {
                    commit_table_row(&row, &columns, record);
                    Table::Columns(columns)
                }
                _ => Table::Columns(self.map_columns(row)),
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::CASE_SENTINEL_LEN;
    use std::io::Cursor;

    fn case() -> String {
        format!("{}\nMach_ : 0.3\nAoA_ : 2.0\nBeta_ : 0.0\n\n", "*".repeat(CASE_SENTINEL_LEN))
    }

    fn run(parser: &StabParser, text: &str) -> (ResultStore, Vec<ResultId>) {
        let mut rows = RowScanner::new(Cursor::new(text.as_bytes().to_vec()), TABLE_DELIMITERS);
        let mut store = ResultStore::new();
        let mut ids = Vec::new();
        parser.parse(&mut rows, &mut store, &mut ids).unwrap();
        (store, ids)
    }

    fn default_parser(groups: &[&str]) -> StabParser {
        StabParser::new(
            AnalysisMethod::VortexLattice,
            StabilityType::Default,
            groups.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn control_group_columns_take_group_names() {
        let parser = default_parser(&["Aileron", "Elevator"]);
        let text = case() + "Row ConGrp_1 ConGrp_2\nCL 0.10 -0.20\nCm 0.30 n/a\n";
        let (store, ids) = run(&parser, &text);
        let rec = store.get(ids[0]).unwrap();
        assert_eq!(rec.i64("StabilityType"), Some(0));
        assert_eq!(rec.f64("CL_Aileron"), Some(0.10));
        assert_eq!(rec.f64("CL_Elevator"), Some(-0.20));
        assert_eq!(rec.f64("Cm_Aileron"), Some(0.30));
        assert_eq!(rec.str("Cm_Elevator"), Some("n/a"));
        assert!(!rec.contains("CL_ConGrp_1"));
    }

    #[test]
    fn unmapped_control_group_column_keeps_name() {
        let parser = default_parser(&["Aileron"]);
        let text = case() + "Coef Base ConGrp_1 ConGrp_2\nCL 1.0 0.1 0.2\n";
        let (store, ids) = run(&parser, &text);
        let rec = store.get(ids[0]).unwrap();
        assert_eq!(rec.f64("CL_Base"), Some(1.0));
        assert_eq!(rec.f64("CL_Aileron"), Some(0.1));
        assert_eq!(rec.f64("CL_ConGrp_2"), Some(0.2));
    }

    #[test]
    fn width_change_starts_a_new_table() {
        let parser = default_parser(&[]);
        let text = case()
            + "Coef Total Alpha\nCL 0.5 4.0\n# comment\n"
            + "Coef Total Alpha Beta\nCS 0.0 0.1 -0.3\n";
        let (store, ids) = run(&parser, &text);
        let rec = store.get(ids[0]).unwrap();
        assert_eq!(rec.f64("CL_Alpha"), Some(4.0));
        assert_eq!(rec.f64("CS_Beta"), Some(-0.3));
        assert!(!rec.contains("Coef_Total"));
    }

    #[test]
    fn new_case_resets_columns() {
        let parser = default_parser(&[]);
        let text = case() + "Coef Total\nCL 0.5\n" + &case() + "Coef Total\nCL 0.7\n";
        let (store, ids) = run(&parser, &text);
        assert_eq!(ids.len(), 2);
        let second = store.get(ids[1]).unwrap();
        assert_eq!(second.f64("CL_Total"), Some(0.7));
        assert!(!second.contains("Coef_Total"));
    }

    #[test]
    fn result_block_reads_name_value_rows() {
        let parser = default_parser(&[]);
        let text = case()
            + "# Result Value Units\n"
            + "SM 0.12 no_unit\nX_np 3.5 Lunit\nbogus\n"
            + "# end\n";
        let (store, ids) = run(&parser, &text);
        let rec = store.get(ids[0]).unwrap();
        assert_eq!(rec.f64("SM"), Some(0.12));
        assert_eq!(rec.f64("X_np"), Some(3.5));
        assert!(!rec.contains("bogus"));
    }

    #[test]
    fn single_axis_rows_join_name_tokens() {
        let parser = StabParser::new(AnalysisMethod::VortexLattice, StabilityType::PAnalysis, Vec::new());
        let text = case() + "CL_p Total 0.25\nCm 0.1 0.2\n";
        let (store, ids) = run(&parser, &text);
        let rec = store.get(ids[0]).unwrap();
        assert_eq!(rec.i64("StabilityType"), Some(1));
        assert_eq!(rec.f64("CL_pTotal"), Some(0.25));
        assert_eq!(rec.count("Cm"), 2);
        assert_eq!(rec.f64("Cm"), Some(0.2));
    }

    #[test]
    fn rows_before_any_case_are_ignored() {
        let parser = default_parser(&[]);
        let (store, ids) = run(&parser, "Coef Total\nCL 0.5\n");
        assert!(ids.is_empty());
        assert!(store.is_empty());
    }
}
