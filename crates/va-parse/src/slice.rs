//! Cp slicer output (`.slc`).

use std::io::BufRead;

use tracing::warn;
use va_core::{AnalysisMethod, CutAxis, ResultId};
use va_results::{ResultStore, names};

use crate::scanner::{Row, RowScanner, SLICE_DELIMITERS};
use crate::{ParseError, ParseResult, ResultFileParser, parse_f64, parse_i64};

pub const SLICE_COLUMNS: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct SliceParser {
    /// Vortex-lattice slices carry `dCp`, panel slices `Cp`.
    pub method: AnalysisMethod,
}

impl SliceParser {
    pub fn new(method: AnalysisMethod) -> Self {
        Self { method }
    }

    fn pressure_field(&self) -> &'static str {
        match self.method {
            AnalysisMethod::VortexLattice => "dCp",
            AnalysisMethod::Panel => "Cp",
        }
    }
}

/// Token at `index`, or a malformed-row error.
fn token<'a>(row: &'a Row, index: usize, line: usize, reason: &'static str) -> ParseResult<&'a str> {
    row.get(index)
        .map(String::as_str)
        .ok_or(ParseError::MalformedRow { line, reason })
}

fn is_data_row(row: &Row) -> bool {
    row.len() == SLICE_COLUMNS
}

impl ResultFileParser for SliceParser {
    const WHAT: &'static str = "slice";
    const DELIMITERS: &'static str = SLICE_DELIMITERS;

    fn parse<R: BufRead>(
        &self,
        rows: &mut RowScanner<R>,
        store: &mut ResultStore,
        ids: &mut Vec<ResultId>,
    ) -> ParseResult<()> {
        let mut current: Option<ResultId> = None;

        while let Some(row) = rows.next_row()? {
            let line = rows.line();
            let Some(first) = row.first() else {
                continue;
            };

            // BLOCK Cut_<n>_at_<axis>:_<position>
            if first == "BLOCK" {
                let axis = token(&row, 4, line, "BLOCK row without cut axis")?;
                let loc = parse_f64(token(&row, 5, line, "BLOCK row without cut position")?, "Cut_Loc", line)?;
                let num = parse_i64(token(&row, 2, line, "BLOCK row without cut number")?, "Cut_Num", line)?;
                let cut_type = CutAxis::code_from_letter(axis.as_bytes()[0]);

                let id = store.create(names::SLICE_CASE);
                ids.push(id);
                current = Some(id);
                if let Some(record) = store.get_mut(id) {
                    record.add("Cut_Type", cut_type);
                    record.add("Cut_Loc", loc);
                    record.add("Cut_Num", num);
                }
                continue;
            }

            let Some(id) = current else {
                continue;
            };

            // Case: <n> ... Mach: <m> ... Alpha: <a> ... Beta: <b> ...
            if first == "Case" {
                let case = parse_i64(token(&row, 1, line, "Case row too short")?, "Case", line)?;
                let mach = parse_f64(token(&row, 4, line, "Case row too short")?, "Mach", line)?;
                let alpha = parse_f64(token(&row, 7, line, "Case row too short")?, "Alpha", line)?;
                let beta = parse_f64(token(&row, 10, line, "Case row too short")?, "Beta", line)?;
                if let Some(record) = store.get_mut(id) {
                    record.add("Case", case);
                    record.add("Mach", mach);
                    record.add("Alpha", alpha);
                    record.add("Beta", beta);
                }
                continue;
            }

            // Column header is `x y z dCp/Cp`.
            if !is_data_row(&row) || first == "x" {
                continue;
            }

            let mut cols: [Vec<f64>; SLICE_COLUMNS] = Default::default();
            let mut next = Some(row);
            while let Some(data) = next.take() {
                if !is_data_row(&data) {
                    rows.push_back(data);
                    break;
                }
                for (col, tok) in cols.iter_mut().zip(&data) {
                    col.push(parse_f64(tok, "slice column", rows.line())?);
                }
                next = rows.next_row()?;
            }

            let [x, y, z, cp] = cols;
            match store.get_mut(id) {
                Some(record) => {
                    record.add("X_Loc", x);
                    record.add("Y_Loc", y);
                    record.add("Z_Loc", z);
                    record.add(self.pressure_field(), cp);
                }
                None => warn!(line, "slice table for a deleted case; ignored"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SLC: &str = "\
BLOCK Cut_1_at_X:_2.000000
Case: 1 ... Mach: 0.001000 ... Alpha: 1.000000 ... Beta: 0.000000 ...     Case: 1 ...
x          y          z         dCp/Cp
2.0000     0.0000    -0.6063    -0.0100
2.0000     0.0000    -0.5610    -0.0200
2.0000     0.0000    -0.4286    -0.0300
BLOCK Cut_2_at_Z:_-0.500000
Case: 1 ... Mach: 0.001000 ... Alpha: 1.000000 ... Beta: 0.000000 ...
x          y          z         dCp/Cp
1.0000     1.0000    -0.5000     0.5000
";

    fn run(method: AnalysisMethod, text: &str) -> (ResultStore, Vec<ResultId>, ParseResult<()>) {
        let mut rows = RowScanner::new(Cursor::new(text.as_bytes().to_vec()), SLICE_DELIMITERS);
        let mut store = ResultStore::new();
        let mut ids = Vec::new();
        let res = SliceParser::new(method).parse(&mut rows, &mut store, &mut ids);
        (store, ids, res)
    }

    #[test]
    fn vlm_slices() {
        let (store, ids, res) = run(AnalysisMethod::VortexLattice, SLC);
        res.unwrap();
        assert_eq!(ids.len(), 2);

        let first = store.get(ids[0]).unwrap();
        assert_eq!(first.name, "CpSlicer_Case");
        assert_eq!(first.i64("Cut_Type"), Some(0));
        assert_eq!(first.f64("Cut_Loc"), Some(2.0));
        assert_eq!(first.i64("Cut_Num"), Some(1));
        assert_eq!(first.i64("Case"), Some(1));
        assert_eq!(first.f64("Mach"), Some(0.001));
        assert_eq!(first.f64("Alpha"), Some(1.0));
        assert_eq!(first.f64("Beta"), Some(0.0));
        assert_eq!(first.f64_slice("X_Loc").map(<[f64]>::len), Some(3));
        assert_eq!(first.f64_slice("Z_Loc"), Some(&[-0.6063, -0.5610, -0.4286][..]));
        assert_eq!(first.f64_slice("dCp"), Some(&[-0.01, -0.02, -0.03][..]));
        assert!(!first.contains("Cp"));

        let second = store.get(ids[1]).unwrap();
        assert_eq!(second.i64("Cut_Type"), Some(2));
        assert_eq!(second.f64("Cut_Loc"), Some(-0.5));
        assert_eq!(second.f64_slice("Y_Loc"), Some(&[1.0][..]));
    }

    #[test]
    fn panel_slices_store_cp() {
        let (store, ids, res) = run(AnalysisMethod::Panel, SLC);
        res.unwrap();
        let rec = store.get(ids[1]).unwrap();
        assert_eq!(rec.f64_slice("Cp"), Some(&[0.5][..]));
        assert!(!rec.contains("dCp"));
    }

    #[test]
    fn short_block_row_is_malformed() {
        let (_, ids, res) = run(AnalysisMethod::VortexLattice, "BLOCK Cut_1\n");
        assert!(matches!(res, Err(ParseError::MalformedRow { .. })));
        assert!(ids.is_empty());
    }
}
