//! Spanwise sectional loading (`.lod`).

use std::io::BufRead;

use tracing::warn;
use va_core::{AnalysisMethod, ResultId};
use va_results::{ResultRecord, ResultStore, names};

use crate::header::{is_case_sentinel, read_case_header};
use crate::scanner::{Row, RowScanner, TABLE_DELIMITERS};
use crate::{ParseResult, ResultFileParser, parse_f64, parse_i64};

pub const SECTION_COLUMNS: usize = 14;

/// Columns 1..=13 of the sectional table.
const RAW_FIELDS: [&str; 13] = [
    "S", "Yavg", "Chord", "V/Vref", "cl", "cd", "cs", "cx", "cy", "cz", "cmx", "cmy", "cmz",
];

/// Channels also reported scaled by local chord over reference chord.
const SCALED_FIELDS: [&str; 9] = ["cl", "cd", "cs", "cx", "cy", "cz", "cmx", "cmy", "cmz"];

const CHORD: usize = 2;
const FIRST_COEFF: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct LoadParser {
    pub method: AnalysisMethod,
}

impl LoadParser {
    pub fn new(method: AnalysisMethod) -> Self {
        Self { method }
    }
}

fn is_section_row(row: &Row) -> bool {
    row.len() == SECTION_COLUMNS && !row[0].contains("Comp")
}

/// Table header: the section shape with a non-numeric first token.
fn is_section_header(row: &Row) -> bool {
    is_section_row(row) && !row[0].starts_with(|c: char| c.is_ascii_digit())
}

struct SectionTable {
    cref: f64,
    wing_id: Vec<i64>,
    raw: Vec<Vec<f64>>,
    scaled: Vec<Vec<f64>>,
}

impl SectionTable {
    fn new(cref: f64) -> Self {
        Self {
            cref,
            wing_id: Vec::new(),
            raw: vec![Vec::new(); RAW_FIELDS.len()],
            scaled: vec![Vec::new(); SCALED_FIELDS.len()],
        }
    }

    fn push_row(&mut self, row: &Row, line: usize) -> ParseResult<()> {
        self.wing_id.push(parse_i64(&row[0], "WingId", line)?);
        let mut values = [0.0; RAW_FIELDS.len()];
        for (value, token) in values.iter_mut().zip(&row[1..]) {
            *value = parse_f64(token, "load column", line)?;
        }
        for (col, value) in self.raw.iter_mut().zip(values) {
            col.push(value);
        }
        let ratio = values[CHORD] / self.cref;
        for (col, value) in self.scaled.iter_mut().zip(&values[FIRST_COEFF..]) {
            col.push(value * ratio);
        }
        Ok(())
    }

    fn commit(self, record: &mut ResultRecord) {
        record.add("WingId", self.wing_id);
        for (name, values) in RAW_FIELDS.iter().zip(self.raw) {
            record.add(*name, values);
        }
        for (name, values) in SCALED_FIELDS.iter().zip(self.scaled) {
            record.add(format!("{name}*c/cref"), values);
        }
    }
}

impl ResultFileParser for LoadParser {
    const WHAT: &'static str = "load";
    const DELIMITERS: &'static str = TABLE_DELIMITERS;

    fn parse<R: BufRead>(
        &self,
        rows: &mut RowScanner<R>,
        store: &mut ResultStore,
        ids: &mut Vec<ResultId>,
    ) -> ParseResult<()> {
        let mut current: Option<ResultId> = None;
        let mut cref = 1.0;

        while let Some(row) = rows.next_row()? {
            if is_case_sentinel(&row) {
                let id = store.create(names::LOAD);
                ids.push(id);
                current = Some(id);
                if let Some(record) = store.get_mut(id) {
                    read_case_header(rows, record, self.method)?;
                    cref = match record.f64("FC_Cref_") {
                        Some(c) => c,
                        None => {
                            warn!(line = rows.line(), "no Cref_ in case header; using 1.0");
                            1.0
                        }
                    };
                }
                continue;
            }

            if !is_section_header(&row) {
                continue;
            }

            let mut table = SectionTable::new(cref);
            while let Some(data) = rows.next_row()? {
                if !is_section_row(&data) {
                    rows.push_back(data);
                    break;
                }
                table.push_row(&data, rows.line())?;
            }

            match current.and_then(|id| store.get_mut(id)) {
                Some(record) => table.commit(record),
                None => warn!(line = rows.line(), "load table outside any case; ignored"),
            }
        }
        Ok(())
    }
}
