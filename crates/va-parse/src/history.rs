//! Wake-iteration history (`.history`).

use std::io::BufRead;

use tracing::warn;
use va_core::{AnalysisMethod, ResultId};
use va_results::{ResultRecord, ResultStore, names};

use crate::header::{is_case_sentinel, read_case_header};
use crate::scanner::{Row, RowScanner, TABLE_DELIMITERS};
use crate::{ParseResult, ResultFileParser, parse_f64, parse_i64};

pub const STEADY_COLUMNS: usize = 18;
pub const UNSTEADY_COLUMNS: usize = 28;

/// Columns 1..=17 of every history table.
const STEADY_FIELDS: [&str; 17] = [
    "Mach", "Alpha", "Beta", "CL", "CDo", "CDi", "CDtot", "CS", "L/D", "E", "CFx", "CFy", "CFz",
    "CMx", "CMy", "CMz", "T/QS",
];

/// Columns 18..=27 of time-marching tables.
const UNSTEADY_FIELDS: [&str; 10] = [
    "UnstdyAng", "CL_Un", "CDi_Un", "CS_Un", "CFx_Un", "CFy_Un", "CFz_Un", "CMx_Un", "CMy_Un",
    "CMz_Un",
];

#[derive(Debug, Clone, Copy)]
pub struct HistoryParser {
    pub method: AnalysisMethod,
}

impl HistoryParser {
    pub fn new(method: AnalysisMethod) -> Self {
        Self { method }
    }
}

/// Columns accumulated for one table.
struct HistoryTable {
    unsteady: bool,
    iter: Vec<i64>,
    time: Vec<f64>,
    columns: Vec<Vec<f64>>,
}

impl HistoryTable {
    fn new(unsteady: bool) -> Self {
        let width = if unsteady {
            STEADY_FIELDS.len() + UNSTEADY_FIELDS.len()
        } else {
            STEADY_FIELDS.len()
        };
        Self {
            unsteady,
            iter: Vec::new(),
            time: Vec::new(),
            columns: vec![Vec::new(); width],
        }
    }

    fn min_width(&self) -> usize {
        if self.unsteady {
            UNSTEADY_COLUMNS
        } else {
            STEADY_COLUMNS
        }
    }

    fn push_row(&mut self, row: &Row, line: usize) -> ParseResult<()> {
        if self.unsteady {
            self.time.push(parse_f64(&row[0], "Time", line)?);
        } else {
            self.iter.push(parse_i64(&row[0], "WakeIter", line)?);
        }
        for (col, token) in self.columns.iter_mut().zip(&row[1..]) {
            col.push(parse_f64(token, "history column", line)?);
        }
        Ok(())
    }

    fn commit(self, record: &mut ResultRecord) {
        if self.unsteady {
            record.add("Time", self.time);
        } else {
            record.add("WakeIter", self.iter);
        }
        let names = STEADY_FIELDS.iter().chain(UNSTEADY_FIELDS.iter());
        for (name, values) in names.zip(self.columns) {
            record.add(*name, values);
        }
    }
}

impl ResultFileParser for HistoryParser {
    const WHAT: &'static str = "history";
    const DELIMITERS: &'static str = TABLE_DELIMITERS;

    fn parse<R: BufRead>(
        &self,
        rows: &mut RowScanner<R>,
        store: &mut ResultStore,
        ids: &mut Vec<ResultId>,
    ) -> ParseResult<()> {
        let mut current: Option<ResultId> = None;

        while let Some(row) = rows.next_row()? {
            if is_case_sentinel(&row) {
                let id = store.create(names::HISTORY);
                ids.push(id);
                current = Some(id);
                if let Some(record) = store.get_mut(id) {
                    read_case_header(rows, record, self.method)?;
                }
                continue;
            }

            if row.len() < STEADY_COLUMNS {
                continue;
            }

            // Header row; the data follows.
            let mut table = HistoryTable::new(row.len() == UNSTEADY_COLUMNS);
            while let Some(data) = rows.next_row()? {
                if data.len() < table.min_width() {
                    rows.push_back(data);
                    break;
                }
                table.push_row(&data, rows.line())?;
            }

            match current.and_then(|id| store.get_mut(id)) {
                Some(record) => table.commit(record),
                None => warn!(line = rows.line(), "history table outside any case; ignored"),
            }
        }
        Ok(())
    }
}
