//! Case boundaries and the flow-condition block that follows them.

use std::io::BufRead;

use tracing::warn;
use va_core::{AnalysisMethod, FlowCondition, scan_f64};
use va_results::{CaseHeader, ResultRecord};

use crate::scanner::{Row, RowScanner};
use crate::{ParseError, ParseResult};

/// Length of the asterisk line that opens every case.
pub const CASE_SENTINEL_LEN: usize = 199;

/// Older solver builds wrote a shorter sentinel.
pub const LEGACY_SENTINEL_LEN: usize = 185;

pub fn is_case_sentinel(row: &[String]) -> bool {
    match row {
        [token] => {
            matches!(token.len(), CASE_SENTINEL_LEN | LEGACY_SENTINEL_LEN)
                && token.bytes().all(|b| b == b'*')
        }
        _ => false,
    }
}

pub fn is_comment(row: &[String]) -> bool {
    row.first().is_some_and(|t| t.starts_with('#'))
}

/// `name : value [unit]` with a numeric value.
fn header_field(row: &Row) -> Option<(&str, f64)> {
    if is_comment(row) || !(2..=3).contains(&row.len()) {
        return None;
    }
    scan_f64(&row[1]).map(|v| (row[0].as_str(), v))
}

/// Read the block after a case sentinel into `record`.
///
/// Every `name : value` row becomes `FC_<name>`. Leading blank rows are
/// skipped, comment rows are ignored, and the block ends at a blank row or
/// at the first row of any other shape, which is pushed back. Once Mach,
/// AoA and Beta are all known the record gets `AnalysisMethod` and a typed
/// header.
pub fn read_case_header<R: BufRead>(
    rows: &mut RowScanner<R>,
    record: &mut ResultRecord,
    method: AnalysisMethod,
) -> ParseResult<CaseHeader> {
    let mut mach = None;
    let mut alpha = None;
    let mut beta = None;
    let mut started = false;

    while let Some(row) = rows.next_row()? {
        if row.is_empty() {
            if started {
                break;
            }
            continue;
        }
        started = true;
        if is_comment(&row) {
            continue;
        }
        let Some((name, value)) = header_field(&row) else {
            rows.push_back(row);
            break;
        };

        record.add(format!("FC_{name}"), value);
        match name {
            "Mach_" => mach = Some(value),
            "AoA_" => alpha = Some(value),
            "Beta_" => beta = Some(value),
            _ => {}
        }
    }

    match (mach, alpha, beta) {
        (Some(mach), Some(alpha), Some(beta)) => {
            let header = CaseHeader {
                method,
                flow: FlowCondition::new(mach, alpha, beta),
            };
            record.add("AnalysisMethod", method.code());
            record.header = Some(header);
            Ok(header)
        }
        _ => {
            let missing = [("Mach_", mach), ("AoA_", alpha), ("Beta_", beta)]
                .iter()
                .filter(|(_, v)| v.is_none())
                .map(|(n, _)| *n)
                .collect::<Vec<_>>()
                .join(", ");
            warn!(line = rows.line(), %missing, "case header incomplete");
            Err(ParseError::CaseHeaderIncomplete {
                line: rows.line(),
                missing,
            })
        }
    }
}
