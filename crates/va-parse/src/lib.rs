//! va-parse: readers for the solver's text result files.
//!
//! Every reader walks the file one tokenized row at a time, opens a new
//! result record at each case boundary and commits table columns as vector
//! fields when the table ends. Records already committed stay in the store
//! when a later case fails to parse.

pub mod header;
pub mod history;
pub mod load;
pub mod scanner;
pub mod slice;
pub mod stab;

pub use header::{is_case_sentinel, read_case_header};
pub use history::HistoryParser;
pub use load::LoadParser;
pub use scanner::{Row, RowScanner, tokenize};
pub use slice::SliceParser;
pub use stab::StabParser;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use tracing::{debug, error};
use va_core::{ResultId, scan_f64, scan_i64};
use va_results::ResultStore;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("Could not open {what} file: {path}")]
    Open {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Read failure at line {line}")]
    Read {
        line: usize,
        source: std::io::Error,
    },

    #[error("Case header incomplete at line {line}: missing {missing}")]
    CaseHeaderIncomplete { line: usize, missing: String },

    #[error("Bad number '{token}' in {field} at line {line}")]
    BadNumber {
        line: usize,
        field: &'static str,
        token: String,
    },

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: &'static str },
}

/// A reader for one kind of result file.
pub trait ResultFileParser {
    /// Short file description used in diagnostics, e.g. `"history"`.
    const WHAT: &'static str;

    /// Characters that separate tokens on a row.
    const DELIMITERS: &'static str;

    /// Parse rows into `store`, appending the id of every record created.
    ///
    /// On error the ids pushed so far remain valid and their records stay in
    /// the store; the rest of the input is not read.
    fn parse<R: BufRead>(
        &self,
        rows: &mut RowScanner<R>,
        store: &mut ResultStore,
        ids: &mut Vec<ResultId>,
    ) -> ParseResult<()>;

    /// Open `path` and parse it.
    fn read_file(
        &self,
        path: &Path,
        store: &mut ResultStore,
        ids: &mut Vec<ResultId>,
    ) -> ParseResult<()> {
        let mut rows = RowScanner::open(path, Self::WHAT, Self::DELIMITERS)?;
        let before = ids.len();
        let outcome = self.parse(&mut rows, store, ids);
        match &outcome {
            Ok(()) => debug!(file = %path.display(), cases = ids.len() - before, "{} file read", Self::WHAT),
            Err(err) => error!(file = %path.display(), %err, "failed reading {} file", Self::WHAT),
        }
        outcome
    }
}

pub(crate) fn parse_f64(token: &str, field: &'static str, line: usize) -> ParseResult<f64> {
    scan_f64(token).ok_or_else(|| ParseError::BadNumber {
        line,
        field,
        token: token.to_string(),
    })
}

pub(crate) fn parse_i64(token: &str, field: &'static str, line: usize) -> ParseResult<i64> {
    scan_i64(token).ok_or_else(|| ParseError::BadNumber {
        line,
        field,
        token: token.to_string(),
    })
}
